use api_contract::{ExportPdfRequest, TagValueDto, UpdateTagRequest, UpdateTagResponse, UpdatedTagDataDto};

#[test]
fn tag_value_dto_is_camel_case() {
    let dto = TagValueDto {
        value: "OPEN".to_string(),
        timestamp: "2024-01-01T00:00:00Z".to_string(),
        good: true,
        units_abbreviation: None,
        display_value: "OPEN".to_string(),
    };
    let value = serde_json::to_value(dto).expect("serialize");
    assert!(value.get("displayValue").is_some());
    assert!(value.get("unitsAbbreviation").is_some());
    assert!(value.get("display_value").is_none());
}

#[test]
fn update_request_accepts_camel_case() {
    let payload = r#"{"tagName":"KTL-FWS-K-260.MV","newState":"CLOSED","email":"a@b.c","justification":"maintenance"}"#;
    let req: UpdateTagRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.tag_name, "KTL-FWS-K-260.MV");
    assert_eq!(req.new_state, "CLOSED");
    assert!(req.user.is_none());
}

#[test]
fn update_request_missing_fields_default_to_empty() {
    let req: UpdateTagRequest = serde_json::from_str("{}").expect("parse");
    assert!(req.tag_name.is_empty());
    assert!(req.new_state.is_empty());
}

#[test]
fn update_response_keeps_null_tag_data() {
    let response = UpdateTagResponse {
        message: "Tag updated successfully".to_string(),
        email_sent: false,
        updated_tag_data: None,
    };
    let value = serde_json::to_value(response).expect("serialize");
    assert_eq!(value["emailSent"], false);
    assert!(value["updatedTagData"].is_null());

    let data = UpdatedTagDataDto {
        value: "CLOSED".to_string(),
        timestamp: "t".to_string(),
        good: true,
    };
    let value = serde_json::to_value(data).expect("serialize");
    assert_eq!(value["value"], "CLOSED");
}

#[test]
fn export_request_parses_tags() {
    let payload = r#"{"tags":[{"tagName":"A","newState":"OPEN"},{"tagName":"B"}],"user":"ops"}"#;
    let req: ExportPdfRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.tags.len(), 2);
    assert_eq!(req.tags[0].new_state.as_deref(), Some("OPEN"));
    assert!(req.tags[1].new_state.is_none());
    assert!(req.email.is_none());
}
