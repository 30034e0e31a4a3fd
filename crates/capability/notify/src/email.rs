use crate::{DISPLAY_TIME_FORMAT, Notifier, NotifyError, StateChangeNotice};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pitag_config::SmtpConfig;
use pitag_telemetry::{record_notification_failed, record_notification_sent};
use tracing::{error, info};

/// 基于 SMTP 的通知实现。
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let address: Address = config
            .sender
            .parse()
            .map_err(|err| NotifyError::Address(format!("{}: {err}", config.sender)))?;
        let sender = Mailbox::new(Some(config.sender_name.clone()), address);

        let builder = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|err| NotifyError::Transport(err.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let mut builder = builder.port(config.port);
        if let Some(username) = &config.username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                config.password.clone().unwrap_or_default(),
            ));
        }
        info!(
            target: "pitag.notify",
            host = %config.host,
            port = config.port,
            tls = config.tls,
            "smtp_notifier_initialized"
        );
        Ok(Self {
            transport: builder.build(),
            sender,
        })
    }

    fn build_message(&self, notice: &StateChangeNotice) -> Result<Message, NotifyError> {
        let recipient: Mailbox = notice
            .recipient
            .parse()
            .map_err(|err| NotifyError::Address(format!("{}: {err}", notice.recipient)))?;
        Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(render_subject(notice))
            .header(ContentType::TEXT_HTML)
            .body(render_html_body(notice))
            .map_err(|err| NotifyError::Build(err.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_state_change(&self, notice: &StateChangeNotice) -> Result<(), NotifyError> {
        let result = match self.build_message(notice) {
            Ok(message) => self
                .transport
                .send(message)
                .await
                .map(|_| ())
                .map_err(|err| NotifyError::Transport(err.to_string())),
            Err(err) => Err(err),
        };
        match &result {
            Ok(()) => {
                record_notification_sent();
                info!(
                    target: "pitag.notify",
                    tag_name = %notice.tag_name,
                    recipient = %notice.recipient,
                    "notification_sent"
                );
            }
            Err(err) => {
                record_notification_failed();
                error!(
                    target: "pitag.notify",
                    tag_name = %notice.tag_name,
                    recipient = %notice.recipient,
                    error = %err,
                    "notification_failed"
                );
            }
        }
        result
    }
}

pub fn render_subject(notice: &StateChangeNotice) -> String {
    format!("PI Tag Change Notification: {}", notice.tag_name)
}

/// 渲染通知正文（HTML）。所有字段均做转义。
pub fn render_html_body(notice: &StateChangeNotice) -> String {
    let rows = [
        ("Tag Name", notice.tag_name.as_str()),
        ("Previous State", notice.previous_state.as_str()),
        ("New State", notice.new_state.as_str()),
        ("Changed By", notice.changed_by.as_str()),
        ("Justification", notice.justification.as_str()),
    ];
    let mut body = String::from("<html>\n<body>\n    <h2>PI Tag Value Changed</h2>\n");
    for (label, value) in rows {
        body.push_str(&format!(
            "    <p><strong>{label}:</strong> {}</p>\n",
            escape_html(value)
        ));
    }
    body.push_str(&format!(
        "    <p><strong>Timestamp:</strong> {}</p>\n</body>\n</html>",
        notice.changed_at.format(DISPLAY_TIME_FORMAT)
    ));
    body
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
