//! 标签状态 PDF 报表。
//!
//! 版式：标题、信息区（导出人、邮箱、导出时间、说明）、五列表格、页脚署名。
//! 行数超过单页容量时自动续页，续页重复表头。
//!
//! 内置 Helvetica 只覆盖 WinAnsi（Latin-1）字符集。需要输出西里尔文等字符时，
//! 用 [`PdfReportRenderer::with_font_file`] 加载 TTF 字体并嵌入文档；
//! 未加载字体时，WinAnsi 以外的字符替换为 `?`。

use crate::{DISPLAY_TIME_FORMAT, NotifyError};
use chrono::{DateTime, Local};
use pitag_telemetry::record_report_generated;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use std::io::Cursor as ByteCursor;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const ROW_HEIGHT: f32 = 7.0;
const BODY_SIZE: f32 = 9.0;
const HEADER_SIZE: f32 = 10.0;

/// 表头与列宽（毫米），列宽比例 2:1:1:2:2。
const COLUMNS: [(&str, f32); 5] = [
    ("Tag Name", 45.0),
    ("Status", 22.5),
    ("Good", 22.5),
    ("Previous Status", 45.0),
    ("Export Date", 45.0),
];

pub const NOT_AVAILABLE: &str = "N/A";

/// 报表中的一行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub tag_name: String,
    /// 请求中给出的目标状态。
    pub status: String,
    /// 当前读数的质量位；读取失败时为 `N/A`。
    pub good: String,
    /// 当前读数的展示值；读取失败时为 `N/A`。
    pub previous_status: String,
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub user: Option<String>,
    pub email: Option<String>,
    pub justification: Option<String>,
    pub exported_at: DateTime<Local>,
    pub rows: Vec<ReportRow>,
}

/// 下载文件名，如 `pi_tags_report_20240101_120000.pdf`。
pub fn report_filename(at: &DateTime<Local>) -> String {
    format!("pi_tags_report_{}.pdf", at.format("%Y%m%d_%H%M%S"))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// 游标式排版：记录当前页图层与纵坐标。
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
    latin1_only: bool,
}

impl Cursor<'_> {
    fn next_line(&mut self, height: f32) {
        self.y -= height;
    }

    fn ensure_room(&mut self, height: f32) -> bool {
        if self.y - height >= MARGIN_BOTTOM {
            return false;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN_TOP;
        self.pages += 1;
        true
    }

    fn text(&self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        let text = if self.latin1_only {
            to_latin1(text)
        } else {
            text.to_string()
        };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }
}

#[derive(Debug, Default, Clone)]
pub struct PdfReportRenderer {
    /// 嵌入的 TTF 字体；为空时使用内置 Helvetica。
    font: Option<Arc<Vec<u8>>>,
}

impl PdfReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用外部 TTF 字体（正文、表头、页脚共用同一字体）。
    pub fn with_font_file(path: impl AsRef<Path>) -> Result<Self, NotifyError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|err| NotifyError::Render(format!("{}: {err}", path.display())))?;
        info!(target: "pitag.notify", path = %path.display(), "report_font_loaded");
        Ok(Self {
            font: Some(Arc::new(bytes)),
        })
    }

    pub fn has_embedded_font(&self) -> bool {
        self.font.is_some()
    }

    fn fonts(&self, doc: &PdfDocumentReference) -> Result<Fonts, NotifyError> {
        match &self.font {
            Some(bytes) => {
                let font = doc
                    .add_external_font(ByteCursor::new(bytes.as_slice()))
                    .map_err(|err| NotifyError::Render(err.to_string()))?;
                Ok(Fonts {
                    regular: font.clone(),
                    bold: font.clone(),
                    italic: font,
                })
            }
            None => Ok(Fonts {
                regular: add_font(doc, BuiltinFont::Helvetica)?,
                bold: add_font(doc, BuiltinFont::HelveticaBold)?,
                italic: add_font(doc, BuiltinFont::HelveticaOblique)?,
            }),
        }
    }

    pub fn render(&self, report: &ExportReport) -> Result<Vec<u8>, NotifyError> {
        let (doc, page, layer) =
            PdfDocument::new("PI Tag Report", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let fonts = self.fonts(&doc)?;
        let mut cursor = Cursor {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - MARGIN_TOP,
            pages: 1,
            latin1_only: self.font.is_none(),
        };

        // 标题居中（按 Helvetica 平均字宽估算）
        let title = "PI Tag Report";
        let title_width = title.len() as f32 * 16.0 * 0.5 * 0.3528;
        cursor.text(title, 16.0, (PAGE_WIDTH - title_width) / 2.0, &fonts.bold);
        cursor.next_line(14.0);

        let exported_at = report.exported_at.format(DISPLAY_TIME_FORMAT).to_string();
        let mut info = vec![
            ("User:", report.user.as_deref().unwrap_or("Unknown")),
            ("Email:", report.email.as_deref().unwrap_or("Not specified")),
            ("Export Date:", exported_at.as_str()),
        ];
        if let Some(justification) = report.justification.as_deref().filter(|value| !value.is_empty()) {
            info.push(("Justification:", justification));
        }
        for (label, value) in info {
            cursor.text(label, HEADER_SIZE, MARGIN_LEFT, &fonts.bold);
            cursor.text(value, HEADER_SIZE, MARGIN_LEFT + 60.0, &fonts.regular);
            cursor.next_line(ROW_HEIGHT);
        }
        cursor.next_line(ROW_HEIGHT);

        draw_header(&cursor, &fonts);
        cursor.next_line(ROW_HEIGHT);
        for row in &report.rows {
            if cursor.ensure_room(ROW_HEIGHT) {
                draw_header(&cursor, &fonts);
                cursor.next_line(ROW_HEIGHT);
            }
            let cells = [
                row.tag_name.as_str(),
                row.status.as_str(),
                row.good.as_str(),
                row.previous_status.as_str(),
                exported_at.as_str(),
            ];
            let mut x = MARGIN_LEFT;
            for ((_, width), cell) in COLUMNS.iter().zip(cells) {
                cursor.text(&fit(cell, *width, BODY_SIZE), BODY_SIZE, x, &fonts.regular);
                x += width;
            }
            cursor.next_line(ROW_HEIGHT);
        }

        cursor.ensure_room(ROW_HEIGHT * 2.0);
        cursor.next_line(ROW_HEIGHT);
        let footer = "Generated by PI Tag Manager";
        let footer_width = footer.len() as f32 * 10.0 * 0.5 * 0.3528;
        cursor.text(footer, 10.0, PAGE_WIDTH - MARGIN_LEFT - footer_width, &fonts.italic);

        let pages = cursor.pages;
        let bytes = doc
            .save_to_bytes()
            .map_err(|err| NotifyError::Render(err.to_string()))?;
        record_report_generated();
        info!(
            target: "pitag.notify",
            rows = report.rows.len(),
            pages,
            bytes = bytes.len(),
            "report_rendered"
        );
        Ok(bytes)
    }
}

fn add_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, NotifyError> {
    doc.add_builtin_font(font)
        .map_err(|err| NotifyError::Render(err.to_string()))
}

fn draw_header(cursor: &Cursor<'_>, fonts: &Fonts) {
    let mut x = MARGIN_LEFT;
    for (title, width) in COLUMNS {
        cursor.text(title, HEADER_SIZE, x, &fonts.bold);
        x += width;
    }
}

/// 内置字体无法编码的字符替换为 `?`。
fn to_latin1(text: &str) -> String {
    text.chars()
        .map(|ch| if (ch as u32) <= 0xFF { ch } else { '?' })
        .collect()
}

/// 按估算字宽截断超出列宽的文本，末尾加 `..`。
fn fit(text: &str, width_mm: f32, size: f32) -> String {
    let char_mm = size * 0.5 * 0.3528;
    let max_chars = ((width_mm - 2.0) / char_mm).floor().max(3.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars - 2).collect();
    truncated.push_str("..");
    truncated
}
