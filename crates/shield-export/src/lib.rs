#![warn(missing_docs)]
//! # shield-export
//!
//! ## Purpose
//! Renders saved scans into paginated PDF reports.
//!
//! ## Responsibilities
//! - Lay out the dashboard "scans report" and the history "scan history"
//!   report with their fixed headings, font sizes, spacing and page breaks.
//! - Word-wrap message text to the report column width.
//! - Encode the laid-out pages as an A4 PDF and write it to disk.
//!
//! ## Data flow
//! History records -> [`scans_report`] / [`history_report`] -> [`Document`]
//! -> [`Document::to_pdf`] / [`Document::write_to`].
//!
//! ## Ownership and lifetimes
//! Documents own their positioned lines and borrow nothing from the records.
//!
//! ## Error model
//! Timestamp formatting, PDF encoding and file writes fail with
//! [`ExportError`].

use std::path::Path;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use shield_core::ScanRecord;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::info;

/// Default title of the dashboard scans report.
pub const SCANS_REPORT_TITLE: &str = "AI Digital Shield - Scans Report";

/// Title of the history report.
pub const HISTORY_REPORT_TITLE: &str = "AI Digital Shield - Scan History";

/// Default file name for the dashboard scans report.
pub const SCANS_REPORT_FILE: &str = "scans-report.pdf";

/// Default file name for the history report.
pub const HISTORY_REPORT_FILE: &str = "ai-digital-shield-history.pdf";

/// Characters per wrapped line in the scans report.
pub const SCANS_WRAP_COLUMNS: usize = 92;

/// Characters per wrapped line in the history report.
pub const HISTORY_WRAP_COLUMNS: usize = 106;

// A4 page in millimetres; y grows downward from the top edge.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const PAGE_TOP: f32 = 20.0;
const LAYER_NAME: &str = "Layer 1";

const SCANS_MARGIN: f32 = 14.0;
const SCANS_TITLE_Y: f32 = 14.0;
const SCANS_TITLE_SIZE: f32 = 16.0;
const SCANS_BODY_SIZE: f32 = 11.0;
const SCANS_LINE_HEIGHT: f32 = 8.0;
const SCANS_PAGE_LIMIT: f32 = 280.0;

const HISTORY_MARGIN: f32 = 20.0;
const HISTORY_TITLE_SIZE: f32 = 18.0;
const HISTORY_GENERATED_SIZE: f32 = 10.0;
const HISTORY_HEADING_SIZE: f32 = 12.0;
const HISTORY_BODY_SIZE: f32 = 9.0;
const HISTORY_BOTTOM_MARGIN: f32 = 40.0;

// Baseline distance of consecutive lines in one text block: 1.15 em.
const MM_PER_POINT: f32 = 25.4 / 72.0;
const BLOCK_LINE_FACTOR: f32 = 1.15;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");

/// One line of text placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Line content.
    pub text: String,
    /// Distance from the left edge in millimetres.
    pub x: f32,
    /// Baseline distance from the top edge in millimetres.
    pub y: f32,
    /// Font size in points.
    pub font_size: f32,
}

/// A laid-out report: a title and pages of positioned lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    title: String,
    pages: Vec<Vec<TextLine>>,
}

impl Document {
    /// Returns the document title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the laid-out pages.
    pub fn pages(&self) -> &[Vec<TextLine>] {
        &self.pages
    }

    /// Returns the text of every line on page `index`, top to bottom.
    pub fn page_text(&self, index: usize) -> Vec<&str> {
        self.pages
            .get(index)
            .map(|page| page.iter().map(|line| line.text.as_str()).collect())
            .unwrap_or_default()
    }

    /// Encodes the document as an A4 PDF using the built-in Helvetica font.
    ///
    /// # Errors
    /// Returns [`ExportError::Pdf`] when the PDF cannot be encoded.
    pub fn to_pdf(&self) -> Result<Vec<u8>, ExportError> {
        let (pdf, first_page, first_layer) =
            PdfDocument::new(&self.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let font = pdf
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|error| ExportError::Pdf(error.to_string()))?;

        let mut first = Some((first_page, first_layer));
        for page in &self.pages {
            let (page_index, layer_index) = match first.take() {
                Some(indices) => indices,
                None => pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME),
            };
            let layer = pdf.get_page(page_index).get_layer(layer_index);
            for line in page {
                layer.use_text(
                    line.text.clone(),
                    line.font_size,
                    Mm(line.x),
                    Mm(PAGE_HEIGHT - line.y),
                    &font,
                );
            }
        }

        pdf.save_to_bytes()
            .map_err(|error| ExportError::Pdf(error.to_string()))
    }

    /// Writes the document to `path` as a PDF.
    ///
    /// # Errors
    /// Returns [`ExportError::Pdf`] when encoding fails and
    /// [`ExportError::Io`] when the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        std::fs::write(path, self.to_pdf()?)?;
        info!(path = %path.display(), pages = self.pages.len(), "report written");
        Ok(())
    }
}

/// Cursor that places lines top-down and opens pages on demand.
struct PageWriter {
    pages: Vec<Vec<TextLine>>,
    x: f32,
    y: f32,
    font_size: f32,
}

impl PageWriter {
    fn new(x: f32) -> Self {
        Self {
            pages: vec![Vec::new()],
            x,
            y: PAGE_TOP,
            font_size: SCANS_BODY_SIZE,
        }
    }

    fn font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    fn place(&mut self, text: impl Into<String>, y: f32) {
        let line = TextLine {
            text: text.into(),
            x: self.x,
            y,
            font_size: self.font_size,
        };
        if let Some(page) = self.pages.last_mut() {
            page.push(line);
        }
    }

    fn line(&mut self, text: impl Into<String>, advance: f32) {
        self.place(text, self.y);
        self.y += advance;
    }

    /// Places `lines` as one block at the cursor without advancing it.
    fn block(&mut self, lines: Vec<String>) {
        let spacing = self.font_size * BLOCK_LINE_FACTOR * MM_PER_POINT;
        let top = self.y;
        for (index, text) in lines.into_iter().enumerate() {
            self.place(text, top + index as f32 * spacing);
        }
    }

    fn gap(&mut self, advance: f32) {
        self.y += advance;
    }

    fn break_if_below(&mut self, limit: f32) {
        if self.y > limit {
            self.pages.push(Vec::new());
            self.y = PAGE_TOP;
        }
    }

    fn finish(self, title: &str) -> Document {
        Document {
            title: title.to_string(),
            pages: self.pages,
        }
    }
}

/// Lays out the dashboard scans report.
///
/// Each record gets a numbered header with its timestamp and score, followed
/// by its wrapped text; a page break happens before any text line that would
/// start past the page limit.
///
/// # Errors
/// Returns [`ExportError::Format`] when a timestamp cannot be formatted.
pub fn scans_report(records: &[ScanRecord], title: Option<&str>) -> Result<Document, ExportError> {
    let title = title.unwrap_or(SCANS_REPORT_TITLE);
    let mut writer = PageWriter::new(SCANS_MARGIN);
    writer.font_size(SCANS_TITLE_SIZE);
    writer.place(title, SCANS_TITLE_Y);
    writer.font_size(SCANS_BODY_SIZE);

    for (index, record) in records.iter().enumerate() {
        writer.line(
            format!(
                "{}. {} - Score: {}",
                index + 1,
                format_timestamp(record.created_at)?,
                record.toxicity_score
            ),
            SCANS_LINE_HEIGHT,
        );

        for text_line in wrap_text(&record.original_text, SCANS_WRAP_COLUMNS) {
            writer.break_if_below(SCANS_PAGE_LIMIT);
            writer.line(text_line, SCANS_LINE_HEIGHT);
        }

        writer.gap(SCANS_LINE_HEIGHT / 2.0);
    }

    Ok(writer.finish(title))
}

/// Lays out the history report generated at `generated_at`.
///
/// # Errors
/// Returns [`ExportError::Format`] when a timestamp cannot be formatted.
pub fn history_report(
    records: &[ScanRecord],
    generated_at: OffsetDateTime,
) -> Result<Document, ExportError> {
    let mut writer = PageWriter::new(HISTORY_MARGIN);
    writer.font_size(HISTORY_TITLE_SIZE);
    writer.line(HISTORY_REPORT_TITLE, 15.0);
    writer.font_size(HISTORY_GENERATED_SIZE);
    writer.line(
        format!("Generated: {}", format_timestamp(generated_at)?),
        15.0,
    );

    for (index, record) in records.iter().enumerate() {
        writer.break_if_below(PAGE_HEIGHT - HISTORY_BOTTOM_MARGIN);

        writer.font_size(HISTORY_HEADING_SIZE);
        writer.line(format!("Scan #{}", index + 1), 7.0);
        writer.font_size(HISTORY_BODY_SIZE);
        writer.line(
            format!("Date: {}", format_timestamp(record.created_at)?),
            5.0,
        );
        writer.line(
            format!("Toxicity Score: {}/100", record.toxicity_score),
            5.0,
        );
        writer.line(
            format!("Categories: {}", record.categories.join(", ")),
            7.0,
        );

        let message = wrap_text(
            &format!("Message: {}", record.original_text),
            HISTORY_WRAP_COLUMNS,
        );
        let advance = message.len() as f32 * 5.0 + 10.0;
        writer.block(message);
        writer.gap(advance);
    }

    Ok(writer.finish(HISTORY_REPORT_TITLE))
}

/// Greedy word wrap honoring embedded newlines.
///
/// Words longer than `columns` are split across lines. Empty input yields a
/// single empty line.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();

            while chars.len() > columns {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = chars.split_off(columns);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }

            let word_len = chars.len();
            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed > columns && current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chars);
            current_len += word_len;
        }

        lines.push(current);
    }

    lines
}

fn format_timestamp(at: OffsetDateTime) -> Result<String, ExportError> {
    Ok(at
        .to_offset(time::UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)?)
}

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Report file could not be written.
    #[error("report write failure: {0}")]
    Io(#[from] std::io::Error),
    /// PDF document could not be encoded.
    #[error("pdf encoding failure: {0}")]
    Pdf(String),
    /// Timestamp could not be formatted.
    #[error("timestamp format failure: {0}")]
    Format(#[from] time::error::Format),
}
