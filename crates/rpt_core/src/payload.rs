//! crates/rpt_core/src/payload.rs
//! Payload builder: report-level metadata + the ordered page sequence.
//!
//! `add_page` consumes the payload and hands it back, so exactly one
//! instance is current at render time:
//!
//! ```
//! use rpt_core::{PageFields, PageType, PassthroughTables, Payload};
//!
//! let mut payload = Payload::new();
//! payload.set_title("Monthly trading");
//! let payload = payload
//!     .add_page(PageFields::new(PageType::Cover, "Monthly trading"), &PassthroughTables)?
//!     .add_page(PageFields::new(PageType::Report, "Sessions"), &PassthroughTables)?;
//! assert_eq!(payload.pages().len(), 2);
//! # Ok::<(), rpt_core::CoreError>(())
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoreError;
use crate::page::{Page, PageFields};
use crate::theme::Theme;

// ----------------------------- Table collaborator -----------------------------

/// Converts a tabular input into table markup.
///
/// Returning `None` means the input is not a recognized table; the page is
/// then appended without one.
pub trait TableFormatter {
    fn to_markup(&self, source: &Value) -> Option<String>;
}

/// Accepts only pre-rendered markup (a JSON string).
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTables;

impl TableFormatter for PassthroughTables {
    fn to_markup(&self, source: &Value) -> Option<String> {
        source.as_str().map(str::to_string)
    }
}

// ----------------------------- Payload -----------------------------

/// The `report` object of the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_font_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    report: ReportMeta,
    pages: Vec<Page>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.report.title = title.into();
    }

    /// Copy validated accent colours into the report metadata. Unset colours stay untouched.
    pub fn set_theme(&mut self, theme: &Theme) -> Result<(), CoreError> {
        theme.validate()?;
        if let Some(bg) = &theme.accent_background_color {
            self.report.accent_background_color = Some(bg.clone());
        }
        if let Some(fg) = &theme.accent_font_color {
            self.report.accent_font_color = Some(fg.clone());
        }
        Ok(())
    }

    pub fn report(&self) -> &ReportMeta {
        &self.report
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Append one page and return the extended payload.
    pub fn add_page(mut self, fields: PageFields, tables: &dyn TableFormatter) -> Result<Self, CoreError> {
        let page_type = fields
            .page_type
            .ok_or(CoreError::MissingRequiredField { field: "page_type" })?;
        let page_title = fields
            .page_title
            .ok_or(CoreError::MissingRequiredField { field: "page_title" })?;
        let page_table = fields
            .page_table_source
            .as_ref()
            .and_then(|source| tables.to_markup(source));

        self.pages.push(Page {
            page_type,
            page_layout: fields.page_layout,
            page_title,
            page_subheading: fields.page_subheading,
            page_commentary: fields.page_commentary,
            page_message: fields.page_message,
            page_notification: fields.page_notification,
            page_metrics: fields.page_metrics,
            page_table,
            page_visualisation: fields.page_visualisation,
            page_background: fields.page_background,
        });
        Ok(self)
    }
}

/// Empty payload: no title, no pages.
pub fn new_payload() -> Payload {
    Payload::new()
}
