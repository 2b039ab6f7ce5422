//! crates/rpt_report/src/report.rs
//! `Report`: report-level settings + the render pipeline.
//!
//! `create_report` order:
//! 1. merge title/theme into the payload
//! 2. verbose → pretty payload on the log channel
//! 3. render the configured template
//! 4. html → write markup; pdf → hand markup + base URL to the exporter

use std::fs;
use std::path::{Path, PathBuf};

use rpt_core::{CoreError, PageFields, Payload, Theme};
use rpt_io::canonical_json::write_atomic;
use rpt_io::hasher::payload_fingerprint;
use rpt_io::table::FrameFormatter;

use crate::config::{OutputMode, RenderConfig};
use crate::export::{CommandExporter, PdfExporter};
use crate::template;
use crate::ReportError;

/// What `create_report` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub mode: OutputMode,
    pub output: PathBuf,
    /// Length of the rendered markup.
    pub html_bytes: usize,
    /// SHA-256 of the canonical payload JSON.
    pub payload_sha256: String,
}

pub struct Report {
    config: RenderConfig,
    title: Option<String>,
    theme: Theme,
    exporter: Box<dyn PdfExporter>,
}

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Report")
            .field("config", &self.config)
            .field("title", &self.title)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

impl Report {
    /// Build a report whose PDF exporter is the configured command.
    pub fn new(config: RenderConfig) -> Result<Self, ReportError> {
        let exporter = CommandExporter::from_command_line(&config.pdf_command)?;
        Ok(Self::with_exporter(config, Box::new(exporter)))
    }

    pub fn with_exporter(config: RenderConfig, exporter: Box<dyn PdfExporter>) -> Self {
        Self { config, title: None, theme: Theme::default(), exporter }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_accent_background_color(&mut self, color: impl Into<String>) -> Result<(), CoreError> {
        self.theme = self.theme.clone().with_background(color)?;
        Ok(())
    }

    pub fn set_accent_font_color(&mut self, color: impl Into<String>) -> Result<(), CoreError> {
        self.theme = self.theme.clone().with_font(color)?;
        Ok(())
    }

    /// A fresh, empty payload to append pages to.
    pub fn get_payload() -> Payload {
        Payload::new()
    }

    /// Append a page, converting any table source with the frame formatter.
    pub fn add_page(payload: Payload, fields: PageFields) -> Result<Payload, CoreError> {
        payload.add_page(fields, &FrameFormatter::default())
    }

    /// Merge report-level settings into `payload`. The payload's own title
    /// survives unless a title was set on the report.
    pub fn extend_payload(&self, mut payload: Payload) -> Result<Payload, ReportError> {
        if let Some(t) = &self.title {
            payload.set_title(t.clone());
        }
        payload.set_theme(&self.theme)?;
        Ok(payload)
    }

    /// Render markup only (no file output).
    pub fn render_html(&self, payload: &Payload) -> Result<String, ReportError> {
        let env = template::environment_for(self.config.template_dir.as_deref())?;
        Ok(template::render_payload(&env, &self.config.template, payload)?)
    }

    pub fn create_report(&self, payload: Payload, mode: OutputMode, verbose: bool) -> Result<RenderOutcome, ReportError> {
        let payload = self.extend_payload(payload)?;
        if verbose {
            let pretty = serde_json::to_string_pretty(&payload)?;
            tracing::info!(payload = %pretty, "report payload");
        }

        let html = self.render_html(&payload)?;
        let output = self.config.output.clone();
        match mode {
            OutputMode::Html => {
                write_atomic(&output, html.as_bytes())
                    .map_err(|source| ReportError::Write { path: output.clone(), source })?;
            }
            OutputMode::Pdf => {
                ensure_parent(&output)?;
                self.exporter.export(&html, &self.config.base_url, &output)?;
            }
        }

        let outcome = RenderOutcome {
            mode,
            output,
            html_bytes: html.len(),
            payload_sha256: payload_fingerprint(&payload)?,
        };
        tracing::info!(
            mode = %outcome.mode,
            output = %outcome.output.display(),
            pages = payload.pages().len(),
            html_bytes = outcome.html_bytes,
            "report written"
        );
        Ok(outcome)
    }
}

fn ensure_parent(path: &Path) -> Result<(), ReportError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| ReportError::Write { path: dir.to_path_buf(), source })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpt_core::PageType;

    #[test]
    fn report_title_overrides_payload_title_only_when_set() {
        let report = Report::with_exporter(RenderConfig::default(), Box::new(CommandExporter::default()));
        let mut payload = Report::get_payload();
        payload.set_title("from payload");
        let kept = report.extend_payload(payload.clone()).unwrap();
        assert_eq!(kept.report().title, "from payload");

        let mut report = report;
        report.set_title("from report");
        let replaced = report.extend_payload(payload).unwrap();
        assert_eq!(replaced.report().title, "from report");
    }

    #[test]
    fn accent_colours_are_validated_and_merged() {
        let mut report = Report::with_exporter(RenderConfig::default(), Box::new(CommandExporter::default()));
        report.set_accent_background_color("#9f85ca").unwrap();
        assert!(report.set_accent_font_color("white").is_err());
        report.set_accent_font_color("#fff").unwrap();

        let payload = report.extend_payload(Report::get_payload()).unwrap();
        assert_eq!(payload.report().accent_background_color.as_deref(), Some("#9f85ca"));
        assert_eq!(payload.report().accent_font_color.as_deref(), Some("#fff"));
    }

    #[test]
    fn add_page_formats_record_tables() {
        let payload = Report::add_page(
            Report::get_payload(),
            PageFields::new(PageType::Report, "t").table_source(serde_json::json!([{"a": 1}])),
        )
        .unwrap();
        let table = payload.pages()[0].page_table.as_deref().unwrap();
        assert!(table.contains("<th>a</th>"));
    }

    #[test]
    fn empty_pdf_command_is_rejected() {
        let err = Report::new(RenderConfig::default().pdf_command("  ")).unwrap_err();
        assert!(matches!(err, ReportError::Export(_)));
    }
}
