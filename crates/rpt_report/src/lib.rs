//! rpt_report: render a `Payload` into a document.
//!
//! - `template`: minijinja environment (built-in `report.html` or a template directory)
//! - `export`: HTML → PDF through an external converter (`PdfExporter`)
//! - `config`: output mode and render settings, layered over a definition's `render` section
//! - `report`: the `Report` orchestrator (`create_report`)
//!
//! Failures at the template, export and write boundaries are returned to the
//! caller unchanged; nothing here retries or falls back.

#![deny(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

pub mod config;
pub mod export;
pub mod report;
pub mod template;

pub use config::{OutputMode, RenderConfig, DEFAULT_PDF_COMMAND, DEFAULT_TEMPLATE};
pub use export::{CommandExporter, ExportError, PdfExporter};
pub use report::{Report, RenderOutcome};

// ===== Errors =====

#[derive(Debug, Error)]
pub enum ReportError {
    /// Template missing, syntax error, or render-time failure.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("payload serialization failed: {0}")]
    Serialize(String),

    /// Report-level settings rejected by the core (e.g. a malformed accent colour).
    #[error("{0}")]
    Core(#[from] rpt_core::CoreError),

    /// Unusable render configuration (unknown output format).
    #[error("config error: {0}")]
    Config(String),
}

impl From<rpt_io::IoError> for ReportError {
    fn from(e: rpt_io::IoError) -> Self {
        ReportError::Serialize(e.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Serialize(e.to_string())
    }
}
