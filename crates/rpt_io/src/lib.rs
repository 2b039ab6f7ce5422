//! crates/rpt_io/src/lib.rs
//! I/O layer for report assembly.
//!
//! - Report definitions (JSON) → `Payload` via `loader`
//! - Tabular inputs → table markup via `table::FrameFormatter`
//! - Canonical JSON + atomic file writes via `canonical_json`
//! - SHA-256 payload fingerprints via `hasher`
//!
//! Offline only: table files must be local paths.

#![forbid(unsafe_code)]

use rpt_core::CoreError;
use thiserror::Error;

/// Unified error for rpt_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors.
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON parse or shape errors with a JSON Pointer into the offending document.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Definition-level problems that are not JSON shape errors (e.g. URL table paths).
    #[error("definition error: {0}")]
    Definition(String),

    /// Domain errors raised while building the payload.
    #[error("{pointer}: {source}")]
    Core {
        pointer: String,
        #[source]
        source: CoreError,
    },
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps no pointer; callers enrich it where they can.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod table;

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_bytes, write_atomic, write_canonical_file};
    pub use crate::hasher::{payload_fingerprint, sha256_hex};
    pub use crate::loader::{load_report, LoadedReport, RenderSection};
    pub use crate::table::FrameFormatter;
}
