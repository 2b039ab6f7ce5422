//! rpt_core: metric tiles, page records, and the payload builder.
//!
//! This crate is **I/O-free**. It defines the payload structure handed to
//! the template renderer (`rpt_report`) and built by loaders (`rpt_io`).
//!
//! - Metric tiles: numeric coercion, period-over-period change, labels
//! - Pages: typed page records with optional content regions
//! - Payload: ordered page sequence + report-level metadata
//! - Theme: accent colour validation
//!
//! Field names of every serialized type are part of the template contract.

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Error set for core-domain validation & computation.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum CoreError {
        /// Metric input could not be coerced to a number.
        InvalidMetricValue { input: String },
        /// A required page field (`page_type`, `page_title`) was absent.
        MissingRequiredField { field: &'static str },
        /// A wire token did not name a known variant.
        UnknownToken { field: &'static str, value: String },
        /// Accent colour is not a `#rgb` / `#rrggbb` hex colour.
        InvalidColor { field: &'static str, value: String },
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidMetricValue { input } => {
                    write!(f, "invalid metric value: {input:?} is not a number")
                }
                CoreError::MissingRequiredField { field } => {
                    write!(f, "missing required field: {field}")
                }
                CoreError::UnknownToken { field, value } => {
                    write!(f, "unknown {field}: {value}")
                }
                CoreError::InvalidColor { field, value } => {
                    write!(f, "invalid colour for {field}: {value}")
                }
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod metric;
pub mod page;
pub mod payload;
pub mod theme;

pub use errors::CoreError;
pub use metric::{
    compare, compute_tile, format_value, Comparison, Direction, MetricInput, MetricSpec,
    MetricTile, Number,
};
pub use page::{MessageStyle, Page, PageFields, PageLayout, PageMessage, PageType};
pub use payload::{new_payload, PassthroughTables, Payload, ReportMeta, TableFormatter};
pub use theme::Theme;
