//! crates/rpt_io/src/table.rs
//! Tabular input → `<table>` markup for the `page_dataframe` slot.
//!
//! Recognized inputs:
//! - records: `[{"col": v, ...}, ...]` (columns in first-seen order)
//! - split:   `{"columns": [...], "data": [[...], ...]}`
//! - a plain string, passed through as pre-rendered markup
//!
//! Anything else is not a table and yields `None`.
//!
//! Rendering rules:
//! - no index column; header row in `<thead>`, one `<tr>` per row in `<tbody>`
//! - cells HTML-escaped; `null` (or a missing record key) renders empty
//! - at most `max_rows` × `max_cols`; beyond that keep head/tail halves with a `...` row/column

use std::fmt::Write;

use rpt_core::TableFormatter;
use serde_json::{Map, Value};

pub const DEFAULT_MAX_ROWS: usize = 13;
pub const DEFAULT_MAX_COLS: usize = 10;

/// Class list carried by every generated table.
pub const TABLE_CLASSES: &str = "dataframe dataframe table is-striped is-fullwidth";

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormatter {
    pub max_rows: usize,
    pub max_cols: usize,
}

impl Default for FrameFormatter {
    fn default() -> Self {
        Self { max_rows: DEFAULT_MAX_ROWS, max_cols: DEFAULT_MAX_COLS }
    }
}

impl TableFormatter for FrameFormatter {
    fn to_markup(&self, source: &Value) -> Option<String> {
        match source {
            Value::String(s) => Some(s.clone()),
            Value::Array(rows) => {
                let frame = Frame::from_records(rows);
                if frame.is_none() {
                    tracing::debug!(rows = rows.len(), "table input is an array but not a list of records");
                }
                frame.map(|f| self.render(&f))
            }
            Value::Object(map) => {
                let frame = Frame::from_split(map);
                if frame.is_none() {
                    tracing::debug!("table input object is not a columns/data frame");
                }
                frame.map(|f| self.render(&f))
            }
            _ => {
                tracing::debug!("table input is neither markup nor a frame; omitted");
                None
            }
        }
    }
}

// ---- Frame ----

/// Rectangular view: header labels + rows of cells (each row `columns.len()` wide).
#[derive(Debug, Default, PartialEq)]
struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    fn from_records(records: &[Value]) -> Option<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut objects: Vec<&Map<String, Value>> = Vec::with_capacity(records.len());
        for rec in records {
            let obj = rec.as_object()?;
            for key in obj.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
            objects.push(obj);
        }
        let rows = objects
            .into_iter()
            .map(|obj| columns.iter().map(|c| obj.get(c).cloned().unwrap_or(Value::Null)).collect())
            .collect();
        Some(Frame { columns, rows })
    }

    fn from_split(map: &Map<String, Value>) -> Option<Self> {
        if map.keys().any(|k| k != "columns" && k != "data" && k != "index") {
            return None;
        }
        let columns: Vec<String> = map.get("columns")?.as_array()?.iter().map(cell_text).collect();
        let mut rows = Vec::new();
        for row in map.get("data")?.as_array()? {
            let cells = row.as_array()?;
            if cells.len() != columns.len() {
                return None;
            }
            rows.push(cells.clone());
        }
        Some(Frame { columns, rows })
    }
}

// ---- Rendering ----

/// Positions to show out of `len`, with `None` marking the elided gap.
fn visible(len: usize, limit: usize) -> Vec<Option<usize>> {
    if len <= limit {
        return (0..len).map(Some).collect();
    }
    let half = limit / 2;
    let mut out: Vec<Option<usize>> = (0..half).map(Some).collect();
    out.push(None);
    out.extend((len - half..len).map(Some));
    out
}

impl FrameFormatter {
    fn render(&self, frame: &Frame) -> String {
        let cols = visible(frame.columns.len(), self.max_cols);
        let rows = visible(frame.rows.len(), self.max_rows);

        let mut buf = String::with_capacity(256 + frame.rows.len() * 64);
        let _ = writeln!(buf, r#"<table border="1" class="{TABLE_CLASSES}">"#);

        buf.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
        for c in &cols {
            let label = match c {
                Some(i) => esc(&frame.columns[*i]),
                None => ELLIPSIS.to_string(),
            };
            let _ = writeln!(buf, "      <th>{label}</th>");
        }
        buf.push_str("    </tr>\n  </thead>\n  <tbody>\n");

        for r in &rows {
            buf.push_str("    <tr>\n");
            for c in &cols {
                let text = match (r, c) {
                    (Some(ri), Some(ci)) => esc(&cell_text(&frame.rows[*ri][*ci])),
                    _ => ELLIPSIS.to_string(),
                };
                let _ = writeln!(buf, "      <td>{text}</td>");
            }
            buf.push_str("    </tr>\n");
        }

        buf.push_str("  </tbody>\n</table>");
        buf
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}
