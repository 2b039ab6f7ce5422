//! Loader: read a local JSON report definition, resolve relative paths under
//! the definition's directory, compute metric tiles, and append pages in
//! order to a fresh `Payload`. No network I/O.
//!
//! Definition shape (unknown fields rejected at every level):
//! ```json
//! {
//!   "title": "Monthly trading",
//!   "theme":  { "accent_background_color": "#9f85ca", "accent_font_color": "#fff" },
//!   "render": { "output": "out/report.pdf", "format": "pdf", "template": "report.html",
//!               "template_dir": "templates", "base_url": ".", "pdf_command": "weasyprint" },
//!   "pages": [
//!     { "page_type": "report", "page_title": "Sessions", "page_layout": "simple",
//!       "page_metrics": [ { "title": "Sessions", "now": 4076, "before": 3286 } ],
//!       "page_table_path": "tables/sessions.json" }
//!   ]
//! }
//! ```

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rpt_core::{
    CoreError, MessageStyle, MetricSpec, PageFields, PageLayout, PageMessage, PageType, Payload,
    TableFormatter, Theme,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::table::FrameFormatter;
use crate::{looks_like_url_strict, IoError};

const MAX_DEFINITION_BYTES: u64 = 8 * 1024 * 1024;
const MAX_TABLE_BYTES: u64 = 16 * 1024 * 1024;

// ----------------------------- Wire-facing types -----------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportDefinition {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub pages: Vec<PageDefinition>,
}

/// Render settings carried by a definition. Every field is optional; the
/// CLI layers its own flags on top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSection {
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// `html` or `pdf`; validated by the renderer.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    #[serde(default)]
    pub base_url: Option<PathBuf>,
    #[serde(default)]
    pub pdf_command: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageDefinition {
    pub message: String,
    pub style: String,
}

/// One page as written in a definition. Tokens stay strings until
/// `build_payload` so errors can point at the offending page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageDefinition {
    #[serde(default)]
    pub page_type: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub page_layout: Option<String>,
    #[serde(default)]
    pub page_subheading: Option<String>,
    #[serde(default)]
    pub page_commentary: Option<String>,
    #[serde(default)]
    pub page_message: Option<MessageDefinition>,
    #[serde(default)]
    pub page_notification: Option<String>,
    #[serde(default)]
    pub page_metrics: Option<Vec<MetricSpec>>,
    /// Inline table: records, split frame, or pre-rendered markup.
    #[serde(default)]
    pub page_table: Option<Value>,
    /// Local file holding the table (`.json` frame or markup text).
    #[serde(default)]
    pub page_table_path: Option<String>,
    #[serde(default)]
    pub page_visualisation: Option<String>,
    #[serde(default)]
    pub page_background: Option<String>,
}

/// Result of loading a definition from disk.
#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub payload: Payload,
    /// Render section with relative paths already joined under `base_dir`.
    pub render: RenderSection,
    /// Directory of the definition file.
    pub base_dir: PathBuf,
    pub source: PathBuf,
}

// ----------------------------- Entry points -----------------------------

/// Read, parse and build a definition with the default table formatter.
pub fn load_report(path: &Path) -> Result<LoadedReport, IoError> {
    let def = read_definition(path)?;
    let base_dir = base_dir_of(path);

    let payload = build_payload(&def, &base_dir, &FrameFormatter::default())?;
    let render = resolve_render(&def.render, &base_dir)?;
    tracing::debug!(
        source = %path.display(),
        pages = payload.pages().len(),
        "definition loaded"
    );

    Ok(LoadedReport { payload, render, base_dir, source: path.to_path_buf() })
}

pub fn read_definition(path: &Path) -> Result<ReportDefinition, IoError> {
    let text = read_text_with_limit(path, MAX_DEFINITION_BYTES)?;
    parse_definition(&text)
}

pub fn parse_definition(text: &str) -> Result<ReportDefinition, IoError> {
    serde_json::from_str(text).map_err(|e| IoError::Json { pointer: "/".into(), msg: e.to_string() })
}

/// Turn a parsed definition into a payload. Pages are appended in definition order.
pub fn build_payload(
    def: &ReportDefinition,
    base_dir: &Path,
    tables: &dyn TableFormatter,
) -> Result<Payload, IoError> {
    let mut payload = Payload::new();
    payload.set_title(def.title.clone());
    if let Some(theme) = &def.theme {
        payload.set_theme(theme).map_err(|e| core_at("/theme", e))?;
    }

    for (i, page) in def.pages.iter().enumerate() {
        let ptr = format!("/pages/{i}");
        let fields = page_fields(page, &ptr, base_dir)?;
        let wants_table = fields.page_table_source.is_some();

        payload = payload.add_page(fields, tables).map_err(|e| core_at(&ptr, e))?;

        if wants_table && payload.pages().last().map_or(false, |p| p.page_table.is_none()) {
            tracing::debug!(page = %ptr, "table input not recognized; page kept without a table");
        }
    }

    Ok(payload)
}

// ----------------------------- Page conversion -----------------------------

fn page_fields(page: &PageDefinition, ptr: &str, base_dir: &Path) -> Result<PageFields, IoError> {
    let page_type = page
        .page_type
        .as_deref()
        .map(|s| s.parse::<PageType>())
        .transpose()
        .map_err(|e| core_at(&format!("{ptr}/page_type"), e))?;
    let page_layout = page
        .page_layout
        .as_deref()
        .map(|s| s.parse::<PageLayout>())
        .transpose()
        .map_err(|e| core_at(&format!("{ptr}/page_layout"), e))?;
    let page_message = match &page.page_message {
        Some(m) => Some(PageMessage::new(m.message.clone(), MessageStyle::from(m.style.as_str()))),
        None => None,
    };
    let page_metrics = match &page.page_metrics {
        Some(specs) => {
            let mut tiles = Vec::with_capacity(specs.len());
            for (j, spec) in specs.iter().enumerate() {
                let tile = spec.compute().map_err(|e| core_at(&format!("{ptr}/page_metrics/{j}"), e))?;
                tiles.push(tile);
            }
            Some(tiles)
        }
        None => None,
    };
    let page_table_source = table_source(page, ptr, base_dir)?;

    Ok(PageFields {
        page_type,
        page_title: page.page_title.clone(),
        page_layout,
        page_subheading: page.page_subheading.clone(),
        page_commentary: page.page_commentary.clone(),
        page_message,
        page_notification: page.page_notification.clone(),
        page_metrics,
        page_table_source,
        page_visualisation: page.page_visualisation.clone(),
        page_background: page.page_background.clone(),
    })
}

fn table_source(page: &PageDefinition, ptr: &str, base_dir: &Path) -> Result<Option<Value>, IoError> {
    match (&page.page_table, &page.page_table_path) {
        (Some(_), Some(_)) => Err(IoError::Definition(format!(
            "{ptr}: page_table and page_table_path are mutually exclusive"
        ))),
        (Some(inline), None) => Ok(Some(inline.clone())),
        (None, Some(rel)) => {
            if looks_like_url_strict(rel) {
                return Err(IoError::Definition(format!(
                    "{ptr}/page_table_path: URLs are not allowed (offline only): {rel}"
                )));
            }
            let path = join_under(base_dir, Path::new(rel));
            let text = read_text_with_limit(&path, MAX_TABLE_BYTES)?;
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| e.eq_ignore_ascii_case("json"));
            if is_json {
                let v: Value = serde_json::from_str(&text).map_err(|e| IoError::Json {
                    pointer: format!("{ptr}/page_table_path"),
                    msg: format!("{} ({e})", path.display()),
                })?;
                Ok(Some(v))
            } else {
                Ok(Some(Value::String(text)))
            }
        }
        (None, None) => Ok(None),
    }
}

// ----------------------------- Paths -----------------------------

fn resolve_render(render: &RenderSection, base_dir: &Path) -> Result<RenderSection, IoError> {
    for (label, p) in [("template_dir", &render.template_dir), ("base_url", &render.base_url)] {
        if let Some(p) = p {
            if looks_like_url_strict(&p.to_string_lossy()) {
                return Err(IoError::Definition(format!(
                    "/render/{label}: URLs are not allowed (offline only): {}",
                    p.display()
                )));
            }
        }
    }

    Ok(RenderSection {
        output: render.output.as_deref().map(|p| join_under(base_dir, p)),
        format: render.format.clone(),
        template: render.template.clone(),
        template_dir: render.template_dir.as_deref().map(|p| join_under(base_dir, p)),
        base_url: render.base_url.as_deref().map(|p| join_under(base_dir, p)),
        pdf_command: render.pdf_command.clone(),
    })
}

fn base_dir_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn join_under(base: &Path, rel: &Path) -> PathBuf {
    if rel.is_absolute() {
        rel.to_path_buf()
    } else {
        base.join(rel)
    }
}

fn read_text_with_limit(path: &Path, limit: u64) -> Result<String, IoError> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{} ({e})", path.display())))?;
    let mut buf = String::new();
    let n = f
        .take(limit + 1)
        .read_to_string(&mut buf)
        .map_err(|e| IoError::Path(format!("{} ({e})", path.display())))?;
    if n as u64 > limit {
        return Err(IoError::Path(format!("{}: file exceeds {limit} bytes", path.display())));
    }
    Ok(buf)
}

fn core_at(pointer: &str, source: CoreError) -> IoError {
    IoError::Core { pointer: pointer.to_string(), source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpt_core::PassthroughTables;

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse_definition(r#"{"title":"T","pages":[],"colour":"red"}"#).unwrap_err();
        assert!(matches!(err, IoError::Json { .. }));

        let err = parse_definition(r#"{"pages":[{"page_type":"cover","page_title":"x","page_tittle":"y"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("page_tittle"));
    }

    #[test]
    fn unknown_token_points_at_the_page() {
        let def = parse_definition(r#"{"pages":[{"page_type":"cover","page_title":"a"},{"page_type":"appendix","page_title":"b"}]}"#)
            .unwrap();
        let err = build_payload(&def, Path::new("."), &PassthroughTables).unwrap_err();
        match err {
            IoError::Core { pointer, source } => {
                assert_eq!(pointer, "/pages/1/page_type");
                assert_eq!(source, CoreError::UnknownToken { field: "page_type", value: "appendix".into() });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn any_message_style_passes_through() {
        let def = parse_definition(
            r#"{"pages":[{"page_type":"report","page_title":"m","page_message":{"message":"hi","style":"primary"}}]}"#,
        )
        .unwrap();
        let payload = build_payload(&def, Path::new("."), &PassthroughTables).unwrap();
        let msg = payload.pages()[0].page_message.as_ref().unwrap();
        assert_eq!(msg.style, MessageStyle::Other("primary".into()));

        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["pages"][0]["page_message"]["style"], "primary");
    }

    #[test]
    fn missing_title_is_a_core_error() {
        let def = parse_definition(r#"{"pages":[{"page_type":"report"}]}"#).unwrap();
        let err = build_payload(&def, Path::new("."), &PassthroughTables).unwrap_err();
        assert!(matches!(
            err,
            IoError::Core { source: CoreError::MissingRequiredField { field: "page_title" }, .. }
        ));
    }

    #[test]
    fn bad_metric_points_at_the_tile() {
        let def = parse_definition(
            r#"{"pages":[{"page_type":"report","page_title":"m","page_metrics":[{"title":"ok","now":1},{"title":"bad","now":"n/a"}]}]}"#,
        )
        .unwrap();
        let err = build_payload(&def, Path::new("."), &PassthroughTables).unwrap_err();
        assert!(err.to_string().starts_with("/pages/0/page_metrics/1:"));
    }

    #[test]
    fn inline_and_path_tables_are_exclusive() {
        let def = parse_definition(
            r#"{"pages":[{"page_type":"report","page_title":"t","page_table":"<table/>","page_table_path":"t.json"}]}"#,
        )
        .unwrap();
        let err = build_payload(&def, Path::new("."), &PassthroughTables).unwrap_err();
        assert!(matches!(err, IoError::Definition(_)));
    }

    #[test]
    fn url_table_paths_are_rejected() {
        let def = parse_definition(
            r#"{"pages":[{"page_type":"report","page_title":"t","page_table_path":"https://example.com/t.json"}]}"#,
        )
        .unwrap();
        let err = build_payload(&def, Path::new("."), &PassthroughTables).unwrap_err();
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn render_paths_join_under_base_dir() {
        let render = RenderSection {
            output: Some("out/report.html".into()),
            template_dir: Some("tpl".into()),
            base_url: Some("/abs/assets".into()),
            ..RenderSection::default()
        };
        let r = resolve_render(&render, Path::new("defs")).unwrap();
        assert_eq!(r.output, Some(PathBuf::from("defs/out/report.html")));
        assert_eq!(r.template_dir, Some(PathBuf::from("defs/tpl")));
        assert_eq!(r.base_url, Some(PathBuf::from("/abs/assets")));

        let bad = RenderSection { base_url: Some("file:///tmp".into()), ..RenderSection::default() };
        assert!(matches!(resolve_render(&bad, Path::new(".")), Err(IoError::Definition(_))));
    }
}
