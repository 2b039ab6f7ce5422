//! crates/rpt_report/src/template.rs
//! minijinja environment setup and payload rendering.
//!
//! - Built-in set: `report.html`, embedded at compile time.
//! - Template directory: every template comes from disk; the built-in set is not consulted.
//! - `.html` templates auto-escape; the built-in template marks commentary
//!   and table markup `|safe`.

use std::path::Path;

use minijinja::Environment;
use rpt_core::Payload;

use crate::config::DEFAULT_TEMPLATE;

static BUILTIN_REPORT: &str = include_str!("../templates/report.html");

/// Environment serving the embedded template set.
pub fn builtin_environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(DEFAULT_TEMPLATE, BUILTIN_REPORT)?;
    Ok(env)
}

/// Environment loading templates lazily from `dir`.
pub fn directory_environment(dir: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader(dir));
    env
}

pub fn environment_for(template_dir: Option<&Path>) -> Result<Environment<'static>, minijinja::Error> {
    match template_dir {
        Some(dir) => Ok(directory_environment(dir)),
        None => builtin_environment(),
    }
}

/// Render `payload` (top-level `report` and `pages`) with template `name`.
pub fn render_payload(env: &Environment<'_>, name: &str, payload: &Payload) -> Result<String, minijinja::Error> {
    let tmpl = env.get_template(name)?;
    tmpl.render(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpt_core::{
        compute_tile, MessageStyle, PageFields, PageLayout, PageMessage, PageType, PassthroughTables, Theme,
    };

    fn sample() -> Payload {
        let mut payload = Payload::new();
        payload.set_title("Gilfoyle example");
        payload
            .set_theme(&Theme::default().with_background("#9f85ca").unwrap().with_font("#fff").unwrap())
            .unwrap();
        let tile = compute_tile("Sessions", 4076, Some(3286.into()), None, None).unwrap();
        payload
            .add_page(PageFields::new(PageType::Cover, "Gilfoyle").subheading("Various examples"), &PassthroughTables)
            .and_then(|p| {
                p.add_page(
                    PageFields::new(PageType::Report, "Metrics & tables")
                        .layout(PageLayout::LeftCommentary)
                        .commentary("<p><strong>Up</strong> on last year</p>")
                        .message(PageMessage::new("Provisional <figures>", MessageStyle::Warning))
                        .metrics(vec![tile])
                        .table_source(serde_json::json!("<table class=\"t\"></table>"))
                        .visualisation("plot.png"),
                    &PassthroughTables,
                )
            })
            .unwrap()
    }

    #[test]
    fn builtin_template_renders_pages_in_order() {
        let env = builtin_environment().unwrap();
        let html = render_payload(&env, DEFAULT_TEMPLATE, &sample()).unwrap();

        assert!(html.contains("<title>Gilfoyle example</title>"));
        assert!(html.contains("--accent-bg: #9f85ca;"));
        let cover = html.find("<h1>Gilfoyle</h1>").unwrap();
        let report = html.find("<h1>Metrics &amp; tables</h1>").unwrap();
        assert!(cover < report);
        assert!(html.contains("Up 24% on last year"));
        assert!(html.contains(r#"<div class="message is-warning">Provisional &lt;figures&gt;</div>"#));
    }

    #[test]
    fn commentary_and_table_markup_are_not_escaped() {
        let env = builtin_environment().unwrap();
        let html = render_payload(&env, DEFAULT_TEMPLATE, &sample()).unwrap();
        assert!(html.contains("<p><strong>Up</strong> on last year</p>"));
        assert!(html.contains(r#"<table class="t"></table>"#));
        assert!(html.contains(r#"<img src="plot.png">"#));
    }

    #[test]
    fn unknown_template_name_is_an_error() {
        let env = builtin_environment().unwrap();
        let err = render_payload(&env, "missing.html", &Payload::new()).unwrap_err();
        assert_eq!(err.kind(), minijinja::ErrorKind::TemplateNotFound);
    }

    #[test]
    fn directory_templates_replace_the_builtin_set() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("report.html"),
            "{{ report.title }}:{% for p in pages %}[{{ p.page_title }}]{% endfor %}",
        )
        .unwrap();
        let env = environment_for(Some(dir.path())).unwrap();
        let out = render_payload(&env, DEFAULT_TEMPLATE, &sample()).unwrap();
        assert_eq!(out, "Gilfoyle example:[Gilfoyle][Metrics &amp; tables]");
    }
}
