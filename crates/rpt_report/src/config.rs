//! crates/rpt_report/src/config.rs
//! Render configuration and its layering.
//!
//! Precedence (lowest → highest): built-in defaults, the definition's
//! `render` section, explicit overrides from the caller (CLI flags).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rpt_io::loader::RenderSection;
use serde::{Deserialize, Serialize};

use crate::ReportError;

pub const DEFAULT_TEMPLATE: &str = "report.html";
pub const DEFAULT_PDF_COMMAND: &str = "weasyprint";
pub const DEFAULT_OUTPUT_STEM: &str = "report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Html,
    #[default]
    Pdf,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Html => "html",
            OutputMode::Pdf => "pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = ReportError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(OutputMode::Html),
            "pdf" => Ok(OutputMode::Pdf),
            other => Err(ReportError::Config(format!("unknown output format: {other} (expected html|pdf)"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub output: PathBuf,
    pub mode: OutputMode,
    /// Template name looked up in the environment.
    pub template: String,
    /// When set, templates load from this directory instead of the built-in set.
    pub template_dir: Option<PathBuf>,
    /// Root against which relative asset references in the markup resolve.
    pub base_url: PathBuf,
    /// Program (optionally with arguments) used for PDF export.
    pub pdf_command: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(format!("{DEFAULT_OUTPUT_STEM}.{}", OutputMode::Pdf.extension())),
            mode: OutputMode::Pdf,
            template: DEFAULT_TEMPLATE.to_string(),
            template_dir: None,
            base_url: PathBuf::from("."),
            pdf_command: DEFAULT_PDF_COMMAND.to_string(),
        }
    }
}

impl RenderConfig {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self { output: output.into(), ..Self::default() }
    }

    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.template = name.into();
        self
    }

    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    pub fn base_url(mut self, root: impl Into<PathBuf>) -> Self {
        self.base_url = root.into();
        self
    }

    pub fn pdf_command(mut self, command: impl Into<String>) -> Self {
        self.pdf_command = command.into();
        self
    }

    /// Defaults for a definition living in `base_dir`, with its `render`
    /// section applied on top. Without an explicit output the file lands
    /// next to the definition as `report.<ext>`.
    pub fn from_definition(section: &RenderSection, base_dir: &Path) -> Result<Self, ReportError> {
        let mut cfg = RenderConfig { base_url: base_dir.to_path_buf(), ..RenderConfig::default() };
        if let Some(f) = &section.format {
            cfg.mode = f.parse()?;
        }
        cfg.output = match &section.output {
            Some(p) => p.clone(),
            None => base_dir.join(format!("{DEFAULT_OUTPUT_STEM}.{}", cfg.mode.extension())),
        };
        if let Some(t) = &section.template {
            cfg.template = t.clone();
        }
        if let Some(d) = &section.template_dir {
            cfg.template_dir = Some(d.clone());
        }
        if let Some(b) = &section.base_url {
            cfg.base_url = b.clone();
        }
        if let Some(c) = &section.pdf_command {
            cfg.pdf_command = c.clone();
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_tokens_parse_case_insensitively() {
        assert_eq!("html".parse::<OutputMode>().unwrap(), OutputMode::Html);
        assert_eq!(" PDF ".parse::<OutputMode>().unwrap(), OutputMode::Pdf);
        assert!(matches!("docx".parse::<OutputMode>(), Err(ReportError::Config(_))));
    }

    #[test]
    fn definition_section_overrides_defaults() {
        let section = RenderSection {
            format: Some("html".into()),
            template: Some("custom.html".into()),
            pdf_command: Some("wkhtmltopdf - {output}".into()),
            ..RenderSection::default()
        };
        let cfg = RenderConfig::from_definition(&section, Path::new("defs")).unwrap();
        assert_eq!(cfg.mode, OutputMode::Html);
        assert_eq!(cfg.output, PathBuf::from("defs/report.html"));
        assert_eq!(cfg.template, "custom.html");
        assert_eq!(cfg.template_dir, None);
        assert_eq!(cfg.base_url, PathBuf::from("defs"));
        assert_eq!(cfg.pdf_command, "wkhtmltopdf - {output}");
    }

    #[test]
    fn empty_section_keeps_defaults() {
        let cfg = RenderConfig::from_definition(&RenderSection::default(), Path::new(".")).unwrap();
        assert_eq!(cfg.mode, OutputMode::Pdf);
        assert_eq!(cfg.output, PathBuf::from("./report.pdf"));
        assert_eq!(cfg.template, DEFAULT_TEMPLATE);
        assert_eq!(cfg.pdf_command, DEFAULT_PDF_COMMAND);
    }
}
