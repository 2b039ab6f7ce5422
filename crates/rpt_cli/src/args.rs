// crates/rpt_cli/src/args.rs
//
// Offline CLI argument surface + validation.
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - --definition must be an existing local file
// - --template-dir, when given, must be an existing directory
// - --verbose and --quiet are mutually exclusive
// - Relative path flags resolve against the working directory

use clap::Parser;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "rpt",
    disable_help_subcommand = true,
    about = "Build an HTML or PDF report from a JSON report definition"
)]
pub struct Args {
    /// Report definition JSON (title, theme, render settings, pages).
    #[arg(long)]
    pub definition: PathBuf,

    // --- Output & rendering (override the definition's `render` section) ---
    /// Output file (default: report.<format> next to the definition).
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_parser = ["html", "pdf"])]
    pub format: Option<String>,
    /// Template name (default: report.html).
    #[arg(long)]
    pub template: Option<String>,
    /// Load templates from this directory instead of the built-in set.
    #[arg(long)]
    pub template_dir: Option<PathBuf>,
    /// Root for relative asset references (default: the definition's directory).
    #[arg(long)]
    pub base_url: Option<PathBuf>,
    /// HTML → PDF converter, optionally with arguments ({output}, {base_url} placeholders).
    #[arg(long)]
    pub pdf_command: Option<String>,

    // --- Side outputs & control ---
    /// Also write the canonical payload JSON here.
    #[arg(long)]
    pub emit_payload: Option<PathBuf>,
    /// Load and build the payload, do not render.
    #[arg(long)]
    pub validate_only: bool,
    /// Log the full payload and debug diagnostics.
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,
    /// Only warnings and errors on stderr.
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    NotADirectory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            NotADirectory(p) => write!(f, "not a directory: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Scheme checks, existence checks, then normalization.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }

    ensure_local_exists(&args.definition, "--definition")?;
    if let Some(dir) = &args.template_dir {
        ensure_local_dir(dir, "--template-dir")?;
    }

    args.definition = normalize_path(&args.definition);
    args.output = args.output.take().map(|p| normalize_path(&p));
    args.template_dir = args.template_dir.take().map(|p| normalize_path(&p));
    args.base_url = args.base_url.take().map(|p| normalize_path(&p));
    args.emit_payload = args.emit_payload.take().map(|p| normalize_path(&p));

    Ok(args)
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        Some(args.definition.as_path()),
        args.output.as_deref(),
        args.template_dir.as_deref(),
        args.base_url.as_deref(),
        args.emit_payload.as_deref(),
    ]
    .into_iter()
    .flatten()
}

fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

fn ensure_local_dir(p: &Path, label: &'static str) -> Result<(), CliError> {
    match fs::metadata(p) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(CliError::NotADirectory(format!("{label} {}", p.display()))),
        Err(_) => Err(CliError::NotFound(format!("{label} {}", p.display()))),
    }
}

/// Best-effort normalization to an absolute path.
/// If canonicalize fails (e.g., path doesn't exist yet), produce an absolute path relative to CWD.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("rpt").chain(argv.iter().copied()))
    }

    #[test]
    fn ensure_local_path_rejects_schemes() {
        assert!(ensure_local_path(Path::new("http://x")).is_err());
        assert!(ensure_local_path(Path::new("file://C:/x.json")).is_err());
        assert!(ensure_local_path(Path::new("https://x/y.json")).is_err());
        assert!(ensure_local_path(Path::new(r"C:\local\file.json")).is_ok());
        assert!(ensure_local_path(Path::new("/tmp/file.json")).is_ok());
    }

    #[test]
    fn normalize_path_returns_absolute() {
        let abs = normalize_path(Path::new("does/not/exist.pdf"));
        assert!(abs.is_absolute());
    }

    #[test]
    fn format_is_restricted_and_flags_conflict() {
        assert!(parse(&["--definition", "d.json", "--format", "docx"]).is_err());
        assert!(parse(&["--definition", "d.json", "--verbose", "--quiet"]).is_err());
        assert!(parse(&["--format", "html"]).is_err());

        let a = parse(&["--definition", "d.json", "--format", "html", "--validate-only", "-v"]).unwrap();
        assert_eq!(a.format.as_deref(), Some("html"));
        assert!(a.validate_only && a.verbose && !a.quiet);
    }

    #[test]
    fn validate_checks_definition_and_template_dir() {
        let dir = tempfile::tempdir().unwrap();
        let def = dir.path().join("report.json");
        fs::write(&def, "{}").unwrap();
        let def_s = def.to_str().unwrap();

        let ok = validate(parse(&["--definition", def_s, "--output", "out.html"]).unwrap()).unwrap();
        assert!(ok.definition.is_absolute());
        assert!(ok.output.unwrap().is_absolute());

        let missing = validate(parse(&["--definition", "nope/report.json"]).unwrap()).unwrap_err();
        assert!(matches!(missing, CliError::NotFound(_)));

        let not_dir = validate(parse(&["--definition", def_s, "--template-dir", def_s]).unwrap()).unwrap_err();
        assert!(matches!(not_dir, CliError::NotADirectory(_)));

        let url = validate(parse(&["--definition", def_s, "--base-url", "https://cdn.example"]).unwrap()).unwrap_err();
        assert!(matches!(url, CliError::NonLocalPath(_)));
    }
}
