// crates/rpt_cli/src/main.rs
//
// rpt: definition JSON → payload → HTML/PDF.
//
// Flow: parse flags → init logging → load definition → (emit payload)
// → (validate-only stop) → layer render config → create report.
// Every failure maps to one exit-code bucket.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    pub const RENDER: i32 = 5;
}

use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args};
use rpt_io::canonical_json::write_canonical_file;
use rpt_io::hasher::payload_fingerprint;
use rpt_io::loader::{self, LoadedReport};
use rpt_io::IoError;
use rpt_report::{ExportError, RenderConfig, Report, ReportError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a tracing filter directive (e.g. `rpt_io=debug`).
const LOG_ENV: &str = "RPT_LOG";

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Definition shape, unknown tokens, metric/page/theme errors, bad settings
    Validation(String),
    /// Read/write/path errors
    Io(String),
    /// Template or PDF export failures
    Render(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Render(m) => write!(f, "render: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("rpt: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_tracing(&args);

    let rc = match run(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            tracing::error!("{e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

fn init_tracing(args: &Args) {
    let default = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

fn run(args: &Args) -> Result<(), MainError> {
    let loaded = loader::load_report(&args.definition).map_err(map_io_err)?;

    if let Some(path) = &args.emit_payload {
        write_canonical_file(path, &loaded.payload).map_err(map_io_err)?;
        tracing::info!(path = %path.display(), "payload written");
    }

    if args.validate_only {
        let digest = payload_fingerprint(&loaded.payload).map_err(map_io_err)?;
        tracing::info!(
            pages = loaded.payload.pages().len(),
            payload_sha256 = %digest,
            "validate-only: definition OK"
        );
        return Ok(());
    }

    let config = render_config(args, &loaded).map_err(map_report_err)?;
    let mode = config.mode;
    let report = Report::new(config).map_err(map_report_err)?;
    let outcome = report
        .create_report(loaded.payload, mode, args.verbose)
        .map_err(map_report_err)?;

    if !args.quiet {
        println!("{}", outcome.output.display());
    }
    Ok(())
}

/// defaults ← definition `render` section ← CLI flags
fn render_config(args: &Args, loaded: &LoadedReport) -> Result<RenderConfig, ReportError> {
    let mut section = loaded.render.clone();
    if let Some(f) = &args.format {
        section.format = Some(f.clone());
    }
    if let Some(o) = &args.output {
        section.output = Some(o.clone());
    }
    let mut cfg = RenderConfig::from_definition(&section, &loaded.base_dir)?;

    if let Some(t) = &args.template {
        cfg.template = t.clone();
    }
    if let Some(d) = &args.template_dir {
        cfg.template_dir = Some(d.clone());
    }
    if let Some(b) = &args.base_url {
        cfg.base_url = b.clone();
    }
    if let Some(c) = &args.pdf_command {
        cfg.pdf_command = c.clone();
    }
    tracing::debug!(?cfg, "render configuration");
    Ok(cfg)
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Render(_) => RENDER,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Path(m) => MainError::Io(m),
        e @ (IoError::Json { .. } | IoError::Definition(_) | IoError::Core { .. }) => {
            MainError::Validation(e.to_string())
        }
    }
}

fn map_report_err(e: ReportError) -> MainError {
    match e {
        ReportError::Write { .. } => MainError::Io(e.to_string()),
        ReportError::Config(_)
        | ReportError::Core(_)
        | ReportError::Export(ExportError::EmptyCommand | ExportError::Unparsable(_)) => {
            MainError::Validation(e.to_string())
        }
        ReportError::Template(_) | ReportError::Export(_) | ReportError::Serialize(_) => {
            MainError::Render(e.to_string())
        }
    }
}

