//! crates/rpt_report/src/export.rs
//! HTML → PDF export through an external converter.
//!
//! `CommandExporter` spawns the converter, feeds the rendered markup on
//! stdin and waits. Arguments may carry `{output}` and `{base_url}`
//! placeholders; without explicit arguments the WeasyPrint calling
//! convention is used (`- {output} --base-url {base_url}`).

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Arguments used when the command names only a program.
pub const DEFAULT_ARGS: [&str; 4] = ["-", "{output}", "--base-url", "{base_url}"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("pdf command is empty")]
    EmptyCommand,

    #[error("pdf command has unbalanced quotes: {0}")]
    Unparsable(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to feed markup to {program}: {source}")]
    Stdin {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Status { program: String, status: String, stderr: String },
}

/// Writes a PDF document for `html` at `output`; relative asset references
/// resolve against `base_url`.
pub trait PdfExporter {
    fn export(&self, html: &str, base_url: &Path, output: &Path) -> Result<(), ExportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandExporter {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for CommandExporter {
    fn default() -> Self {
        Self {
            program: crate::config::DEFAULT_PDF_COMMAND.to_string(),
            args: DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CommandExporter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// Split a command line with shell quoting rules. A bare program gets [`DEFAULT_ARGS`].
    pub fn from_command_line(line: &str) -> Result<Self, ExportError> {
        let words = shlex::split(line).ok_or_else(|| ExportError::Unparsable(line.to_string()))?;
        let mut parts = words.into_iter();
        let program = parts.next().ok_or(ExportError::EmptyCommand)?;
        let mut args: Vec<String> = parts.collect();
        if args.is_empty() {
            args = DEFAULT_ARGS.iter().map(|s| s.to_string()).collect();
        }
        Ok(Self { program, args })
    }

    fn expanded_args(&self, base_url: &Path, output: &Path) -> Vec<String> {
        let out = output.to_string_lossy();
        let base = base_url.to_string_lossy();
        self.args
            .iter()
            .map(|a| a.replace("{output}", &out).replace("{base_url}", &base))
            .collect()
    }
}

impl PdfExporter for CommandExporter {
    fn export(&self, html: &str, base_url: &Path, output: &Path) -> Result<(), ExportError> {
        let args = self.expanded_args(base_url, output);
        tracing::debug!(program = %self.program, ?args, "spawning pdf exporter");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExportError::Spawn { program: self.program.clone(), source })?;

        // Feed stdin from a separate thread so a chatty stderr cannot stall the child.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = html.to_owned();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let out = child
            .wait_with_output()
            .map_err(|source| ExportError::Spawn { program: self.program.clone(), source })?;

        let fed = match writer {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))),
            None => Ok(()),
        };

        if !out.status.success() {
            return Err(ExportError::Status {
                program: self.program.clone(),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        // A converter may stop reading once it has what it needs.
        match fed {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
                Err(ExportError::Stdin { program: self.program.clone(), source: e })
            }
            _ => Ok(()),
        }
    }
}
