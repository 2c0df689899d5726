//! Shared output layer: human text or stable JSON for every command.
//!
//! Results go to stdout; errors go to stderr. In JSON mode an error is
//! written as `{"error": {"message": ..., "suggestion": ..., "error_code": ...}}`
//! so scripts can branch on the `E####` code.

use serde::Serialize;
use sift_core::ErrorCode;
use sift_core::lock::LockError;
use sift_core::{Item, SiftError, State};
use std::io::{self, Write};

use crate::session::{ConfigError, ResolveError};

/// Width of the label column in key/value output.
const KV_LABEL_WIDTH: usize = 12;

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(
        w,
        "{:<width$} {}",
        format!("{key}:"),
        value.as_ref(),
        width = KV_LABEL_WIDTH
    )
}

/// The output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Plain text for people at a terminal.
    Human,
    /// Machine-readable JSON, one document per invocation.
    Json,
}

impl OutputMode {
    pub const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Human }
    }

    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Checkbox marker used in list rows.
pub const fn state_marker(state: State) -> &'static str {
    match state {
        State::Unchecked => "[ ]",
        State::Checked => "[x]",
        State::Removed => "[-]",
    }
}

/// One list row: `[x] 0190a5b2  buy milk`.
pub fn item_row(w: &mut dyn Write, item: &Item) -> io::Result<()> {
    writeln!(
        w,
        "{} {}  {}",
        state_marker(item.state),
        item.id.short(),
        item.title
    )
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode the value is serialized with `serde_json`; otherwise
/// `human_fn` writes the text form.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (`E####`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Attach the code and hint of `code`.
    #[must_use]
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.error_code = Some(code.code().to_string());
        self.suggestion = code.hint().map(str::to_string);
        self
    }

    /// Build from an `anyhow` chain, picking up the code of the first
    /// typed error found in it.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let base = Self::new(format!("{err:#}"));
        match error_code_of(err) {
            Some(code) => base.with_code(code),
            None => base,
        }
    }
}

fn error_code_of(err: &anyhow::Error) -> Option<ErrorCode> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<SiftError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<LockError>() {
            Some(e.code())
        } else if cause.is::<ConfigError>() {
            Some(ErrorCode::ConfigParseError)
        } else {
            cause.downcast_ref::<ResolveError>().map(ResolveError::code)
        }
    })
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(suggestion) = &error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}
