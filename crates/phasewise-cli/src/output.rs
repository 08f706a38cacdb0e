//! How `pw` prints: one [`OutputMode`] per run, chosen once in `main`.
//!
//! Precedence, first match wins: `--format`, `--json`, the `FORMAT` env
//! var, `output` in the user config, then pretty on a terminal and plain
//! text when piped. Unknown env/config values are skipped.
//!
//! JSON goes to stdout as a single document. Errors go to stderr, wrapped
//! as `{"error": {...}}` in JSON mode.

use clap::ValueEnum;
use phasewise_core::{ErrorCode, StoreError};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

const RULE: &str = "────────────────────────────────────────────────────────────────";
const KEY_WIDTH: usize = 14;

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{RULE}")
}

/// A heading underlined by a rule.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{key:<KEY_WIDTH$} {}", value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sections, rules and charts for a terminal.
    Pretty,
    /// Tab-separated lines for scripts.
    Text,
    /// One JSON document on stdout.
    Json,
}

impl OutputMode {
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Lenient parse for env and config values. `human`/`table` are older
    /// spellings of pretty/text.
    fn from_setting(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some(Self::Pretty),
            "text" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

fn pick_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    env_setting: Option<&str>,
    config_setting: Option<&str>,
    stdout_is_tty: bool,
) -> OutputMode {
    format_flag
        .or_else(|| json_flag.then_some(OutputMode::Json))
        .or_else(|| env_setting.and_then(OutputMode::from_setting))
        .or_else(|| config_setting.and_then(OutputMode::from_setting))
        .unwrap_or(if stdout_is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        })
}

#[must_use]
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    config_setting: Option<&str>,
) -> OutputMode {
    let env_setting = std::env::var("FORMAT").ok();
    pick_mode(
        format_flag,
        json_flag,
        env_setting.as_deref(),
        config_setting,
        io::stdout().is_terminal(),
    )
}

/// A row in a list command. JSON comes from `Serialize`; text mode prints
/// [`COLUMNS`](ListRow::COLUMNS) as a header line before the first row.
pub trait ListRow: Serialize {
    const COLUMNS: &'static [&'static str];

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Tab-separated, in `COLUMNS` order.
    fn write_text(&self, w: &mut dyn Write) -> io::Result<()>;
}

pub fn write_list<R: ListRow>(w: &mut dyn Write, rows: &[R], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *w, rows)?;
            writeln!(w)
        }
        OutputMode::Text => {
            if !rows.is_empty() {
                writeln!(w, "{}", R::COLUMNS.join("\t"))?;
            }
            rows.iter().try_for_each(|row| row.write_text(w))
        }
        OutputMode::Pretty => rows.iter().try_for_each(|row| row.write_pretty(w)),
    }
}

pub fn render_list<R: ListRow>(rows: &[R], mode: OutputMode) -> io::Result<()> {
    write_list(&mut io::stdout().lock(), rows, mode)
}

/// Print `value` as JSON, or through `text` / `pretty` for the other modes.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text(value, &mut out)?,
        OutputMode::Pretty => pretty(value, &mut out)?,
    }
    Ok(())
}

/// [`render_mode`] for commands whose text and pretty output are the same.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human: impl Fn(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    render_mode(mode, value, &human, &human)
}

/// What a failed command tells the user.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// `E####`, when the failure maps to an [`ErrorCode`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    #[must_use]
    pub fn coded(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            suggestion: code.hint().map(Into::into),
            error_code: Some(code.code().into()),
            ..Self::new(message)
        }
    }
}

impl From<&StoreError> for CliError {
    fn from(err: &StoreError) -> Self {
        Self::coded(err.to_string(), err.code())
    }
}

fn write_error(w: &mut dyn Write, mode: OutputMode, error: &CliError) -> io::Result<()> {
    if mode.is_json() {
        serde_json::to_writer_pretty(&mut *w, &serde_json::json!({ "error": error }))?;
        return writeln!(w);
    }
    let tag = error
        .error_code
        .as_deref()
        .map_or_else(|| "error".to_string(), |code| format!("error[{code}]"));
    writeln!(w, "{tag}: {}", error.message)?;
    if let Some(suggestion) = &error.suggestion {
        writeln!(w, "  suggestion: {suggestion}")?;
    }
    Ok(())
}

pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    write_error(&mut io::stderr().lock(), mode, error)?;
    Ok(())
}
