//! Scripted sessions.
//!
//! A script is plain text with one event per line:
//!
//! ```text
//! # start on the north line
//! click 400 500
//! zoom 2.0
//! undo
//! clear
//! reset
//! export site-a.txt
//! ```
//!
//! Blank lines and `#` comments are skipped. `export` without a path writes
//! to the configured output path.

use std::{fs, path::Path, path::PathBuf, str::FromStr};

use polar_horizon_core::HorizonPoint;
use polar_horizon_path::{ExportError, ExportOutcome};

use crate::session::{AppState, ClickOutcome};

#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: unknown event `{event}`")]
    UnknownEvent { line: usize, event: String },
    #[error("line {line}: `{event}` expects {expected} argument(s), got {got}")]
    Arity {
        line: usize,
        event: String,
        expected: usize,
        got: usize,
    },
    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },
}

/// One operator stimulus.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Click { x: f32, y: f32 },
    Zoom(f32),
    Undo,
    Clear,
    Reset,
    Export(Option<PathBuf>),
}

/// What one replayed event produced.
#[derive(Clone, Debug, PartialEq)]
pub enum EventOutcome {
    Click(ClickOutcome),
    Zoom(f32),
    Undo(Option<HorizonPoint>),
    Cleared,
    Reset,
    Exported(ExportOutcome),
}

fn number(token: &str, line: usize) -> Result<f32, ScriptError> {
    match f32::from_str(token) {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ScriptError::InvalidNumber {
            line,
            token: token.to_string(),
        }),
    }
}

fn arity(line: usize, event: &str, expected: usize, got: usize) -> ScriptError {
    ScriptError::Arity {
        line,
        event: event.to_string(),
        expected,
        got,
    }
}

/// Parse a whole script. Fails on the first malformed line.
pub fn parse_script(text: &str) -> Result<Vec<SessionEvent>, ScriptError> {
    let mut events = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = idx + 1;
        let mut tokens = line.split_whitespace();
        let Some(head) = tokens.next() else {
            continue;
        };
        let args: Vec<&str> = tokens.collect();
        let event = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("click", [x, y]) => SessionEvent::Click {
                x: number(x, line_no)?,
                y: number(y, line_no)?,
            },
            ("click", other) => return Err(arity(line_no, head, 2, other.len())),
            ("zoom", [z]) => SessionEvent::Zoom(number(z, line_no)?),
            ("zoom", other) => return Err(arity(line_no, head, 1, other.len())),
            ("undo", []) => SessionEvent::Undo,
            ("clear", []) => SessionEvent::Clear,
            ("reset", []) => SessionEvent::Reset,
            ("undo" | "clear" | "reset", other) => return Err(arity(line_no, head, 0, other.len())),
            ("export", []) => SessionEvent::Export(None),
            ("export", [dest]) => SessionEvent::Export(Some(PathBuf::from(*dest))),
            ("export", other) => return Err(arity(line_no, head, 1, other.len())),
            _ => {
                return Err(ScriptError::UnknownEvent {
                    line: line_no,
                    event: head.to_string(),
                })
            }
        };
        events.push(event);
    }
    Ok(events)
}

/// Read and parse a script file.
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<SessionEvent>, ScriptError> {
    let raw = fs::read_to_string(path)?;
    parse_script(&raw)
}

/// Apply one event to the session.
pub fn apply_event(state: &mut AppState, event: &SessionEvent) -> Result<EventOutcome, ExportError> {
    Ok(match event {
        SessionEvent::Click { x, y } => EventOutcome::Click(state.click(*x, *y)),
        SessionEvent::Zoom(z) => EventOutcome::Zoom(state.set_zoom(*z)),
        SessionEvent::Undo => EventOutcome::Undo(state.undo()),
        SessionEvent::Clear => {
            state.clear();
            EventOutcome::Cleared
        }
        SessionEvent::Reset => {
            state.reset();
            EventOutcome::Reset
        }
        SessionEvent::Export(None) => EventOutcome::Exported(state.export_default()?),
        SessionEvent::Export(Some(dest)) => EventOutcome::Exported(state.export_to(dest)?),
    })
}

/// Replay events in order. Stops at the first export failure.
pub fn replay(
    state: &mut AppState,
    events: &[SessionEvent],
) -> Result<Vec<EventOutcome>, ExportError> {
    events.iter().map(|e| apply_event(state, e)).collect()
}
