//! Output → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one readable line per step
//! - **JSON** (`--json`): one JSON object per line, `message` plus fields

use serde_json::{Map, Value};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format one step of output.
///
/// `fields` must be a JSON object (or null); in JSON mode its entries are
/// merged next to `message`.
pub fn format_line(mode: OutputMode, message: &str, fields: Value) -> String {
    match mode {
        OutputMode::Human => message.to_string(),
        OutputMode::Json => {
            let mut object = Map::new();
            object.insert("message".to_string(), Value::String(message.to_string()));
            if let Value::Object(extra) = fields {
                object.extend(extra);
            }
            Value::Object(object).to_string()
        }
    }
}

/// Format a top-level error.
pub fn format_error(err: &anyhow::Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::json!({ "error": format!("{:#}", err) }).to_string(),
        OutputMode::Human => format!("(error) {:#}", err),
    }
}

/// Print one step to stdout.
pub fn emit(mode: OutputMode, message: &str, fields: Value) {
    println!("{}", format_line(mode, message, fields));
}
