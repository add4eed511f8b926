// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use chrono::{Local, Utc};
use serde_json::{json, Value};

use crate::{Tool, ToolCall, ToolOutput};

/// Maximum length tolerated for a raw argument string before it is rejected
/// outright, regardless of allow-list membership.
const MAX_ARG_LEN: usize = 32;

fn is_shell_metacharacter(c: char) -> bool {
    matches!(c, ';' | '|' | '&' | '$' | '`' | '>' | '<' | '\n' | '\\' | '(' | ')')
}

fn sanitized_choice<'a>(raw: Option<&'a str>, allowed: &[&'a str], default: &'a str) -> &'a str {
    match raw {
        Some(s) if s.len() <= MAX_ARG_LEN && !s.chars().any(is_shell_metacharacter) && allowed.contains(&s) => s,
        // Unknown, oversized, or unsafe values silently coerce to the default
        // rather than erroring — the contract every built-in tool follows.
        _ => default,
    }
}

/// `get_current_time(format?, timezone?)` — demonstrates the validation
/// contract every local tool must follow.
pub struct GetCurrentTime;

#[async_trait]
impl Tool for GetCurrentTime {
    fn name(&self) -> &str {
        "get_current_time"
    }

    fn description(&self) -> &str {
        "Returns the current date and/or time."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "enum": ["datetime", "date", "time", "iso"],
                    "description": "Output format; defaults to \"datetime\"."
                },
                "timezone": {
                    "type": "string",
                    "enum": ["utc", "local"],
                    "description": "Timezone to report in; defaults to \"utc\"."
                }
            }
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let raw_format = call.args.get("format").and_then(Value::as_str);
        let raw_timezone = call.args.get("timezone").and_then(Value::as_str);

        let format = sanitized_choice(raw_format, &["datetime", "date", "time", "iso"], "datetime");
        let timezone = sanitized_choice(raw_timezone, &["utc", "local"], "utc");

        let rendered = match timezone {
            "local" => render(Local::now(), format),
            _ => render(Utc::now(), format),
        };

        ToolOutput::ok(&call.id, rendered)
    }
}

fn render<Tz: chrono::TimeZone>(now: chrono::DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match format {
        "date" => now.format("%Y-%m-%d").to_string(),
        "time" => now.format("%H:%M:%S").to_string(),
        "iso" => now.to_rfc3339(),
        _ => now.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
