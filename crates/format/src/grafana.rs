//! Grafana alert formatters.
//!
//! Grafana changed its webhook schema in 9.x: the legacy payload carries
//! `ruleName` and `evalMatches`, the new one an `alerts` array with a
//! flattened `message`. [`format`] sniffs the version and delegates, so
//! one configured source kind covers both.

use chime_core::{ChimeError, Headers, Payload};
use serde_json::Value;

/// Format a Grafana notification, auto-detecting the schema version.
///
/// A payload with no `title`, `message`, or `evalMatches` yields an
/// empty body; that is a valid (if unhelpful) alert, not an error.
pub fn format(mut payload: Payload, headers: &Headers) -> Result<Payload, ChimeError> {
    // 9.x payloads dropped ruleName and introduced a top-level alerts array.
    if !payload.contains("ruleName") && payload.contains("alerts") {
        return format_9x(payload, headers);
    }

    let mut text = String::new();
    {
        let view = payload.view();
        if let Some(title) = view.str_opt("title")? {
            text.push_str("#### ");
            text.push_str(title);
            text.push('\n');
        }
        if let Some(message) = view.str_opt("message")? {
            text.push_str(message);
            text.push_str("\n\n");
        }
        if let Some(matches) = view.array_opt("evalMatches")? {
            for (idx, entry) in matches.iter().enumerate() {
                let eval = entry.as_object().ok_or_else(|| {
                    ChimeError::field_type(format!("evalMatches[{idx}]"), "an object")
                })?;
                let metric = eval
                    .get("metric")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ChimeError::missing(format!("evalMatches[{idx}].metric")))?;
                let value = eval
                    .get("value")
                    .ok_or_else(|| ChimeError::missing(format!("evalMatches[{idx}].value")))?;
                text.push_str("* ");
                text.push_str(metric);
                text.push_str(": ");
                text.push_str(&display_scalar(value));
                text.push('\n');
            }
        }
    }
    payload.set_body(text);
    Ok(payload)
}

/// Format a Grafana 9.x+ notification.
///
/// The 9.x `message` packs one alert per line; newlines are doubled so
/// the rendering target keeps them as paragraph breaks.
pub fn format_9x(mut payload: Payload, _headers: &Headers) -> Result<Payload, ChimeError> {
    let mut text = String::new();
    {
        let view = payload.view();
        if let Some(title) = view.str_opt("title")? {
            text.push_str("#### ");
            text.push_str(title);
            text.push('\n');
        }
        if let Some(message) = view.str_opt("message")? {
            text.push_str(&message.replace('\n', "\n\n"));
            text.push_str("\n\n");
        }
    }
    payload.set_body(text);
    Ok(payload)
}

/// Render a JSON scalar the way it reads in an alert line: strings
/// unquoted, numbers and booleans as written.
fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
