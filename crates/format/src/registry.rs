//! Maps source-kind identifiers to formatter functions.
//!
//! The ingestion layer configures a source kind per route and calls
//! [`select`] once per request. Unknown identifiers are a routing error,
//! not a formatting one.

use chime_core::{ChimeError, Headers, Payload};

use crate::{github, gitlab, grafana, grn};

/// A pure formatting function: consume the payload, return it augmented
/// (or untouched, to suppress delivery).
pub type FormatterFn = fn(Payload, &Headers) -> Result<Payload, ChimeError>;

/// Look up the formatter registered for a source kind.
///
/// # Errors
///
/// Returns [`ChimeError::UnknownSourceKind`] when no formatter is
/// registered under `kind`.
pub fn select(kind: &str) -> Result<FormatterFn, ChimeError> {
    let formatter: FormatterFn = match kind {
        "grafana" => grafana::format,
        "grafana_9x" => grafana::format_9x,
        "github" => github::format,
        "gitlab_webhook" => gitlab::format_webhook,
        "gitlab_gchat" => gitlab::format_gchat,
        "gitlab_teams" => gitlab::format_teams,
        "grn" => grn::format,
        other => {
            tracing::debug!(kind = other, "no formatter registered");
            return Err(ChimeError::UnknownSourceKind(other.to_string()));
        }
    };
    Ok(formatter)
}

/// All registered source-kind identifiers, for CLI help and diagnostics.
pub const SOURCE_KINDS: &[&str] = &[
    "grafana",
    "grafana_9x",
    "github",
    "gitlab_webhook",
    "gitlab_gchat",
    "gitlab_teams",
    "grn",
];
