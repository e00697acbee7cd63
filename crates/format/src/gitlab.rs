//! GitLab webhook formatters.
//!
//! Three shapes arrive from GitLab installs in the wild: the native
//! webhook payload, and payloads pre-rendered for Google Chat or
//! Microsoft Teams integrations. The latter two are rewrites: the
//! message text already exists and only its markup convention changes.

use std::sync::OnceLock;

use chime_core::{ChimeError, Headers, Payload};
use regex::Regex;
use serde_json::Value;

/// Format a native GitLab webhook notification.
///
/// If the request carried an `X-Gitlab-Token` header, its value is
/// surfaced verbatim as `key` for the routing layer; it is not verified
/// here.
pub fn format_webhook(mut payload: Payload, headers: &Headers) -> Result<Payload, ChimeError> {
    let body = {
        let view = payload.view();
        let event_name = view.str_req("event_name")?;
        let user_name = view.str_req("user_name")?;
        let project = view.object_req("project")?;
        let clauses = [
            format!("New {event_name} event"),
            format!(
                "on [{}]({})",
                project.str_req("name")?,
                project.str_req("web_url")?
            ),
            format!("by {user_name}."),
        ];
        clauses.join(" ")
    };
    payload.set_body(body);

    if let Some(token) = headers.get("X-Gitlab-Token") {
        payload.insert("key", Value::String(token.to_string()));
    }
    Ok(payload)
}

/// Rewrite a Google-Chat-preformatted body: every `<url|label>` becomes
/// a markdown link `[label](url)`. Idempotent — rewritten text contains
/// no remaining `<...|...>` pattern.
pub fn format_gchat(mut payload: Payload, _headers: &Headers) -> Result<Payload, ChimeError> {
    let body = gchat_link()
        .replace_all(payload.view().str_req("body")?, "[${2}](${1})")
        .into_owned();
    payload.set_body(body);
    Ok(payload)
}

fn gchat_link() -> &'static Regex {
    static GCHAT_LINK: OnceLock<Regex> = OnceLock::new();
    GCHAT_LINK.get_or_init(|| Regex::new(r"<(.*?)\|(.*?)>").expect("valid pattern"))
}

/// Flatten a Teams-preformatted `sections` payload into one body.
///
/// Sections with a `text` key become bulleted paragraphs; sections with
/// the activity-card triple become a single `title subtitle → text`
/// line. Sections matching neither shape are skipped. Outputs keep
/// their original order, joined with Teams' line-break separator.
pub fn format_teams(mut payload: Payload, _headers: &Headers) -> Result<Payload, ChimeError> {
    let body = {
        let view = payload.view();
        let sections = view.array_req("sections")?;
        let mut parts: Vec<String> = Vec::with_capacity(sections.len());

        for (idx, section) in sections.iter().enumerate() {
            let section = section
                .as_object()
                .ok_or_else(|| ChimeError::field_type(format!("sections[{idx}]"), "an object"))?;

            if section.contains_key("text") {
                let text = section
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ChimeError::field_type(format!("sections[{idx}].text"), "a string")
                    })?;
                let bullets: Vec<String> = text
                    .split("\n\n")
                    .map(|paragraph| format!("* {paragraph}"))
                    .collect();
                parts.push(format!("\n{}", bullets.join("  \n")));
            } else if ["activityTitle", "activitySubtitle", "activityText"]
                .iter()
                .all(|k| section.contains_key(*k))
            {
                let field = |key: &str| {
                    section.get(key).and_then(Value::as_str).ok_or_else(|| {
                        ChimeError::field_type(format!("sections[{idx}].{key}"), "a string")
                    })
                };
                parts.push(format!(
                    "{} {} → {}",
                    field("activityTitle")?,
                    field("activitySubtitle")?,
                    field("activityText")?
                ));
            }
            // Other section shapes carry nothing renderable.
        }

        parts.join("  \n")
    };
    payload.set_body(body);
    Ok(payload)
}
