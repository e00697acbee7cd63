//! GitHub webhook formatter.
//!
//! Dispatches on the `X-GitHub-Event` header: pushes and pull requests
//! get real formatting, every other event type gets an explanatory
//! fallback body so the delivery layer always has something to send.
//! Events from private repositories are suppressed outright.
//!
//! The `X-Hub-Signature-256` digest is copied into the payload for a
//! downstream verifier; it is not checked here.

use chime_core::payload::ObjectView;
use chime_core::{ChimeError, Headers, Payload};
use serde_json::Value;

/// How many commits of a push are listed before the rest is elided.
/// Keeps chat messages readable no matter how large the push was.
const COMMIT_DISPLAY_LIMIT: usize = 4;

/// Pull-request actions worth relaying. Everything else (synchronize,
/// labeled, ...) is suppressed to avoid notification spam.
const RELAYED_PR_ACTIONS: &[&str] = &[
    "opened",
    "closed",
    "reopened",
    "ready for review",
    "review requested",
];

/// Known GitHub event types, with a fallback arm for whatever GitHub
/// ships next.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GithubEvent {
    Push,
    PullRequest,
    Other(String),
}

impl GithubEvent {
    fn parse(raw: &str) -> Self {
        match raw {
            "push" => Self::Push,
            "pull_request" => Self::PullRequest,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Format a GitHub notification.
///
/// Returns the payload without a `body` (suppressed delivery) for
/// private-repository events, filtered pull-request actions, and
/// zero-commit pushes that match no recognized shape. The signature
/// digest is recorded in all cases, including suppression.
pub fn format(mut payload: Payload, headers: &Headers) -> Result<Payload, ChimeError> {
    let event = headers
        .get("X-GitHub-Event")
        .map(GithubEvent::parse)
        .ok_or_else(|| ChimeError::missing("header X-GitHub-Event"))?;

    let body = {
        let view = payload.view();
        let repository = view.object_req("repository")?;

        // Private commits have no business in a public room.
        if repository.flag("private") && repository.str_opt("visibility")? == Some("private") {
            tracing::debug!(event = ?event, "suppressing event from private repository");
            None
        } else {
            match event {
                GithubEvent::Push => push_body(&view, &repository)?,
                GithubEvent::PullRequest => pull_request_body(&view, &repository)?,
                GithubEvent::Other(name) => {
                    tracing::debug!(event = %name, "falling back to unsupported-event body");
                    Some(format!("unsupported github event: '{name}'"))
                }
            }
        }
    };

    if let Some(body) = body {
        payload.set_body(body);
    }

    // Informational metadata for a downstream verifier; an absent
    // header yields an empty digest rather than an error.
    let digest = headers
        .get("X-Hub-Signature-256")
        .map(|sig| sig.strip_prefix("sha256=").unwrap_or(sig))
        .unwrap_or_default();
    payload.insert("digest", Value::String(digest.to_string()));

    Ok(payload)
}

/// Build the body for a push event, `None` when the push should not be
/// relayed.
fn push_body(
    view: &ObjectView<'_>,
    repository: &ObjectView<'_>,
) -> Result<Option<String>, ChimeError> {
    let pusher_name = view.object_req("pusher")?.str_req("name")?;
    let git_ref = view.str_req("ref")?;
    let repo_html_url = repository.str_req("html_url")?;
    let repo_link = format!("[{}]({repo_html_url})", repository.str_req("full_name")?);
    let pusher_link = format!("[@{pusher_name}](https://github.com/{pusher_name})");
    let commits = view.array_req("commits")?;

    if commits.is_empty() {
        // `git push --tags` sends no commits but names refs/tags/<tag>.
        let body = if git_ref.contains("refs/tags/") {
            let tag = last_ref_segment(git_ref);
            Some(format!(
                "{repo_link}: {pusher_link} pushed tag [{tag}]({repo_html_url}/releases/tag/{tag})\n"
            ))
        } else if view.flag("created") {
            Some(format!(
                "{repo_link}: {pusher_link} created empty branch _{git_ref}_\n"
            ))
        } else if view.flag("deleted") {
            Some(format!(
                "{repo_link}: {pusher_link} deleted branch <del>{git_ref}</del>\n"
            ))
        } else if view.flag("forced") {
            let branch = last_ref_segment(git_ref);
            Some(format!(
                "{repo_link}: {pusher_link} force pushed on [{git_ref}]({repo_html_url}/commits/{branch})\n"
            ))
        } else {
            tracing::debug!(git_ref, "unrecognized zero-commit push, suppressing");
            None
        };
        return Ok(body);
    }

    // Commit hashes are noisy; the ref links to the full compare instead.
    let compare = view.str_req("compare")?;
    let mut body = format!("{repo_link}: {pusher_link} ");
    if view.flag("forced") {
        body.push_str("force ");
    }
    body.push_str(&format!("pushed on [{git_ref}]({compare}):\n\n"));

    for (idx, commit) in commits.iter().enumerate() {
        if idx >= COMMIT_DISPLAY_LIMIT {
            body.push_str(&format!(
                "- (... {} more commits ...)",
                commits.len() - COMMIT_DISPLAY_LIMIT
            ));
            break;
        }
        let commit = commit
            .as_object()
            .ok_or_else(|| ChimeError::field_type(format!("commits[{idx}]"), "an object"))?;
        let message = commit
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| ChimeError::missing(format!("commits[{idx}].message")))?;
        let url = commit
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| ChimeError::missing(format!("commits[{idx}].url")))?;
        // Only the shortlog of each commit is worth showing.
        let shortlog = message.trim().lines().next().unwrap_or_default();
        body.push_str(&format!("- [{shortlog}]({url})\n"));
    }

    Ok(Some(body))
}

/// Build the body for a pull_request event, `None` for actions outside
/// the relay allow-list.
fn pull_request_body(
    view: &ObjectView<'_>,
    repository: &ObjectView<'_>,
) -> Result<Option<String>, ChimeError> {
    let action = view.str_req("action")?;
    if !RELAYED_PR_ACTIONS.contains(&action) {
        tracing::debug!(action, "pull_request action not relayed, suppressing");
        return Ok(None);
    }

    let number = view.u64_req("number")?;
    let pr = view.object_req("pull_request")?;
    let title = pr.str_req("title")?;
    let pr_url = pr.str_req("html_url")?;
    // The user behind the action itself, not the PR author.
    let sender = view.object_req("sender")?.str_req("login")?;
    let repo_name = repository.str_req("full_name")?;
    let repo_url = repository.str_req("html_url")?;

    // Closed PRs vanish from the default open-PR listing, so link the
    // closed-filter view instead.
    let url_query = if action == "closed" {
        "pulls/?q=is%3Apr+is%3Aclosed"
    } else {
        "pulls/"
    };

    let mut body = format!("PR#{number} [{title}]({pr_url})\n\n");
    body.push_str(&format!(
        "{action} by [@{sender}](https://github.com/{sender}) in [{repo_name}]({repo_url}/{url_query})"
    ));
    Ok(Some(body))
}

/// Last segment of a ref path, e.g. `refs/tags/v1.2` → `v1.2`.
fn last_ref_segment(git_ref: &str) -> &str {
    git_ref.rsplit('/').next().unwrap_or(git_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(event: &str) -> Headers {
        [
            ("X-GitHub-Event", event),
            ("X-Hub-Signature-256", "sha256=deadbeef"),
        ]
        .into_iter()
        .collect()
    }

    fn repo() -> serde_json::Value {
        json!({
            "full_name": "acme/widgets",
            "html_url": "https://github.com/acme/widgets",
            "private": false,
            "visibility": "public"
        })
    }

    fn run(value: serde_json::Value, headers: &Headers) -> Payload {
        format(Payload::from_value(value).unwrap(), headers).unwrap()
    }

    #[test]
    fn private_repository_is_suppressed() {
        let out = run(
            json!({
                "repository": {
                    "full_name": "acme/secret",
                    "html_url": "https://github.com/acme/secret",
                    "private": true,
                    "visibility": "private"
                }
            }),
            &headers("push"),
        );
        assert_eq!(out.body(), None);
        // Digest is still recorded for the verifier.
        assert_eq!(out.into_value()["digest"], json!("deadbeef"));
    }

    #[test]
    fn internal_visibility_is_not_suppressed() {
        // private=true but visibility="internal" (GHE) still relays.
        let out = run(
            json!({
                "repository": {
                    "full_name": "acme/widgets",
                    "html_url": "https://github.com/acme/widgets",
                    "private": true,
                    "visibility": "internal"
                },
                "pusher": { "name": "alice" },
                "ref": "refs/heads/main",
                "compare": "https://github.com/acme/widgets/compare/a...b",
                "commits": [
                    { "message": "fix", "url": "https://github.com/acme/widgets/commit/1" }
                ]
            }),
            &headers("push"),
        );
        assert!(out.body().is_some());
    }

    #[test]
    fn push_with_commits_links_ref_to_compare() {
        let out = run(
            json!({
                "repository": repo(),
                "pusher": { "name": "alice" },
                "ref": "refs/heads/main",
                "compare": "https://github.com/acme/widgets/compare/a...b",
                "forced": false,
                "commits": [
                    { "message": "Add thing\n\nLong description", "url": "https://github.com/acme/widgets/commit/1" },
                    { "message": "Fix thing", "url": "https://github.com/acme/widgets/commit/2" }
                ]
            }),
            &headers("push"),
        );
        assert_eq!(
            out.body().unwrap(),
            "[acme/widgets](https://github.com/acme/widgets): \
             [@alice](https://github.com/alice) \
             pushed on [refs/heads/main](https://github.com/acme/widgets/compare/a...b):\n\n\
             - [Add thing](https://github.com/acme/widgets/commit/1)\n\
             - [Fix thing](https://github.com/acme/widgets/commit/2)\n"
        );
    }

    #[test]
    fn push_with_six_commits_elides_two() {
        let commits: Vec<_> = (1..=6)
            .map(|i| {
                json!({
                    "message": format!("commit {i}"),
                    "url": format!("https://github.com/acme/widgets/commit/{i}")
                })
            })
            .collect();
        let out = run(
            json!({
                "repository": repo(),
                "pusher": { "name": "alice" },
                "ref": "refs/heads/main",
                "compare": "https://github.com/acme/widgets/compare/a...b",
                "commits": commits
            }),
            &headers("push"),
        );
        let body = out.body().unwrap();
        assert_eq!(body.matches("- [commit").count(), 4);
        assert!(body.ends_with("- (... 2 more commits ...)"));
    }

    #[test]
    fn force_push_with_commits_gets_force_qualifier() {
        let out = run(
            json!({
                "repository": repo(),
                "pusher": { "name": "alice" },
                "ref": "refs/heads/main",
                "compare": "https://github.com/acme/widgets/compare/a...b",
                "forced": true,
                "commits": [
                    { "message": "rewrite", "url": "https://github.com/acme/widgets/commit/1" }
                ]
            }),
            &headers("push"),
        );
        assert!(out.body().unwrap().contains("force pushed on"));
    }

    #[test]
    fn tag_push_names_the_tag() {
        let out = run(
            json!({
                "repository": repo(),
                "pusher": { "name": "alice" },
                "ref": "refs/tags/v1.2.0",
                "commits": []
            }),
            &headers("push"),
        );
        assert_eq!(
            out.body().unwrap(),
            "[acme/widgets](https://github.com/acme/widgets): \
             [@alice](https://github.com/alice) pushed tag \
             [v1.2.0](https://github.com/acme/widgets/releases/tag/v1.2.0)\n"
        );
    }

    #[test]
    fn deleted_branch_push() {
        let out = run(
            json!({
                "repository": repo(),
                "pusher": { "name": "alice" },
                "ref": "refs/heads/old",
                "deleted": true,
                "commits": []
            }),
            &headers("push"),
        );
        assert!(out.body().unwrap().contains("deleted branch <del>refs/heads/old</del>"));
    }

    #[test]
    fn unrecognized_zero_commit_push_is_suppressed() {
        let out = run(
            json!({
                "repository": repo(),
                "pusher": { "name": "alice" },
                "ref": "refs/heads/main",
                "commits": []
            }),
            &headers("push"),
        );
        assert_eq!(out.body(), None);
    }

    #[test]
    fn synchronize_action_is_suppressed() {
        let out = run(
            json!({
                "repository": repo(),
                "action": "synchronize",
                "number": 7,
                "pull_request": { "title": "t", "html_url": "u" },
                "sender": { "login": "bob" }
            }),
            &headers("pull_request"),
        );
        assert_eq!(out.body(), None);
    }

    #[test]
    fn closed_pr_links_closed_filter_view() {
        let out = run(
            json!({
                "repository": repo(),
                "action": "closed",
                "number": 7,
                "pull_request": {
                    "title": "Add widgets",
                    "html_url": "https://github.com/acme/widgets/pull/7"
                },
                "sender": { "login": "bob" }
            }),
            &headers("pull_request"),
        );
        assert_eq!(
            out.body().unwrap(),
            "PR#7 [Add widgets](https://github.com/acme/widgets/pull/7)\n\n\
             closed by [@bob](https://github.com/bob) in \
             [acme/widgets](https://github.com/acme/widgets/pulls/?q=is%3Apr+is%3Aclosed)"
        );
    }

    #[test]
    fn opened_pr_links_default_pull_listing() {
        let out = run(
            json!({
                "repository": repo(),
                "action": "opened",
                "number": 7,
                "pull_request": {
                    "title": "Add widgets",
                    "html_url": "https://github.com/acme/widgets/pull/7"
                },
                "sender": { "login": "bob" }
            }),
            &headers("pull_request"),
        );
        assert!(out.body().unwrap().ends_with("(https://github.com/acme/widgets/pulls/)"));
    }

    #[test]
    fn unsupported_event_gets_fallback_body() {
        let out = run(json!({ "repository": repo() }), &headers("workflow_run"));
        assert_eq!(
            out.body().unwrap(),
            "unsupported github event: 'workflow_run'"
        );
    }

    #[test]
    fn missing_event_header_is_an_error() {
        let payload = Payload::from_value(json!({ "repository": repo() })).unwrap();
        let err = format(payload, &Headers::new()).unwrap_err();
        assert!(matches!(err, ChimeError::MissingField(_)));
    }

    #[test]
    fn missing_signature_yields_empty_digest() {
        let headers: Headers = [("X-GitHub-Event", "workflow_run")].into_iter().collect();
        let out = run(json!({ "repository": repo() }), &headers);
        assert_eq!(out.into_value()["digest"], json!(""));
    }
}
