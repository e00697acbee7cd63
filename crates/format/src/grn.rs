//! github-release-notifier formatter.
//!
//! Pure template fill, no branching: all four fields are required and
//! a missing one is a client-payload error.

use chime_core::{ChimeError, Headers, Payload};

/// Format a github-release-notifier (grn) notification.
pub fn format(mut payload: Payload, _headers: &Headers) -> Result<Payload, ChimeError> {
    let body = {
        let view = payload.view();
        let version = view.str_req("version")?;
        let title = view.str_req("title")?;
        let author = view.str_req("author")?;
        let package = view.str_req("package_name")?;

        format!(
            "### {package} - {version}\n\n{title}\n\n\
             [{author} released new version **{version}** for **{package}**]\
             (https://github.com/{package}/releases/tag/{version}).\n\n"
        )
    };
    payload.set_body(body);
    Ok(payload)
}
