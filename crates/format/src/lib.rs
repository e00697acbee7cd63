//! Webhook-to-chat message formatters.
//!
//! This crate provides:
//! - Per-source formatters turning webhook payloads into markdown bodies
//!   (Grafana legacy/9.x, GitHub, GitLab variants, release notifier)
//! - A registry mapping source-kind identifiers to formatter functions
//!
//! Every formatter is a pure function over `(Payload, &Headers)`; the
//! HTTP ingestion and Matrix delivery layers live elsewhere. A formatter
//! either augments the payload with a `body` (plus `digest`/`key` where
//! the source defines them), returns it untouched to suppress delivery,
//! or fails with a [`ChimeError`] when the payload breaks its schema.

pub mod github;
pub mod gitlab;
pub mod grafana;
pub mod grn;
pub mod registry;

pub use chime_core::{ChimeError, Headers, Payload};
pub use registry::{select, FormatterFn};
