//! format-check — run a webhook formatter against a captured payload.
//!
//! Reads a payload JSON file (or stdin), applies the formatter for the
//! given source kind, and prints the resulting body, a suppression
//! notice, or the formatting error. Useful for checking what a captured
//! webhook would look like in the room before wiring up a route.

use std::io::Read;

use anyhow::{bail, Context};
use clap::Parser;

use chime_format::{registry, Headers, Payload};

/// Run a webhook formatter against a captured payload.
#[derive(Parser, Debug)]
#[command(name = "format-check", version, about)]
struct Cli {
    /// Source kind to format as (see --list).
    #[arg(long, env = "CHIME_SOURCE", default_value = "grafana")]
    source: String,

    /// Request header as NAME=VALUE; repeatable.
    #[arg(long = "header", value_name = "NAME=VALUE")]
    headers: Vec<String>,

    /// Print the whole augmented payload as JSON instead of just the body.
    #[arg(long)]
    json: bool,

    /// List registered source kinds and exit.
    #[arg(long)]
    list: bool,

    /// Payload JSON file, or `-` for stdin.
    #[arg(default_value = "-")]
    payload: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.list {
        for kind in registry::SOURCE_KINDS {
            println!("{kind}");
        }
        return Ok(());
    }

    let raw = if cli.payload == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&cli.payload)
            .with_context(|| format!("failed to read payload file '{}'", cli.payload))?
    };

    let value: serde_json::Value =
        serde_json::from_str(&raw).context("payload is not valid JSON")?;
    let payload = Payload::from_value(value)?;

    let mut headers = Headers::new();
    for header in &cli.headers {
        let Some((name, header_value)) = header.split_once('=') else {
            bail!("malformed --header '{header}', expected NAME=VALUE");
        };
        headers.insert(name.trim(), header_value.to_string());
    }

    let formatter = registry::select(&cli.source)?;
    let result = formatter(payload, &headers)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result.into_value())?);
        return Ok(());
    }

    match result.body() {
        Some(body) => println!("{body}"),
        None => eprintln!("(suppressed: formatter produced no body)"),
    }

    Ok(())
}
