use anyhow::{anyhow, Context};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod config;
mod error;
mod handlers;
mod keywords;
mod render;
mod state;
mod utils;

use config::CONFIG;
use keywords::classify;
use state::AppState;
use utils::logging::init_logging;

fn classify_usage() -> &'static str {
    "Usage: cargo run -- classify <description...>"
}

/// Returns the description passed to the `classify` subcommand, if that is
/// what was requested.
fn parse_classify_args(args: &[String]) -> anyhow::Result<Option<String>> {
    if args.get(1).map(|value| value.as_str()) != Some("classify") {
        return Ok(None);
    }

    let words = &args[2..];
    if words
        .iter()
        .any(|value| value == "--help" || value == "-h")
    {
        return Err(anyhow!(classify_usage()));
    }

    Ok(Some(words.join(" ")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if let Some(description) = parse_classify_args(&args)? {
        let result = classify(&description);
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let _guards = init_logging();

    let state = AppState::from_config(&CONFIG);
    if state.dev_mode {
        info!("Development mode enabled: permissive CORS, default log level debug");
    }
    if state.typeface.is_builtin() {
        info!("Overlay text uses the built-in bitmap font");
    }
    if !state.static_dir.join("index.html").exists() {
        warn!(
            "No index.html in {}; the start page will return 404",
            state.static_dir.display()
        );
    }

    let addr = CONFIG.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Starting mockup studio on http://{addr}");

    axum::serve(listener, handlers::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn server_mode_without_subcommand() {
        assert_eq!(parse_classify_args(&args(&["mockup_studio"])).unwrap(), None);
    }

    #[test]
    fn classify_joins_remaining_words() {
        let parsed = parse_classify_args(&args(&["mockup_studio", "classify", "happy", "woman"]));
        assert_eq!(parsed.unwrap().as_deref(), Some("happy woman"));
    }

    #[test]
    fn classify_without_words_is_empty_description() {
        let parsed = parse_classify_args(&args(&["mockup_studio", "classify"]));
        assert_eq!(parsed.unwrap().as_deref(), Some(""));
    }

    #[test]
    fn classify_help_returns_usage() {
        let err = parse_classify_args(&args(&["mockup_studio", "classify", "--help"])).unwrap_err();
        assert!(err.to_string().starts_with("Usage:"));
    }
}
