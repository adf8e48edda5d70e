//! CLI entry point for the signposting tool.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use signposting::{DiscoveryError, SignpostingClient, SignpostingSet};
use tracing::{debug, error, info};

mod app_config;
mod cli;
mod output;

use app_config::{Settings, load_default_file_config};
use cli::{Args, Mode};

/// Process exit outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ProcessExit {
    Success = 0,
    UrlError = 1,
    HttpError = 2,
    LinkSyntax = 3,
    Internal = 4,
}

impl ProcessExit {
    fn for_error(error: &DiscoveryError) -> Self {
        match error {
            DiscoveryError::InvalidUrl { .. }
            | DiscoveryError::Network { .. }
            | DiscoveryError::Timeout { .. } => Self::UrlError,
            DiscoveryError::HttpStatus { .. } => Self::HttpError,
            DiscoveryError::UnrecognizedContentType { .. } | DiscoveryError::Linkset { .. } => {
                Self::LinkSyntax
            }
            DiscoveryError::ClientBuild { .. } => Self::Internal,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit as u8)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    match run(args).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ProcessExit::Internal.into()
        }
    }
}

async fn run(args: Args) -> Result<ProcessExit> {
    let loaded = load_default_file_config()?;
    let settings = Settings::resolve(&args, loaded.config.as_ref());

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config file > info
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings.log_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    debug!(?args, "CLI arguments parsed");
    if loaded.loaded_from_file {
        debug!(path = ?loaded.path, "Loaded config file");
    }
    info!(mode = settings.mode.as_str(), urls = args.urls.len(), "Signposting discovery starting");

    let client = SignpostingClient::new(settings.discovery.clone())?;

    let mut outcome = ProcessExit::Success;
    for (index, url) in args.urls.iter().enumerate() {
        if index > 0 && !args.json {
            println!();
        }
        match discover(&client, settings.mode, url).await {
            Ok(set) => {
                if args.json {
                    println!("{}", output::format_json(&set)?);
                } else {
                    println!("{}", output::format_text(&set));
                }
                for line in output::warning_lines(&set) {
                    eprintln!("{line}");
                }
            }
            Err(e) => {
                error!(%url, error = %e, "Discovery failed");
                eprintln!("{url}: {e}");
                if outcome == ProcessExit::Success {
                    outcome = ProcessExit::for_error(&e);
                }
            }
        }
    }

    Ok(outcome)
}

async fn discover(
    client: &SignpostingClient,
    mode: Mode,
    url: &str,
) -> Result<SignpostingSet, DiscoveryError> {
    match mode {
        Mode::Head => client.find_signposting_http(url).await,
        Mode::Html => client.find_signposting_html(url).await,
        Mode::Linkset => client.find_signposting_linkset(url, None).await,
        Mode::All => client.find_signposting(url).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ProcessExit::Success as u8, 0);
        assert_eq!(
            ProcessExit::for_error(&DiscoveryError::invalid_url("x")),
            ProcessExit::UrlError
        );
        assert_eq!(
            ProcessExit::for_error(&DiscoveryError::http_status("https://example.org/", 404)),
            ProcessExit::HttpError
        );
        assert_eq!(
            ProcessExit::for_error(&DiscoveryError::unrecognized_content_type(
                "https://example.org/",
                None,
                "text/html"
            )),
            ProcessExit::LinkSyntax
        );
        assert_eq!(
            ProcessExit::for_error(&DiscoveryError::client_build("boom")),
            ProcessExit::Internal
        );
    }
}
