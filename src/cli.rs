//! CLI argument definitions using clap derive macros.

use clap::{Parser, ValueEnum};

/// Which sources to consult for each URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// `HEAD` request, `Link` headers only
    Head,
    /// `GET` an HTML page, `<link>` elements only
    Html,
    /// The URL is a linkset document
    Linkset,
    /// Headers and HTML of a `GET`, then linked linksets
    All,
}

impl Mode {
    /// Stable label, as accepted on the command line and in the config file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Html => "html",
            Self::Linkset => "linkset",
            Self::All => "all",
        }
    }
}

/// Discover FAIR Signposting links for web resources.
///
/// Prints the persistent identifier, metadata, items, license, authors and
/// other typed links each URL declares through HTTP Link headers, HTML
/// <link> elements or linksets.
#[derive(Parser, Debug)]
#[command(name = "signposting")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print results as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Where to look for signposting [default: all]
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// TCP connect timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// Whole-request timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    /// Maximum linksets followed per URL in `all` mode (0-50)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=50))]
    pub max_linksets: Option<u64>,

    /// URL(s) to discover signposting for
    #[arg(required = true, num_args = 1..)]
    pub urls: Vec<String>,
}
