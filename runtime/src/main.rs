// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use websift_runtime::cli;
use websift_runtime::cli::scrape_cmd::ScrapeArgs;
use websift_runtime::cli::search_cmd::Refinement;
use websift_runtime::config::ConfigOverrides;
use websift_runtime::extraction::{DEFAULT_SELECTOR, DEFAULT_TIMEOUT_MS};

#[derive(Parser)]
#[command(
    name = "websift",
    about = "Websift: web extraction and search-driven scraping",
    version,
    after_help = "Run 'websift <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Interface to bind (env: WEBSIFT_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (env: WEBSIFT_PORT or PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Directory served for non-API paths (env: WEBSIFT_STATIC_DIR)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Extract elements from a single page
    Scrape {
        /// Page to scrape
        url: String,
        /// CSS selector for the elements to extract
        #[arg(long, short, default_value = DEFAULT_SELECTOR)]
        selector: String,
        /// Render the page in Chromium before extracting
        #[arg(long)]
        javascript: bool,
        /// Selector to wait for after the page loads (with --javascript)
        #[arg(long)]
        wait_for: Option<String>,
        /// Fetch/navigation timeout in milliseconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
        timeout: u64,
        /// Extra request header as NAME:VALUE. Can be repeated.
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
    },
    /// Search the web
    Search {
        /// Search terms
        query: String,
        /// Maximum number of results
        #[arg(long, short = 'n', default_value = "5")]
        max_results: usize,
        /// Only results from this site
        #[arg(long, conflicts_with_all = ["filetype", "date_range"])]
        site: Option<String>,
        /// Only results of this file type (e.g. pdf)
        #[arg(long, conflicts_with = "date_range")]
        filetype: Option<String>,
        /// Free-form date range appended to the query
        #[arg(long)]
        date_range: Option<String>,
        /// Drop malformed URLs and social media hosts
        #[arg(long)]
        validate: bool,
    },
    /// Search the web, then scrape every result
    SearchScrape {
        /// Search terms
        query: String,
        /// Maximum number of results
        #[arg(long, short = 'n', default_value = "5")]
        max_results: usize,
        /// CSS selector for the elements to extract
        #[arg(long, short, default_value = DEFAULT_SELECTOR)]
        selector: String,
        /// Render each result in Chromium
        #[arg(long)]
        javascript: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("WEBSIFT_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("WEBSIFT_QUIET", "1");
    }

    if !matches!(cli.command, Commands::Completions { .. }) {
        cli::init_tracing(cli.verbose, cli.log_json);
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            cli::serve::run(ConfigOverrides {
                host,
                port,
                static_dir,
            })
            .await
        }
        Commands::Scrape {
            url,
            selector,
            javascript,
            wait_for,
            timeout,
            headers,
        } => {
            cli::scrape_cmd::run(ScrapeArgs {
                url,
                selector,
                javascript,
                wait_for,
                timeout_ms: timeout,
                headers,
            })
            .await
        }
        Commands::Search {
            query,
            max_results,
            site,
            filetype,
            date_range,
            validate,
        } => {
            let refinement = match (site, filetype, date_range) {
                (Some(site), _, _) => Refinement::Site(site),
                (None, Some(ft), _) => Refinement::FileType(ft),
                (None, None, Some(range)) => Refinement::DateRange(range),
                (None, None, None) => Refinement::None,
            };
            cli::search_cmd::run_search(&query, max_results, refinement, validate).await
        }
        Commands::SearchScrape {
            query,
            max_results,
            selector,
            javascript,
        } => cli::search_cmd::run_search_scrape(&query, max_results, &selector, javascript).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "websift", &mut std::io::stdout());
            Ok(())
        }
    }
}
