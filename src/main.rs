//! crawl4xx main entry point
//!
//! This is the command-line interface for the broken link crawler.

use anyhow::Context;
use clap::Parser;
use crawl4xx::config::{load_config, validate, validate_base_url, CrawlConfig, RendererKind};
use crawl4xx::crawler::{Crawler, PageRenderer, ReqwestTransport, StaticRenderer};
use crawl4xx::output::{print_summary, CrawlSummary};
use crawl4xx::state::{listen_for_ctrl_c, InterruptFlag};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// crawl: find links that answer with 4xx errors on one domain
///
/// Crawls every same-domain page and asset reachable from BASE_URL, checks
/// each one's HTTP status, and writes the 4xx responses with the page that
/// linked to them to a CSV report.
#[derive(Parser, Debug)]
#[command(name = "crawl")]
#[command(version)]
#[command(about = "Find links that answer with 4xx errors on one domain", long_about = None)]
struct Cli {
    /// Base URL to start crawling from (http or https)
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// CSV report path [default: errors_4xx.csv]
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Maximum crawl depth (accepted but not enforced)
    #[arg(short, long, value_name = "N")]
    depth: Option<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Page rendering backend
    #[arg(long, value_enum)]
    renderer: Option<RendererKind>,

    /// Delay between requests in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    validate_base_url(&cli.base_url)?;

    println!("Starting crawl of {}", cli.base_url);

    let interrupt = InterruptFlag::new();
    listen_for_ctrl_c(interrupt.clone());

    let transport =
        ReqwestTransport::from_config(&config).context("Failed to build HTTP client")?;

    let summary = match config.renderer {
        RendererKind::Static => {
            let renderer = StaticRenderer::new(transport.client().clone());
            run_crawl(&cli.base_url, config, transport, renderer, interrupt).await?
        }
        #[cfg(feature = "chrome")]
        RendererKind::Chrome => {
            let renderer = crawl4xx::crawler::ChromeRenderer::launch()
                .await
                .map_err(crawl4xx::CrawlError::from)?;
            run_crawl(&cli.base_url, config, transport, renderer, interrupt).await?
        }
        #[cfg(not(feature = "chrome"))]
        RendererKind::Chrome => {
            anyhow::bail!("the chrome renderer requires building with the `chrome` feature")
        }
    };

    print_summary(&summary);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl4xx=info,warn"),
            1 => EnvFilter::new("crawl4xx=debug,info"),
            2 => EnvFilter::new("crawl4xx=trace,debug"),
            _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => CrawlConfig::default(),
    };

    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    if cli.depth.is_some() {
        config.depth = cli.depth;
    }
    if let Some(renderer) = cli.renderer {
        config.renderer = renderer;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.politeness_delay_ms = delay_ms;
    }

    validate(&config)?;
    Ok(config)
}

/// Runs the crawl with the chosen renderer
async fn run_crawl<R: PageRenderer>(
    base_url: &str,
    config: CrawlConfig,
    transport: ReqwestTransport,
    renderer: R,
    interrupt: InterruptFlag,
) -> anyhow::Result<CrawlSummary> {
    let crawler = Crawler::new(base_url, config, transport, renderer)?.with_interrupt(interrupt);
    let summary = crawler.run().await?;
    Ok(summary)
}
