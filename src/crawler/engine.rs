//! Crawl engine - main crawl loop
//!
//! This module drives one crawl run:
//! - Dequeuing URLs from the frontier in FIFO order
//! - Classifying each URL's HTTP status
//! - Recording 4xx responses with their referrer
//! - Rendering successful pages and enqueueing their same-domain links
//! - Checkpointing the error report and honoring interrupts
//!
//! Processing is strictly sequential: one URL is classified, rendered and
//! expanded at a time.

use crate::config::{validate, validate_base_url, CrawlConfig};
use crate::crawler::classifier::{is_client_error, is_expandable, StatusClassifier};
use crate::crawler::extractor::extract_links;
use crate::crawler::frontier::Frontier;
use crate::crawler::renderer::{NavigationOutcome, PageRenderer};
use crate::crawler::transport::Transport;
use crate::output::{CrawlSummary, CsvReportWriter, ErrorRecord, ReportWriter};
use crate::state::{InterruptFlag, RunState, TerminationReason};
use crate::url::{normalize_url, DomainFilter};
use chrono::Utc;

/// What happened to a single processed URL
#[derive(Debug)]
enum UrlOutcome {
    /// Rendered; `enqueued` of its `discovered` links were new
    Expanded { discovered: usize, enqueued: usize },

    /// Status below 400 but the page could not be rendered
    NotExpanded,

    /// 4xx recorded in the error list
    ClientError(u16),

    /// 5xx (or unclassifiable), visited but not reported
    ServerError(u16),
}

fn log_outcome(url: &str, outcome: &UrlOutcome) {
    match outcome {
        UrlOutcome::Expanded {
            discovered,
            enqueued,
        } => tracing::debug!("{}: {} links found, {} new", url, discovered, enqueued),
        UrlOutcome::NotExpanded => tracing::debug!("{}: not expanded", url),
        UrlOutcome::ClientError(status) => tracing::debug!("{}: recorded as {}", url, status),
        UrlOutcome::ServerError(status) => tracing::debug!("{}: skipped with {}", url, status),
    }
}

/// Main crawler structure
///
/// Owns all mutable crawl state. The frontier is only ever touched through
/// its own operations.
pub struct Crawler<T, R> {
    config: CrawlConfig,
    filter: DomainFilter,
    frontier: Frontier,
    classifier: StatusClassifier<T>,
    renderer: Option<R>,
    writer: Box<dyn ReportWriter>,
    interrupt: InterruptFlag,
    errors: Vec<ErrorRecord>,
    state: RunState,
    processed: u64,
}

impl<T, R> Crawler<T, R>
where
    T: Transport,
    R: PageRenderer,
{
    /// Creates a new crawler seeded with `base_url`
    ///
    /// The error report is written to `config.output` unless another writer
    /// is supplied with [`Crawler::with_writer`].
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CrawlError)` - Invalid seed URL or configuration
    pub fn new(
        base_url: &str,
        config: CrawlConfig,
        transport: T,
        renderer: R,
    ) -> crate::Result<Self> {
        validate(&config)?;
        validate_base_url(base_url)?;

        let seed = normalize_url(base_url);
        let filter = DomainFilter::from_base_url(&seed)?;

        let mut frontier = Frontier::new();
        frontier.seed(&seed);

        let classifier = StatusClassifier::new(transport, config.status_timeout());
        let writer = Box::new(CsvReportWriter::new(&config.output));

        Ok(Self {
            config,
            filter,
            frontier,
            classifier,
            renderer: Some(renderer),
            writer,
            interrupt: InterruptFlag::new(),
            errors: Vec::new(),
            state: RunState::Running,
            processed: 0,
        })
    }

    /// Replaces the report writer
    pub fn with_writer(mut self, writer: Box<dyn ReportWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Uses `interrupt` for cooperative cancellation
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Returns the target domain
    pub fn domain(&self) -> &str {
        self.filter.domain()
    }

    /// Returns the current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Returns the frontier
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Returns the errors recorded so far
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Runs the crawl to completion or interruption
    ///
    /// On every path to `Stopped` the error report is persisted and the page
    /// renderer is closed exactly once.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The run finished (completed or interrupted)
    /// * `Err(CrawlError)` - The final report could not be written
    pub async fn run(mut self) -> crate::Result<CrawlSummary> {
        let started_at = Utc::now();
        tracing::info!("Starting crawl of {}", self.filter.domain());
        if let Some(depth) = self.config.depth {
            tracing::warn!("Depth limit {} is accepted but not enforced", depth);
        }

        let termination = self.crawl_loop().await;
        self.shutdown(termination).await?;

        let summary = CrawlSummary {
            errors: self.errors,
            processed: self.processed,
            remaining: self.frontier.len(),
            termination,
            output_path: self.writer.location(),
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Crawl {}: {} URLs processed, {} errors found",
            termination,
            summary.processed,
            summary.error_count()
        );

        Ok(summary)
    }

    async fn crawl_loop(&mut self) -> TerminationReason {
        loop {
            if self.interrupt.is_raised() && self.state.accepts_work() {
                self.transition(RunState::Draining);
            }
            if !self.state.accepts_work() {
                return TerminationReason::Interrupted;
            }

            let Some(url) = self.frontier.take_next() else {
                tracing::info!("Frontier is empty, crawl complete");
                return TerminationReason::Completed;
            };

            self.processed += 1;
            tracing::info!("[{}] Exploring: {}", self.processed, url);

            let outcome = self.process_url(&url).await;
            log_outcome(&url, &outcome);

            if self.processed % self.config.checkpoint_interval == 0 {
                self.checkpoint();
            }

            if !self.interrupt.is_raised() && !self.config.politeness_delay().is_zero() {
                tokio::time::sleep(self.config.politeness_delay()).await;
            }
        }
    }

    /// Classifies one URL and either records it or expands it
    async fn process_url(&mut self, url: &str) -> UrlOutcome {
        let status = self.classifier.classify(url).await;

        if is_client_error(status) {
            let referrer = self.frontier.referrer_of(url).to_string();
            tracing::warn!("Error {} found: {} (linked from {})", status, url, referrer);
            self.errors.push(ErrorRecord::new(url, status, referrer));
            return UrlOutcome::ClientError(status);
        }

        if !is_expandable(status) {
            tracing::debug!("Status {} for {}, not reported", status, url);
            return UrlOutcome::ServerError(status);
        }

        self.expand(url).await
    }

    /// Renders `url` and offers its links to the frontier
    async fn expand(&mut self, url: &str) -> UrlOutcome {
        let Some(renderer) = self.renderer.as_mut() else {
            return UrlOutcome::NotExpanded;
        };

        match renderer.navigate(url, self.config.page_load_timeout()).await {
            NavigationOutcome::Loaded => {}
            NavigationOutcome::TimedOut => {
                tracing::warn!("Timed out loading {}", url);
                return UrlOutcome::NotExpanded;
            }
            NavigationOutcome::Failed(e) => {
                tracing::warn!("Error navigating to {}: {}", url, e);
                return UrlOutcome::NotExpanded;
            }
        }

        let links = extract_links(renderer, &self.filter).await;

        let mut enqueued = 0;
        for link in &links {
            if self.frontier.offer(link, url) {
                tracing::trace!("Enqueued {} (from {})", link, url);
                enqueued += 1;
            }
        }

        UrlOutcome::Expanded {
            discovered: links.len(),
            enqueued,
        }
    }

    /// Persists the error list and logs progress
    ///
    /// A failed checkpoint is logged and the crawl continues.
    fn checkpoint(&self) {
        if let Err(e) = self.writer.persist(&self.errors) {
            tracing::warn!("Checkpoint failed: {}", e);
        }

        tracing::info!(
            "Progress: {} URLs processed, {} pending, {} errors found",
            self.processed,
            self.frontier.len(),
            self.errors.len()
        );
    }

    /// Releases the renderer and writes the final report
    async fn shutdown(&mut self, termination: TerminationReason) -> crate::Result<()> {
        if termination == TerminationReason::Interrupted {
            tracing::info!("Crawl interrupted, saving progress");
        }
        self.transition(RunState::Stopped);

        if let Some(mut renderer) = self.renderer.take() {
            if let Err(e) = renderer.close().await {
                tracing::warn!("{}", e);
            }
        }

        self.writer.persist(&self.errors)?;
        Ok(())
    }

    fn transition(&mut self, next: RunState) {
        if self.state.can_transition_to(next) {
            tracing::debug!("Run state {} -> {}", self.state, next);
            self.state = next;
        }
    }
}
