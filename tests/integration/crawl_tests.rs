//! Integration tests for the crawl engine
//!
//! These tests drive a full crawl against an in-memory site: a fake
//! transport answers status checks and a fake renderer serves each page's
//! DOM, so the engine's frontier, attribution, checkpoint and shutdown
//! behavior can be checked without a network.

use async_trait::async_trait;
use crawl4xx::config::CrawlConfig;
use crawl4xx::crawler::{
    Crawler, ElementAttributes, NavigationOutcome, PageRenderer, RendererError, Transport,
    TransportError,
};
use crawl4xx::output::{read_report, CsvReportWriter, ErrorRecord, OutputResult, ReportWriter};
use crawl4xx::state::{InterruptFlag, TerminationReason};
use crawl4xx::CrawlError;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory site: status per URL and DOM per page
#[derive(Default)]
struct Site {
    statuses: HashMap<String, Result<u16, TransportError>>,
    pages: HashMap<String, Vec<(&'static str, ElementAttributes)>>,
    slow: HashSet<String>,
}

impl Site {
    fn new() -> Self {
        Self::default()
    }

    /// Adds a page whose anchors point at `links`
    fn page(mut self, url: &str, links: &[&str]) -> Self {
        let elements = links
            .iter()
            .map(|link| ("a", ElementAttributes::with_href(*link)))
            .collect();
        self.pages.insert(url.to_string(), elements);
        self
    }

    fn element(mut self, url: &str, tag: &'static str, attributes: ElementAttributes) -> Self {
        self.pages
            .entry(url.to_string())
            .or_default()
            .push((tag, attributes));
        self
    }

    fn status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), Ok(status));
        self
    }

    fn unreachable(mut self, url: &str, message: &str) -> Self {
        self.statuses
            .insert(url.to_string(), Err(TransportError::Other(message.to_string())));
        self
    }

    fn slow(mut self, url: &str) -> Self {
        self.slow.insert(url.to_string());
        self
    }
}

/// Transport answering from the site and logging every checked URL
#[derive(Clone)]
struct FakeTransport {
    site: Arc<Site>,
    checked: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    fn answer(&self, url: &str) -> Result<u16, TransportError> {
        self.site.statuses.get(url).cloned().unwrap_or(Ok(200))
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn head(&self, url: &str, _timeout: Duration) -> Result<u16, TransportError> {
        self.checked.lock().unwrap().push(url.to_string());
        self.answer(url)
    }

    async fn get(&self, url: &str, _timeout: Duration) -> Result<u16, TransportError> {
        self.answer(url)
    }
}

/// Callback run when the renderer navigates to a given URL
type NavigationHook = (String, Box<dyn Fn() + Send + Sync>);

/// Renderer serving the site's DOM
struct FakeRenderer {
    site: Arc<Site>,
    current: Option<String>,
    navigated: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicUsize>,
    on_navigate: Option<NavigationHook>,
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> NavigationOutcome {
        self.navigated.lock().unwrap().push(url.to_string());
        if let Some((trigger, hook)) = &self.on_navigate {
            if trigger == url {
                hook();
            }
        }

        if self.site.slow.contains(url) {
            self.current = None;
            return NavigationOutcome::TimedOut;
        }
        self.current = Some(url.to_string());
        NavigationOutcome::Loaded
    }

    async fn query_elements(
        &mut self,
        tag: &str,
    ) -> Result<Vec<ElementAttributes>, RendererError> {
        let url = self.current.as_ref().ok_or(RendererError::NoPage)?;
        let elements = self
            .site
            .pages
            .get(url)
            .map(|elements| {
                elements
                    .iter()
                    .filter(|(t, _)| *t == tag)
                    .map(|(_, attributes)| attributes.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(elements)
    }

    async fn close(&mut self) -> Result<(), RendererError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Report writer keeping every persisted snapshot in memory
#[derive(Clone, Default)]
struct RecordingWriter {
    snapshots: Arc<Mutex<Vec<Vec<ErrorRecord>>>>,
}

impl RecordingWriter {
    fn snapshots(&self) -> Vec<Vec<ErrorRecord>> {
        self.snapshots.lock().unwrap().clone()
    }
}

impl ReportWriter for RecordingWriter {
    fn persist(&self, errors: &[ErrorRecord]) -> OutputResult<()> {
        self.snapshots.lock().unwrap().push(errors.to_vec());
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory")
    }
}

/// Test harness wiring the fakes together
struct Harness {
    transport: FakeTransport,
    renderer: FakeRenderer,
    writer: RecordingWriter,
}

impl Harness {
    fn new(site: Site) -> Self {
        let site = Arc::new(site);
        Self {
            transport: FakeTransport {
                site: Arc::clone(&site),
                checked: Arc::default(),
            },
            renderer: FakeRenderer {
                site,
                current: None,
                navigated: Arc::default(),
                closed: Arc::default(),
                on_navigate: None,
            },
            writer: RecordingWriter::default(),
        }
    }

    fn checked(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.transport.checked)
    }

    fn navigated(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.renderer.navigated)
    }

    fn closed(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.renderer.closed)
    }

    fn crawler(self, base_url: &str, config: CrawlConfig) -> Crawler<FakeTransport, FakeRenderer> {
        Crawler::new(base_url, config, self.transport, self.renderer)
            .expect("Failed to create crawler")
            .with_writer(Box::new(self.writer))
    }
}

fn test_config() -> CrawlConfig {
    CrawlConfig {
        politeness_delay_ms: 0,
        ..CrawlConfig::default()
    }
}

#[tokio::test]
async fn test_same_domain_links_are_normalized_and_attributed() {
    let site = Site::new()
        .page(
            "http://x.com",
            &["http://x.com/a", "http://x.com/b#sec", "http://y.com/c"],
        )
        .status("http://x.com/a", 404)
        .status("http://x.com/b", 404);
    let harness = Harness::new(site);
    let checked = harness.checked();

    let summary = harness
        .crawler("http://x.com/", test_config())
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(summary.termination, TerminationReason::Completed);
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.remaining, 0);
    assert_eq!(
        summary.errors,
        vec![
            ErrorRecord::new("http://x.com/a", 404, "http://x.com"),
            ErrorRecord::new("http://x.com/b", 404, "http://x.com"),
        ]
    );

    let checked = checked.lock().unwrap().clone();
    assert_eq!(
        checked,
        vec!["http://x.com", "http://x.com/a", "http://x.com/b"]
    );
}

#[tokio::test]
async fn test_client_error_recorded_with_referrer() {
    let site = Site::new()
        .page("http://x.com", &["http://x.com/missing"])
        .status("http://x.com/missing", 404);
    let harness = Harness::new(site);
    let writer = harness.writer.clone();

    let summary = harness
        .crawler("http://x.com", test_config())
        .run()
        .await
        .expect("Crawl failed");

    let expected = vec![ErrorRecord::new("http://x.com/missing", 404, "http://x.com")];
    assert_eq!(summary.errors, expected);

    // Final persist carries the same list
    let snapshots = writer.snapshots();
    assert_eq!(snapshots.last(), Some(&expected));
}

#[tokio::test]
async fn test_seed_error_uses_seed_sentinel() {
    let site = Site::new().status("http://x.com", 403);
    let harness = Harness::new(site);
    let navigated = harness.navigated();

    let summary = harness
        .crawler("http://x.com/", test_config())
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(
        summary.errors,
        vec![ErrorRecord::new("http://x.com", 403, "seed")]
    );
    assert!(navigated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_first_referrer_wins() {
    let site = Site::new()
        .page("http://x.com", &["http://x.com/p1", "http://x.com/p2"])
        .page("http://x.com/p1", &["http://x.com/missing"])
        .page("http://x.com/p2", &["http://x.com/missing", "http://x.com"])
        .status("http://x.com/missing", 410);
    let harness = Harness::new(site);
    let checked = harness.checked();

    let summary = harness
        .crawler("http://x.com", test_config())
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(
        summary.errors,
        vec![ErrorRecord::new("http://x.com/missing", 410, "http://x.com/p1")]
    );

    // Every URL is checked once, in FIFO order
    let checked = checked.lock().unwrap().clone();
    assert_eq!(
        checked,
        vec![
            "http://x.com",
            "http://x.com/p1",
            "http://x.com/p2",
            "http://x.com/missing"
        ]
    );
}

#[tokio::test]
async fn test_server_errors_are_neither_reported_nor_expanded() {
    let site = Site::new()
        .page("http://x.com", &["http://x.com/broken"])
        .page("http://x.com/broken", &["http://x.com/hidden"])
        .status("http://x.com/broken", 503);
    let harness = Harness::new(site);
    let checked = harness.checked();
    let navigated = harness.navigated();

    let summary = harness
        .crawler("http://x.com", test_config())
        .run()
        .await
        .expect("Crawl failed");

    assert!(summary.errors.is_empty());
    assert_eq!(summary.processed, 2);
    assert!(!checked
        .lock()
        .unwrap()
        .contains(&"http://x.com/hidden".to_string()));
    assert_eq!(*navigated.lock().unwrap(), vec!["http://x.com"]);
}

#[tokio::test]
async fn test_redirect_status_is_expanded() {
    let site = Site::new()
        .page("http://x.com", &["http://x.com/moved"])
        .page("http://x.com/moved", &["http://x.com/gone"])
        .status("http://x.com/moved", 301)
        .status("http://x.com/gone", 404);
    let harness = Harness::new(site);

    let summary = harness
        .crawler("http://x.com", test_config())
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(
        summary.errors,
        vec![ErrorRecord::new("http://x.com/gone", 404, "http://x.com/moved")]
    );
}

#[tokio::test]
async fn test_unreachable_url_classified_from_error_text() {
    let site = Site::new()
        .page("http://x.com", &["http://x.com/a", "http://x.com/b"])
        .unreachable("http://x.com/a", "server answered 401 Unauthorized")
        .unreachable("http://x.com/b", "connection reset by peer");
    let harness = Harness::new(site);

    let summary = harness
        .crawler("http://x.com", test_config())
        .run()
        .await
        .expect("Crawl failed");

    // The generic failure (500) is not reported
    assert_eq!(
        summary.errors,
        vec![ErrorRecord::new("http://x.com/a", 401, "http://x.com")]
    );
}

#[tokio::test]
async fn test_navigation_timeout_skips_expansion() {
    let site = Site::new()
        .page("http://x.com", &["http://x.com/slow"])
        .page("http://x.com/slow", &["http://x.com/behind"])
        .slow("http://x.com/slow");
    let harness = Harness::new(site);
    let checked = harness.checked();

    let summary = harness
        .crawler("http://x.com", test_config())
        .run()
        .await
        .expect("Crawl failed");

    assert!(summary.errors.is_empty());
    assert_eq!(summary.processed, 2);
    assert!(!checked
        .lock()
        .unwrap()
        .contains(&"http://x.com/behind".to_string()));
}

#[tokio::test]
async fn test_asset_tags_are_collected() {
    let site = Site::new()
        .element(
            "http://x.com",
            "img",
            ElementAttributes::with_src("http://x.com/logo.png"),
        )
        .element(
            "http://x.com",
            "link",
            ElementAttributes::with_href("http://x.com/style.css"),
        )
        .element(
            "http://x.com",
            "script",
            ElementAttributes::with_src("http://cdn.example.com/lib.js"),
        )
        .status("http://x.com/logo.png", 404)
        .status("http://x.com/style.css", 404);
    let harness = Harness::new(site);

    let summary = harness
        .crawler("http://x.com", test_config())
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(
        summary.errors,
        vec![
            ErrorRecord::new("http://x.com/logo.png", 404, "http://x.com"),
            ErrorRecord::new("http://x.com/style.css", 404, "http://x.com"),
        ]
    );
}

#[tokio::test]
async fn test_checkpoint_snapshots_errors_so_far() {
    let links: Vec<String> = (1..=9).map(|i| format!("http://x.com/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let site = Site::new()
        .page("http://x.com", &link_refs)
        .status("http://x.com/p1", 404)
        .status("http://x.com/p4", 404)
        .status("http://x.com/p7", 404);
    let harness = Harness::new(site);
    let writer = harness.writer.clone();

    let summary = harness
        .crawler("http://x.com", test_config())
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(summary.processed, 10);

    // One checkpoint after the tenth URL, then the final persist
    let snapshots = writer.snapshots();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].len(), 3);
    assert_eq!(snapshots[0], snapshots[1]);
}

#[tokio::test]
async fn test_checkpoint_file_holds_errors_before_final_persist() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("errors_4xx.csv");

    let links: Vec<String> = (1..=11).map(|i| format!("http://x.com/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let site = Site::new()
        .page("http://x.com", &link_refs)
        .status("http://x.com/p1", 404)
        .status("http://x.com/p4", 404)
        .status("http://x.com/p7", 404)
        .status("http://x.com/p11", 404);
    let mut harness = Harness::new(site);

    // p10 is the eleventh URL: the checkpoint after the tenth has run, the
    // final persist has not.
    let at_p10: Arc<Mutex<Option<Vec<ErrorRecord>>>> = Arc::default();
    let sink = Arc::clone(&at_p10);
    let path = report.clone();
    harness.renderer.on_navigate = Some((
        "http://x.com/p10".to_string(),
        Box::new(move || {
            *sink.lock().unwrap() = Some(read_report(&path).unwrap());
        }),
    ));

    let config = CrawlConfig {
        output: report.to_string_lossy().into_owned(),
        ..test_config()
    };
    let summary = Crawler::new("http://x.com", config, harness.transport, harness.renderer)
        .unwrap()
        .run()
        .await
        .unwrap();

    let checkpointed = at_p10.lock().unwrap().clone().expect("p10 was never rendered");
    assert_eq!(
        checkpointed,
        vec![
            ErrorRecord::new("http://x.com/p1", 404, "http://x.com"),
            ErrorRecord::new("http://x.com/p4", 404, "http://x.com"),
            ErrorRecord::new("http://x.com/p7", 404, "http://x.com"),
        ]
    );

    assert_eq!(summary.processed, 12);
    assert_eq!(read_report(&report).unwrap().len(), 4);
}

#[tokio::test]
async fn test_checkpoint_interval_is_configurable() {
    let site = Site::new().page(
        "http://x.com",
        &[
            "http://x.com/a",
            "http://x.com/b",
            "http://x.com/c",
            "http://x.com/d",
        ],
    );
    let harness = Harness::new(site);
    let writer = harness.writer.clone();

    let config = CrawlConfig {
        checkpoint_interval: 2,
        ..test_config()
    };
    harness
        .crawler("http://x.com", config)
        .run()
        .await
        .expect("Crawl failed");

    // Checkpoints after URLs 2 and 4, then the final persist
    assert_eq!(writer.snapshots().len(), 3);
}

#[tokio::test]
async fn test_interrupt_drains_and_persists() {
    let site = Site::new()
        .page("http://x.com", &["http://x.com/a", "http://x.com/b"])
        .page("http://x.com/a", &["http://x.com/gone"])
        .status("http://x.com/a", 200)
        .status("http://x.com/gone", 404);
    let mut harness = Harness::new(site);
    let interrupt = InterruptFlag::new();
    let raiser = interrupt.clone();
    harness.renderer.on_navigate = Some((
        "http://x.com/a".to_string(),
        Box::new(move || raiser.raise()),
    ));
    let writer = harness.writer.clone();
    let closed = harness.closed();
    let checked = harness.checked();

    let summary = harness
        .crawler("http://x.com", test_config())
        .with_interrupt(interrupt)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(summary.termination, TerminationReason::Interrupted);
    // The in-flight URL finished, nothing after it started
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.remaining, 2);
    assert_eq!(
        *checked.lock().unwrap(),
        vec!["http://x.com", "http://x.com/a"]
    );

    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert_eq!(writer.snapshots().len(), 1);
}

#[tokio::test]
async fn test_interrupt_before_start_processes_nothing() {
    let harness = Harness::new(Site::new().page("http://x.com", &["http://x.com/a"]));
    let closed = harness.closed();
    let writer = harness.writer.clone();
    let interrupt = InterruptFlag::new();
    interrupt.raise();

    let summary = harness
        .crawler("http://x.com", test_config())
        .with_interrupt(interrupt)
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.remaining, 1);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert_eq!(writer.snapshots(), vec![Vec::<ErrorRecord>::new()]);
}

#[tokio::test]
async fn test_completed_run_closes_renderer_once() {
    let harness = Harness::new(Site::new());
    let closed = harness.closed();

    harness
        .crawler("http://x.com", test_config())
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_base_url_rejected() {
    for base_url in ["not a url", "ftp://x.com/file", "mailto:admin@x.com"] {
        let harness = Harness::new(Site::new());
        let result = Crawler::new(
            base_url,
            test_config(),
            harness.transport,
            harness.renderer,
        );
        assert!(
            matches!(result, Err(CrawlError::Config(_))),
            "{} should be rejected",
            base_url
        );
    }
}

#[tokio::test]
async fn test_crawler_reports_domain() {
    let harness = Harness::new(Site::new());
    let crawler = harness.crawler("https://docs.x.com/guide/", test_config());

    assert_eq!(crawler.domain(), "docs.x.com");
    assert_eq!(crawler.frontier().len(), 1);
    assert_eq!(crawler.frontier().referrer_of("https://docs.x.com/guide"), "seed");
}

fn error_site() -> Site {
    Site::new()
        .page("http://x.com", &["http://x.com/a", "http://x.com/b"])
        .page("http://x.com/a", &["http://x.com/gone", "http://x.com/b"])
        .status("http://x.com/b", 403)
        .status("http://x.com/gone", 404)
}

#[tokio::test]
async fn test_csv_report_written_and_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("errors_4xx.csv");

    let mut reports = Vec::new();
    for _ in 0..2 {
        let harness = Harness::new(error_site());
        let config = CrawlConfig {
            output: report.to_string_lossy().into_owned(),
            ..test_config()
        };
        let summary = Crawler::new("http://x.com", config, harness.transport, harness.renderer)
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(summary.output_path, report);
        reports.push(read_report(&report).unwrap());
    }

    assert_eq!(reports[0], reports[1]);
    assert_eq!(
        reports[0],
        vec![
            ErrorRecord::new("http://x.com/b", 403, "http://x.com"),
            ErrorRecord::new("http://x.com/gone", 404, "http://x.com/a"),
        ]
    );
    assert!(!dir.path().join("errors_4xx.csv.tmp").exists());
}

#[tokio::test]
async fn test_unwritable_report_fails_run() {
    let harness = Harness::new(Site::new());
    let writer = CsvReportWriter::new("/nonexistent/dir/errors.csv");

    let result = Crawler::new("http://x.com", test_config(), harness.transport, harness.renderer)
        .unwrap()
        .with_writer(Box::new(writer))
        .run()
        .await;

    assert!(matches!(result, Err(CrawlError::Output(_))));
}
