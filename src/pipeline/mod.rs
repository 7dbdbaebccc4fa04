pub mod crawl;
pub mod dedup;
pub mod extract;
pub mod normalize;
pub mod pacing;
pub mod plan;
pub mod sink;

use crate::browser::BrowserAutomation;
use crate::config::{Config, FailureConfig, SearchConfig, TaskFailureMode};
use crate::constants;
use crate::error::{Result, ScrapeError};
use crate::ledger::{self, LedgerStore};
use crate::types::{Candidate, ProfileId, ProfileRecord, QueryTask};
use chrono::{DateTime, Utc};
use crawl::SearchCrawler;
use extract::DetailExtractor;
use metrics::{counter, histogram};
use pacing::Pacer;
use serde::Serialize;
use sink::IngestionSink;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Where a run currently is. `Failed` is terminal; the next trigger starts
/// a brand-new run from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Planning,
    Crawling,
    Deduping,
    Extracting,
    Ingesting,
    Done,
    Failed,
}

impl RunPhase {
    pub fn is_active(self) -> bool {
        matches!(
            self,
            RunPhase::Planning
                | RunPhase::Crawling
                | RunPhase::Deduping
                | RunPhase::Extracting
                | RunPhase::Ingesting
        )
    }
}

/// Observable state of the current (or most recent) run.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatus {
    pub run_id: Option<Uuid>,
    pub phase: RunPhase,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub tasks_total: usize,
    pub tasks_completed: usize,
    pub records_ingested: usize,
    pub last_error: Option<String>,
}

impl RunStatus {
    fn idle() -> Self {
        Self {
            run_id: None,
            phase: RunPhase::Idle,
            started_at: None,
            finished_at: None,
            tasks_total: 0,
            tasks_completed: 0,
            records_ingested: 0,
            last_error: None,
        }
    }
}

/// Shared run-state handle: the trigger surface queries it, the pipeline
/// updates it at stage boundaries. At most one run is active at a time.
#[derive(Clone)]
pub struct RunHandle {
    inner: Arc<Mutex<RunStatus>>,
}

impl Default for RunHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl RunHandle {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(RunStatus::idle())) }
    }

    pub fn snapshot(&self) -> RunStatus {
        self.inner.lock().unwrap().clone()
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().unwrap().phase.is_active()
    }

    /// Claims the handle for a new run. Fails when a run is in flight.
    fn try_begin(&self, run_id: Uuid, started_at: DateTime<Utc>) -> bool {
        let mut status = self.inner.lock().unwrap();
        if status.phase.is_active() {
            return false;
        }
        *status = RunStatus::idle();
        status.run_id = Some(run_id);
        status.phase = RunPhase::Planning;
        status.started_at = Some(started_at);
        true
    }

    fn set_phase(&self, phase: RunPhase) {
        self.inner.lock().unwrap().phase = phase;
    }

    fn set_tasks_total(&self, total: usize) {
        self.inner.lock().unwrap().tasks_total = total;
    }

    fn task_completed(&self) {
        self.inner.lock().unwrap().tasks_completed += 1;
    }

    fn set_records_ingested(&self, count: usize) {
        self.inner.lock().unwrap().records_ingested = count;
    }

    fn finish_done(&self) {
        let mut status = self.inner.lock().unwrap();
        status.phase = RunPhase::Done;
        status.finished_at = Some(Utc::now());
    }

    fn finish_failed(&self, error: &ScrapeError) {
        let mut status = self.inner.lock().unwrap();
        status.phase = RunPhase::Failed;
        status.finished_at = Some(Utc::now());
        status.last_error = Some(error.to_string());
    }
}

/// Result of one complete pipeline run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub tasks_total: usize,
    pub tasks_failed: Vec<String>,
    pub candidates_discovered: usize,
    pub new_candidates: usize,
    pub records_extracted: usize,
    pub failed_extractions: Vec<ProfileId>,
    pub rows_appended: usize,
    pub output_file: Option<String>,
    pub duration_secs: f64,
}

/// Runs the whole crawl–dedup–extract pipeline once.
///
/// Two-phase by design: the full candidate inventory across every query
/// task is collected before the dedup gate runs and before any detail page
/// is fetched. Tasks execute strictly sequentially, paced by the configured
/// randomized delay.
pub async fn run(
    config: &Config,
    browser: &mut dyn BrowserAutomation,
    ledger: Arc<dyn LedgerStore>,
    sink: &IngestionSink,
    handle: &RunHandle,
) -> Result<RunReport> {
    run_with_id(config, browser, ledger, sink, handle, Uuid::new_v4()).await
}

/// Same as [`run`], with a caller-assigned run id (the trigger surface
/// hands the id back to the caller before the run finishes).
#[instrument(skip_all, fields(run_id = %run_id))]
pub async fn run_with_id(
    config: &Config,
    browser: &mut dyn BrowserAutomation,
    ledger: Arc<dyn LedgerStore>,
    sink: &IngestionSink,
    handle: &RunHandle,
    run_id: Uuid,
) -> Result<RunReport> {
    let started_at = Utc::now();
    if !handle.try_begin(run_id, started_at) {
        return Err(ScrapeError::Config("a run is already in progress".to_string()));
    }

    counter!("hrb_pipeline_runs_total").increment(1);
    let t_run = std::time::Instant::now();
    info!("starting run {run_id}");

    match run_phases(config, browser, ledger, sink, handle, run_id, started_at).await {
        Ok(mut report) => {
            report.duration_secs = t_run.elapsed().as_secs_f64();
            histogram!("hrb_pipeline_duration_seconds").record(report.duration_secs);
            handle.finish_done();
            info!(
                "run {run_id} done: {} new of {} discovered, {} rows appended",
                report.new_candidates, report.candidates_discovered, report.rows_appended
            );
            Ok(report)
        }
        Err(e) => {
            counter!("hrb_pipeline_failures_total").increment(1);
            handle.finish_failed(&e);
            Err(e)
        }
    }
}

async fn run_phases(
    config: &Config,
    browser: &mut dyn BrowserAutomation,
    ledger: Arc<dyn LedgerStore>,
    sink: &IngestionSink,
    handle: &RunHandle,
    run_id: Uuid,
    started_at: DateTime<Utc>,
) -> Result<RunReport> {
    // Planning: materialize the immutable query plan and take the ledger
    // snapshot before any crawling starts.
    handle.set_phase(RunPhase::Planning);
    let plan = plan::generate(&constants::JURISDICTIONS, &config.search.keywords);
    handle.set_tasks_total(plan.len());
    info!("planned {} query tasks", plan.len());

    let ingested = ledger::load_ingested_ids(
        ledger.as_ref(),
        &config.ledger.table,
        &config.ledger.id_column_range,
    )
    .await?;
    info!("ledger snapshot holds {} ingested ids", ingested.len());

    // Crawling: build the full candidate inventory, strictly sequentially.
    handle.set_phase(RunPhase::Crawling);
    let pacer = Pacer::new(config.pacing.min_ms, config.pacing.max_ms);
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut tasks_failed: Vec<String> = Vec::new();

    for task in &plan {
        let t_task = std::time::Instant::now();
        match crawl_with_policy(browser, &config.search, &config.failure, task).await {
            Ok(tokens) => {
                for token in &tokens {
                    let (profile_id, detail_url) = normalize::normalize(token);
                    candidates.push(Candidate {
                        keyword: task.keyword.clone(),
                        profile_id,
                        detail_url,
                        jurisdiction_name: task.jurisdiction.name.to_string(),
                    });
                }
                counter!("hrb_links_discovered_total").increment(tokens.len() as u64);
            }
            Err(e) => {
                warn!("search task {task} failed: {e}");
                counter!("hrb_search_task_failures_total").increment(1);
                tasks_failed.push(format!("{task}: {e}"));
            }
        }
        histogram!("hrb_search_task_duration_seconds").record(t_task.elapsed().as_secs_f64());
        handle.task_completed();
        pacer.wait().await;
    }
    let candidates_discovered = candidates.len();

    // Deduping: drop ledger-known ids and intra-batch repeats.
    handle.set_phase(RunPhase::Deduping);
    let new_candidates = dedup::filter_new(candidates, &ingested);
    info!(
        "{} of {} discovered candidates are new",
        new_candidates.len(),
        candidates_discovered
    );

    // Extracting: per-identifier isolation — a failing detail page is
    // recorded and retried naturally on a later run, never aborting the batch.
    handle.set_phase(RunPhase::Extracting);
    let mut records: Vec<ProfileRecord> = Vec::new();
    let mut failed_extractions: Vec<ProfileId> = Vec::new();
    for candidate in &new_candidates {
        let mut extractor = DetailExtractor::new(&mut *browser, &config.search.detail);
        match extractor.extract(candidate).await {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("extraction failed for {}: {e}", candidate.profile_id);
                counter!("hrb_extraction_failures_total").increment(1);
                failed_extractions.push(candidate.profile_id.clone());
            }
        }
    }
    counter!("hrb_records_extracted_total").increment(records.len() as u64);

    // Ingesting.
    handle.set_phase(RunPhase::Ingesting);
    let summary = sink.ingest(&records, started_at).await?;
    handle.set_records_ingested(records.len());

    Ok(RunReport {
        run_id,
        tasks_total: plan.len(),
        tasks_failed,
        candidates_discovered,
        new_candidates: new_candidates.len(),
        records_extracted: records.len(),
        failed_extractions,
        rows_appended: summary.rows_appended,
        output_file: summary.output_file,
        duration_secs: 0.0,
    })
}

/// Applies the configured per-task failure policy: bounded retries with
/// exponential backoff, or a single attempt whose failure is skipped and
/// logged by the caller.
async fn crawl_with_policy(
    browser: &mut dyn BrowserAutomation,
    search: &SearchConfig,
    failure: &FailureConfig,
    task: &QueryTask,
) -> Result<Vec<String>> {
    let mut attempt: u32 = 1;
    loop {
        let mut crawler = SearchCrawler::new(&mut *browser, search);
        match crawler.execute_query(task).await {
            Ok(tokens) => return Ok(tokens),
            Err(e) => match failure.on_task_error {
                TaskFailureMode::Skip => return Err(e),
                TaskFailureMode::Retry => {
                    if attempt >= failure.max_attempts {
                        return Err(e);
                    }
                    let backoff = failure.base_delay_ms.saturating_mul(1 << (attempt - 1));
                    warn!(
                        "search task {task} attempt {attempt}/{} failed, retrying in {backoff}ms: {e}",
                        failure.max_attempts
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
            },
        }
    }
}
