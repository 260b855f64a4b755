//! Scan driver - fixed worker pool over a shared job queue

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, Stream, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::aggregator::{ResultBuckets, ScanSummary};
use crate::domain::DomainCheck;
use crate::types::{MetricsSnapshot, ScanMetrics, ScanResult};

/// Worker pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Concurrent workers
    pub workers: usize,
    /// Pause a worker takes after each job, to stay under upstream rate limits
    pub delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Lifecycle of one job, as seen in the logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Classifying,
    Completed,
    Errored,
}

/// Progress info handed to the caller after every completion
#[derive(Debug)]
pub struct ScanProgress<'a> {
    /// Completions so far, including this one
    pub completed: usize,
    pub total: usize,
    pub result: &'a ScanResult,
}

/// Everything a finished scan produced
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub buckets: ResultBuckets,
    pub summary: ScanSummary,
    pub metrics: MetricsSnapshot,
    pub elapsed: Duration,
}

/// Runs a [`DomainCheck`] over a candidate list with `workers` concurrent tasks.
pub struct Scanner {
    checker: Arc<dyn DomainCheck>,
    config: ScanConfig,
    metrics: Arc<ScanMetrics>,
}

impl Scanner {
    pub fn new(checker: Arc<dyn DomainCheck>, config: ScanConfig) -> Self {
        Self {
            checker,
            config,
            metrics: Arc::new(ScanMetrics::new()),
        }
    }

    /// Start the workers and return the results in completion order.
    ///
    /// The stream yields exactly one result per candidate and then ends.
    /// Must be called from within a Tokio runtime.
    pub fn stream(&self, candidates: Vec<String>) -> impl Stream<Item = ScanResult> + Send + 'static {
        let total = candidates.len();
        let queue = Arc::new(Mutex::new(VecDeque::from(candidates)));
        let (tx, rx) = mpsc::channel(total.max(1));
        let workers = self.config.workers.max(1).min(total.max(1));

        for id in 0..workers {
            tokio::spawn(worker(
                id,
                Arc::clone(&queue),
                tx.clone(),
                Arc::clone(&self.checker),
                Arc::clone(&self.metrics),
                self.config.delay,
            ));
        }
        drop(tx);

        stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|result| (result, rx)) })
    }

    /// Scan everything, filing results into buckets as they arrive.
    pub async fn run<F>(&self, candidates: Vec<String>, mut on_progress: F) -> ScanReport
    where
        F: FnMut(&ScanProgress<'_>),
    {
        let started = Instant::now();
        let total = candidates.len();

        tracing::info!(
            total,
            workers = self.config.workers,
            delay_ms = %self.config.delay.as_millis(),
            "Scan started"
        );

        let mut results = std::pin::pin!(self.stream(candidates));
        let mut buckets = ResultBuckets::new();
        let mut completed = 0;

        while let Some(result) = results.next().await {
            completed += 1;
            on_progress(&ScanProgress {
                completed,
                total,
                result: &result,
            });
            buckets.record(result);
        }

        let summary = buckets.summary();
        let elapsed = started.elapsed();

        tracing::info!(
            total = summary.total,
            available = summary.available,
            registered = summary.registered,
            special_status = summary.special_status,
            errors = summary.errors,
            elapsed_ms = %elapsed.as_millis(),
            "Scan completed"
        );

        ScanReport {
            buckets,
            summary,
            metrics: self.metrics.snapshot(),
            elapsed,
        }
    }

    /// Scan everything and return the raw results in completion order
    pub async fn collect(&self, candidates: Vec<String>) -> Vec<ScanResult> {
        self.stream(candidates).collect().await
    }
}

async fn worker(
    id: usize,
    queue: Arc<Mutex<VecDeque<String>>>,
    results: mpsc::Sender<ScanResult>,
    checker: Arc<dyn DomainCheck>,
    metrics: Arc<ScanMetrics>,
    delay: Duration,
) {
    loop {
        let next = queue.lock().pop_front();
        let Some(domain) = next else {
            break;
        };

        let result = run_job(id, &checker, domain).await;
        metrics.record(&result);

        if results.send(result).await.is_err() {
            tracing::debug!(worker = id, "Result consumer dropped, worker stopping");
            break;
        }

        let more = !queue.lock().is_empty();
        if more && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Classify one domain in its own task so a panic stays confined to its job.
async fn run_job(worker: usize, checker: &Arc<dyn DomainCheck>, domain: String) -> ScanResult {
    let started = Instant::now();
    tracing::debug!(worker, domain = %domain, state = ?JobState::Classifying, "Job started");

    let task_checker = Arc::clone(checker);
    let task_domain = domain.clone();
    let outcome = tokio::spawn(async move { task_checker.check(&task_domain).await }).await;
    let elapsed = started.elapsed();

    match outcome {
        Ok(Ok(classification)) => {
            tracing::debug!(
                worker,
                domain = %domain,
                state = ?JobState::Completed,
                verdict = %classification.verdict,
                "Job finished"
            );
            ScanResult::completed(domain, classification, elapsed)
        }
        Ok(Err(e)) => {
            tracing::warn!(worker, domain = %domain, state = ?JobState::Errored, error = %e, "Job failed");
            ScanResult::errored(domain, e, elapsed)
        }
        Err(e) => {
            let error = crate::internal_error!("classification task failed: {}", e);
            tracing::error!(worker, domain = %domain, state = ?JobState::Errored, error = %error, "Job failed");
            ScanResult::errored(domain, error, elapsed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::types::{Classification, Provenance, SignalSet, Verdict};
    use async_trait::async_trait;
    use std::collections::HashSet;

    struct AlwaysAvailable;

    #[async_trait]
    impl DomainCheck for AlwaysAvailable {
        async fn check(&self, _domain: &str) -> Result<Classification> {
            Ok(Classification {
                verdict: Verdict::Available,
                signatures: SignalSet::new(),
                provenance: Provenance::NoData,
            })
        }
    }

    struct PanicsOn(&'static str);

    #[async_trait]
    impl DomainCheck for PanicsOn {
        async fn check(&self, domain: &str) -> Result<Classification> {
            if domain == self.0 {
                panic!("collector blew up");
            }
            AlwaysAvailable.check(domain).await
        }
    }

    fn candidates(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("d{}.li", i)).collect()
    }

    fn scanner(checker: Arc<dyn DomainCheck>, workers: usize) -> Scanner {
        Scanner::new(checker, ScanConfig { workers, delay: Duration::ZERO })
    }

    #[tokio::test]
    async fn test_every_candidate_yields_one_result() {
        for workers in [1, 10, 25] {
            let results = scanner(Arc::new(AlwaysAvailable), workers).collect(candidates(25)).await;
            let distinct: HashSet<_> = results.iter().map(|r| r.domain.clone()).collect();
            assert_eq!(results.len(), 25, "workers = {}", workers);
            assert_eq!(distinct.len(), 25, "workers = {}", workers);
        }
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let report = scanner(Arc::new(AlwaysAvailable), 4).run(Vec::new(), |_| {}).await;
        assert_eq!(report.summary.total, 0);
    }

    #[tokio::test]
    async fn test_progress_counts_completions() {
        let mut seen = Vec::new();
        let report = scanner(Arc::new(AlwaysAvailable), 3)
            .run(candidates(7), |p| seen.push((p.completed, p.total)))
            .await;

        assert_eq!(seen, (1..=7).map(|i| (i, 7)).collect::<Vec<_>>());
        assert_eq!(report.summary.available, 7);
        assert_eq!(report.metrics.domains_checked, 7);
    }

    #[tokio::test]
    async fn test_panicking_job_is_reported_not_fatal() {
        let report = scanner(Arc::new(PanicsOn("d3.li")), 2).run(candidates(6), |_| {}).await;

        assert_eq!(report.summary.total, 6);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.buckets.errors[0].domain, "d3.li");
        assert_eq!(report.summary.available, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_paces_each_worker() {
        let paced = Scanner::new(
            Arc::new(AlwaysAvailable),
            ScanConfig {
                workers: 1,
                delay: Duration::from_secs(1),
            },
        );

        let started = tokio::time::Instant::now();
        let results = paced.collect(candidates(3)).await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 3);
        // two pauses between three jobs, none after the last one
        assert!(elapsed >= Duration::from_secs(2), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_zero_workers_still_scans() {
        let results = scanner(Arc::new(AlwaysAvailable), 0).collect(candidates(3)).await;
        assert_eq!(results.len(), 3);
    }
}
