use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tokio::sync::{Semaphore, watch};
use tokio::time::sleep;

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{FetchUrl, HttpFetcher};
use crate::progress::ProgressReporter;
use crate::retry::{Attempt, RetryPolicy, Verdict};
use crate::types::{Outcome, ResultRecord, UrlTask};
use crate::validator::validate_url;

/// Tracks the number of attempts executing right now and the highest value
/// it ever reached, for debug logging and for verifying the concurrency
/// ceiling in tests.
#[derive(Debug, Default)]
struct InFlightGauge {
    current: AtomicUsize,
    high_water: AtomicUsize,
}

impl InFlightGauge {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        self.high_water.fetch_max(now, AtomicOrdering::SeqCst);
        InFlightGuard { gauge: self }
    }

    fn high_water(&self) -> usize {
        self.high_water.load(AtomicOrdering::SeqCst)
    }
}

struct InFlightGuard<'a> {
    gauge: &'a InFlightGauge,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}

/// Best-effort cancellation signal for a running batch. Cloneable so the
/// binary can hand it to a Ctrl-C listener.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // Receivers may already be gone if the batch finished
        let _ = self.tx.send(true);
    }
}

/// Completes once cancellation is requested; pends forever otherwise.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|flagged| *flagged).await.is_err() {
        // Sender dropped without cancelling: never resolve
        std::future::pending::<()>().await;
    }
}

/// Owns the batch: one logical task per URL (validate, permit-gated retry
/// loop, classify), coordinated under the concurrency limiter, results
/// collected in input order.
pub struct BatchDispatcher {
    fetcher: Arc<dyn FetchUrl>,
    policy: RetryPolicy,
    limiter: Arc<Semaphore>,
    cancel_tx: Arc<watch::Sender<bool>>,
    gauge: Arc<InFlightGauge>,
}

impl BatchDispatcher {
    /// Dispatcher over an arbitrary fetcher, mainly for tests
    pub fn new(fetcher: Arc<dyn FetchUrl>, config: &Config) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            fetcher,
            policy: RetryPolicy::from_config(config),
            limiter: Arc::new(Semaphore::new(config.concurrency_limit())),
            cancel_tx: Arc::new(cancel_tx),
            gauge: Arc::new(InFlightGauge::default()),
        }
    }

    /// Dispatcher backed by the production HTTP fetch worker
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher), config))
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel_tx),
        }
    }

    /// Highest number of simultaneously executing attempts observed so far
    pub fn max_in_flight(&self) -> usize {
        self.gauge.high_water()
    }

    /// Run every URL to a terminal state and return one record per input
    /// URL, in input order. Cancelled-mid-flight tasks are omitted; a task
    /// failure never affects any other task's outcome.
    pub async fn run(
        &self,
        urls: Vec<String>,
        progress: Option<&ProgressReporter>,
    ) -> Vec<ResultRecord> {
        let total = urls.len();
        let mut in_flight = FuturesUnordered::new();

        for (index, url) in urls.iter().enumerate() {
            let task = UrlTask::new(url.clone(), index);
            let fetcher = Arc::clone(&self.fetcher);
            let policy = self.policy.clone();
            let limiter = Arc::clone(&self.limiter);
            let gauge = Arc::clone(&self.gauge);
            let cancel_rx = self.cancel_tx.subscribe();

            let handle = tokio::spawn(async move {
                process_url(task, fetcher, policy, limiter, gauge, cancel_rx).await
            });
            in_flight.push(async move { (index, handle.await) });
        }

        let mut slots: Vec<Option<ResultRecord>> = vec![None; total];
        let mut completed = 0;

        while let Some((index, joined)) = in_flight.next().await {
            let record = match joined {
                Ok(record) => record,
                Err(err) if err.is_cancelled() => None,
                Err(err) => {
                    // A panicking task still yields a record for its URL so
                    // the rest of the batch is unaffected
                    let task = UrlTask::new(urls[index].clone(), index);
                    Some(ResultRecord::failure(
                        &task,
                        Outcome::UnknownError,
                        format!("task failed unexpectedly: {err}"),
                    ))
                }
            };

            if let Some(record) = record {
                debug!("{record}");
                slots[index] = Some(record);
            }

            completed += 1;
            if let Some(prog) = progress {
                prog.update_batch_progress(completed);
            }
        }

        debug!(
            "batch complete: {total} task(s), peak concurrency {}",
            self.gauge.high_water()
        );

        slots.into_iter().flatten().collect()
    }
}

/// One UrlTask's full pipeline. Returns `None` only when cancelled
/// mid-flight; every other path produces exactly one record.
async fn process_url(
    task: UrlTask,
    fetcher: Arc<dyn FetchUrl>,
    policy: RetryPolicy,
    limiter: Arc<Semaphore>,
    gauge: Arc<InFlightGauge>,
    mut cancel_rx: watch::Receiver<bool>,
) -> Option<ResultRecord> {
    // Invalid URLs are classified without consuming a permit
    if let Err(reason) = validate_url(&task.url) {
        return Some(ResultRecord::failure(&task, Outcome::InvalidUrl, reason));
    }

    let mut attempt = Attempt::new();

    loop {
        // The permit is held only while the attempt executes and is
        // released before any backoff wait, so other tasks can use the
        // capacity. Guard drop releases it on every exit path.
        let raw = {
            let _permit = tokio::select! {
                permit = limiter.acquire() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return None,
                },
                _ = cancelled(&mut cancel_rx) => return None,
            };
            let _in_flight = gauge.enter();

            tokio::select! {
                outcome = fetcher.attempt(&task.url) => outcome,
                _ = cancelled(&mut cancel_rx) => return None,
            }
        };

        match policy.assess(raw, &mut attempt) {
            Verdict::Done(Outcome::Ok(status), _) => {
                return Some(ResultRecord::ok(&task, status));
            }
            Verdict::Done(outcome, detail) => {
                return Some(ResultRecord::failure(&task, outcome, detail));
            }
            Verdict::RetryAfter(delay) => {
                debug!(
                    "retrying {} in {}ms (attempt {})",
                    task.url,
                    delay.as_millis(),
                    attempt.count()
                );
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = cancelled(&mut cancel_rx) => return None,
                }
            }
        }
    }
}
