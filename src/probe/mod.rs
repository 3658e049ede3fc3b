//! Concurrent link probe engine
//!
//! `check_batch` fans a batch of links out to a bounded pool of
//! workers under a shared deadline and returns one status per input
//! link, in the original order, no matter what happens in between.
//! Links that never complete get a synthesized timeout status.
//!
//! Each batch owns its job and result channels; workers are spawned
//! per batch and bound to the batch deadline plus the engine-wide stop
//! signal. Distinct URLs are probed once; duplicate occurrences share
//! the observed status.

use crate::config::ProbeConfig;
use crate::fetch::Probe;
use crate::models::{Link, LinkStatus};
use crate::{EngineError, EngineResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

struct ProbeJob {
    link: Link,
}

struct Lifecycle {
    started: bool,
    stop_tx: watch::Sender<bool>,
}

/// Long-lived probe engine with a per-batch worker pool
pub struct LinkProbeEngine {
    prober: Arc<dyn Probe>,
    config: ProbeConfig,
    lifecycle: Mutex<Lifecycle>,
}

impl LinkProbeEngine {
    pub fn new(prober: Arc<dyn Probe>, config: ProbeConfig) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            prober,
            config,
            lifecycle: Mutex::new(Lifecycle {
                started: false,
                stop_tx,
            }),
        }
    }

    /// Starts the engine. A second start is a no-op warning.
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if lifecycle.started {
            tracing::warn!("link probe engine already started");
            return;
        }

        // A fresh stop channel: the previous one is spent once a stop
        // signal has been sent through it.
        let (stop_tx, _) = watch::channel(false);
        lifecycle.stop_tx = stop_tx;
        lifecycle.started = true;

        tracing::info!(
            workers = self.config.worker_pool_size,
            "link probe engine started"
        );
    }

    /// Stops the engine: raises the stop signal every in-flight worker
    /// is selecting on. A second stop is a no-op.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if !lifecycle.started {
            return;
        }

        let _ = lifecycle.stop_tx.send(true);
        lifecycle.started = false;

        tracing::info!("link probe engine stopped");
    }

    fn stop_signal(&self) -> EngineResult<watch::Receiver<bool>> {
        let lifecycle = self.lifecycle.lock().expect("lifecycle lock poisoned");
        if !lifecycle.started {
            return Err(EngineError::NotStarted);
        }
        Ok(lifecycle.stop_tx.subscribe())
    }

    /// Probes every link in the batch and returns one status per input
    /// link, in input order.
    ///
    /// The batch deadline is the caller's deadline capped at the
    /// configured batch timeout. Whatever has not completed when it
    /// fires is returned as a synthesized timeout status; the output
    /// length always equals the input length.
    pub async fn check_batch(
        &self,
        deadline: Instant,
        links: &[Link],
    ) -> EngineResult<Vec<LinkStatus>> {
        let stop_rx = self.stop_signal()?;

        if links.is_empty() {
            return Ok(Vec::new());
        }

        let started = std::time::Instant::now();
        let deadline = deadline.min(Instant::now() + self.config.batch_timeout);
        tracing::info!(link_count = links.len(), "starting batch link check");

        // A deadline that has already passed never starts a probe.
        if deadline <= Instant::now() {
            tracing::warn!(link_count = links.len(), "batch deadline already elapsed");
            return Ok(links.iter().cloned().map(LinkStatus::timed_out).collect());
        }

        // One job per distinct URL; duplicates are filled in from the
        // result map at materialization.
        let mut seen = HashSet::new();
        let unique: Vec<Link> = links
            .iter()
            .filter(|link| seen.insert(link.url.clone()))
            .cloned()
            .collect();
        let expected = unique.len();

        let (job_tx, job_rx) = mpsc::channel::<ProbeJob>(expected);
        let (result_tx, mut result_rx) = mpsc::channel::<LinkStatus>(expected);
        let job_rx = Arc::new(tokio::sync::Mutex::new(job_rx));

        let worker_count = self.config.worker_pool_size.min(expected);
        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            workers.push(tokio::spawn(worker(
                id,
                Arc::clone(&self.prober),
                self.config.link_timeout,
                deadline,
                stop_rx.clone(),
                Arc::clone(&job_rx),
                result_tx.clone(),
            )));
        }
        // Workers hold the only senders once the batch's own clone is
        // gone, so the collector observes their exit as channel close.
        drop(result_tx);

        let submitter = tokio::spawn(submit_jobs(unique, job_tx, deadline));

        let mut observed: HashMap<String, LinkStatus> = HashMap::with_capacity(expected);
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    tracing::warn!(
                        collected = observed.len(),
                        expected,
                        "batch deadline elapsed while collecting results"
                    );
                    break;
                }
                received = result_rx.recv() => match received {
                    Some(status) => {
                        observed.insert(status.link.url.clone(), status);
                        if observed.len() == expected {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }

        // Join point: workers observe the deadline or the closed queue
        // within one suspension and return; nothing here can hang past
        // the deadline by more than a scheduling quantum.
        for handle in workers {
            let _ = handle.await;
        }
        let _ = submitter.await;

        let statuses: Vec<LinkStatus> = links
            .iter()
            .map(|link| match observed.get(&link.url) {
                Some(status) => status.clone().with_link(link.clone()),
                None => LinkStatus::timed_out(link.clone()),
            })
            .collect();

        tracing::info!(
            link_count = statuses.len(),
            duration = ?started.elapsed(),
            "batch link check completed"
        );

        Ok(statuses)
    }

    /// Probes a single link outside any batch.
    pub async fn check_link(&self, link: Link) -> LinkStatus {
        let deadline = Instant::now() + self.config.link_timeout;
        probe_link(
            self.prober.as_ref(),
            self.config.link_timeout,
            deadline,
            link,
        )
        .await
    }
}

/// Submits one job per link, racing the batch deadline.
///
/// Dropping the sender on exit closes the queue, which is what idle
/// workers terminate on.
async fn submit_jobs(links: Vec<Link>, jobs: mpsc::Sender<ProbeJob>, deadline: Instant) {
    for link in links {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                tracing::warn!("batch deadline elapsed during job submission");
                return;
            }
            sent = jobs.send(ProbeJob { link }) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

/// One probe worker: pull, probe, emit, repeat.
///
/// Every suspension races the batch deadline and the stop signal. A
/// result that loses the emission race is discarded; the collector
/// synthesizes a timeout status for it.
async fn worker(
    id: usize,
    prober: Arc<dyn Probe>,
    link_timeout: Duration,
    deadline: Instant,
    mut stop_rx: watch::Receiver<bool>,
    jobs: Arc<tokio::sync::Mutex<mpsc::Receiver<ProbeJob>>>,
    results: mpsc::Sender<LinkStatus>,
) {
    loop {
        let job = tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                tracing::debug!(worker = id, "worker stopping, deadline elapsed");
                return;
            }
            _ = stop_rx.changed() => {
                tracing::debug!(worker = id, "worker stopping, stop signal");
                return;
            }
            job = async { jobs.lock().await.recv().await } => match job {
                Some(job) => job,
                None => {
                    tracing::debug!(worker = id, "worker stopping, job queue closed");
                    return;
                }
            }
        };

        // The probe is racing too: on deadline or stop the in-flight
        // request is abandoned and its result discarded.
        let status = tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                tracing::debug!(worker = id, "worker draining, deadline elapsed mid-probe");
                return;
            }
            _ = stop_rx.changed() => {
                tracing::debug!(worker = id, "worker draining, stop signal mid-probe");
                return;
            }
            status = probe_link(prober.as_ref(), link_timeout, deadline, job.link) => status,
        };

        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => return,
            _ = stop_rx.changed() => return,
            sent = results.send(status) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

/// Probes one link under a sub-deadline so a slow host cannot consume
/// the whole batch budget.
async fn probe_link(
    prober: &dyn Probe,
    link_timeout: Duration,
    batch_deadline: Instant,
    link: Link,
) -> LinkStatus {
    let deadline = batch_deadline.min(Instant::now() + link_timeout);
    tracing::debug!(url = %link.url, "probing link");

    match prober.probe(deadline, &link.url).await {
        Ok(code) if (200..400).contains(&code) => {
            tracing::debug!(url = %link.url, status = code, "link accessible");
            LinkStatus::reached(link, code)
        }
        Ok(code) => {
            tracing::debug!(url = %link.url, status = code, "link returned error status");
            LinkStatus::unreachable(link, code)
        }
        Err(e) => {
            tracing::debug!(url = %link.url, error = %e, "link probe failed");
            LinkStatus::failed(link, e.to_string())
        }
    }
}
