//! Bounded worker pool running analyze and build jobs.

use crate::error::Result;
use crate::events::{channel_sink, Job, JobEvent};
use crate::pipeline::Pipeline;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Notify, Semaphore};
use tracing::{error, info, warn};

/// Runs jobs with at most `max_concurrent` executing at once.
///
/// Submitting never blocks; jobs wait for a permit inside their own task.
/// A failing job marks its item `Failed` and does not affect other jobs.
#[derive(Clone)]
pub struct JobQueue {
    pipeline: Arc<Pipeline>,
    semaphore: Arc<Semaphore>,
    events: UnboundedSender<JobEvent>,
    next_id: Arc<AtomicU64>,
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
    auto_build: bool,
}

/// Decrements the pending count when a job task ends, however it ends.
struct PendingGuard {
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl JobQueue {
    /// Create a queue and the receiver for its events.
    pub fn new(pipeline: Pipeline, max_concurrent: usize) -> (Self, UnboundedReceiver<JobEvent>) {
        let concurrency = max_concurrent.max(1);
        let (events, receiver) = mpsc::unbounded_channel();
        info!(concurrency, "job queue started");

        let queue = Self {
            pipeline: Arc::new(pipeline),
            semaphore: Arc::new(Semaphore::new(concurrency)),
            events,
            next_id: Arc::new(AtomicU64::new(1)),
            pending: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
            auto_build: true,
        };
        (queue, receiver)
    }

    /// Whether a 10/10 analysis enqueues its build (default: true).
    pub fn with_auto_build(mut self, enabled: bool) -> Self {
        self.auto_build = enabled;
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Jobs submitted and not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Queue a job; returns its id. Must be called within a tokio runtime.
    pub fn submit(&self, job: Job) -> String {
        let job_id = format!("job-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.pending.fetch_add(1, Ordering::SeqCst);
        let guard = PendingGuard {
            pending: Arc::clone(&self.pending),
            idle: Arc::clone(&self.idle),
        };

        let queue = self.clone();
        let id = job_id.clone();
        tokio::spawn(async move {
            let _guard = guard;
            let permit = match Arc::clone(&queue.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(err) => {
                    error!(job_id = %id, error = %err, "job queue closed");
                    return;
                }
            };
            queue.execute(&id, job).await;
            drop(permit);
        });

        job_id
    }

    /// Wait until every submitted job, including chained builds, finished.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn emit(&self, event: JobEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    async fn execute(&self, job_id: &str, job: Job) {
        let item_id = job.item_id().to_string();
        info!(job_id, item_id = %item_id, action = %job.action(), "job started");
        self.emit(JobEvent::Started {
            job_id: job_id.to_string(),
            item_id: item_id.clone(),
            action: job.action(),
        });

        match self.run(job_id, job).await {
            Ok(summary) => {
                info!(job_id, item_id = %item_id, "job done");
                self.emit(JobEvent::Done {
                    job_id: job_id.to_string(),
                    summary,
                });
            }
            Err(err) => {
                warn!(job_id, item_id = %item_id, error = %err, "job failed");
                if let Err(mark_err) = self.pipeline.mark_failed(&item_id, &err).await {
                    error!(item_id = %item_id, error = %mark_err, "could not record failure");
                }
                self.emit(JobEvent::Error {
                    job_id: job_id.to_string(),
                    error: err.to_string(),
                });
            }
        }
    }

    async fn run(&self, job_id: &str, job: Job) -> Result<Value> {
        let log = channel_sink(job_id, self.events.clone());

        match job {
            Job::Analyze { item_id } => {
                let result = self.pipeline.analyze(&item_id, log.clone()).await?;
                if self.auto_build && result.is_auto_buildable() {
                    let build_id = self.submit(Job::Build {
                        item_id: item_id.clone(),
                        force: false,
                    });
                    log(&format!("Perfect score, build queued as {build_id}"));
                }
                Ok(result.to_metadata()?)
            }
            Job::Build { item_id, force } => {
                let report = self.pipeline.build(&item_id, force, log).await?;
                Ok(json!({
                    "output": serde_json::to_value(&report.output)?,
                    "is_latest": report.is_latest,
                    "forced": report.forced,
                    "banner_path": report.banner_path,
                }))
            }
        }
    }
}
