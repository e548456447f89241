//! Job identity and the events a job emits while it runs.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Work a queue can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Analyze { item_id: String },
    /// `force` builds even when the version is not the latest known.
    Build { item_id: String, force: bool },
}

impl Job {
    pub fn item_id(&self) -> &str {
        match self {
            Job::Analyze { item_id } | Job::Build { item_id, .. } => item_id,
        }
    }

    pub fn action(&self) -> JobAction {
        match self {
            Job::Analyze { .. } => JobAction::Analyze,
            Job::Build { .. } => JobAction::Build,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobAction {
    Analyze,
    Build,
}

impl JobAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::Analyze => "analyze",
            JobAction::Build => "build",
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of one job. Events of a job arrive in order: `Started`, any
/// number of `Log`, then exactly one of `Done` or `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Started {
        job_id: String,
        item_id: String,
        action: JobAction,
    },
    Log {
        job_id: String,
        message: String,
    },
    Done {
        job_id: String,
        summary: Value,
    },
    Error {
        job_id: String,
        error: String,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> &str {
        match self {
            JobEvent::Started { job_id, .. }
            | JobEvent::Log { job_id, .. }
            | JobEvent::Done { job_id, .. }
            | JobEvent::Error { job_id, .. } => job_id,
        }
    }
}

/// Receives a job's log lines. Callable from blocking worker threads.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// A sink that forwards each line as [`JobEvent::Log`].
pub fn channel_sink(job_id: &str, events: UnboundedSender<JobEvent>) -> LogSink {
    let job_id = job_id.to_string();
    Arc::new(move |line: &str| {
        // A dropped receiver only means nobody is watching.
        let _ = events.send(JobEvent::Log {
            job_id: job_id.clone(),
            message: line.to_string(),
        });
    })
}

/// A sink that drops everything.
pub fn null_sink() -> LogSink {
    Arc::new(|_: &str| {})
}
