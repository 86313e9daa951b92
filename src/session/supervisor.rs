//! Task Supervisor: tracks spawned jobs and turns their failures into status lines

use crate::output::Notifier;
use crate::ScoutError;
use std::future::Future;
use tokio::task::{JoinError, JoinHandle};

/// A submitted job and the name it is reported under
struct TrackedTask {
    label: String,
    handle: JoinHandle<Result<(), ScoutError>>,
}

/// Counts of jobs joined by one `drain` or `reap` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub completed: usize,
    pub failed: usize,
}

/// Registry of asynchronous jobs
///
/// No job failure escapes the supervisor: typed errors become
/// `"Fail: <message>"` status lines, panics become `"Fail: Unknown"`.
/// Dropping the supervisor detaches outstanding jobs, so owners call
/// `drain` first.
pub struct TaskSupervisor {
    tasks: Vec<TrackedTask>,
    notifier: Notifier,
}

impl TaskSupervisor {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            tasks: Vec::new(),
            notifier,
        }
    }

    /// Spawns `task` and keeps its handle until it is joined
    pub fn submit<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = Result<(), ScoutError>> + Send + 'static,
    {
        let label = label.into();
        tracing::debug!("Submitting task '{}'", label);
        self.tasks.push(TrackedTask {
            label,
            handle: tokio::spawn(task),
        });
    }

    /// Number of jobs not joined yet
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Joins the jobs that already finished, without waiting for the rest
    pub async fn reap(&mut self) -> DrainReport {
        let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|task| task.handle.is_finished());
        self.tasks = running;
        self.join_all(finished).await
    }

    /// Waits until every job has finished and reports each outcome
    pub async fn drain(&mut self) -> DrainReport {
        if self.tasks.is_empty() {
            return DrainReport::default();
        }

        self.notifier
            .status("General: Waiting until tasks finished, stand by");
        let tasks = std::mem::take(&mut self.tasks);
        self.join_all(tasks).await
    }

    async fn join_all(&self, tasks: Vec<TrackedTask>) -> DrainReport {
        let mut report = DrainReport::default();
        for task in tasks {
            let outcome = task.handle.await;
            report.completed += 1;
            if !self.report(&task.label, outcome) {
                report.failed += 1;
            }
        }
        report
    }

    /// Reports one outcome; returns true if the job succeeded
    fn report(&self, label: &str, outcome: Result<Result<(), ScoutError>, JoinError>) -> bool {
        match outcome {
            Ok(Ok(())) => {
                tracing::debug!("Task '{}' finished", label);
                true
            }
            Ok(Err(e)) => {
                tracing::error!("Task '{}' failed: {}", label, e);
                self.notifier.status(format!("Fail: {}", e));
                false
            }
            Err(e) => {
                tracing::error!("Task '{}' did not complete: {}", label, e);
                self.notifier.status("Fail: Unknown");
                false
            }
        }
    }
}

impl Drop for TaskSupervisor {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            tracing::warn!("Dropping supervisor with {} unjoined tasks", self.tasks.len());
        }
    }
}
