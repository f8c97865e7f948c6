//! Serialized action execution.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tally_error::{ActionError, ActionErrorKind, ActionResult, SchedulerError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// Default upper bound on how long one action may run.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(120);

struct Job {
    label: String,
    task: BoxFuture<'static, ActionResult<()>>,
}

/// Runs submitted tasks one at a time, in submission order.
///
/// A task starts only after the previous one has settled. Failures, panics and
/// timeouts are logged with the task's label and never reach the submitter or
/// stop the queue. The queue lives as long as the scheduler, independently of
/// any streaming connection.
///
/// # Examples
///
/// ```
/// use tally_pipeline::ActionScheduler;
///
/// # #[tokio::main]
/// # async fn main() {
/// let scheduler = ActionScheduler::default();
/// scheduler.submit("hello", async { Ok(()) }).unwrap();
/// scheduler.shutdown().await;
/// assert_eq!(scheduler.pending(), 0);
/// # }
/// ```
pub struct ActionScheduler {
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    worker: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    pending: Arc<AtomicUsize>,
}

impl ActionScheduler {
    /// Start a scheduler whose tasks are aborted after `action_timeout`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(action_timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker = tokio::spawn(run_worker(receiver, pending.clone(), action_timeout));

        info!(
            timeout_secs = action_timeout.as_secs(),
            "Action scheduler started"
        );

        Self {
            sender: Mutex::new(Some(sender)),
            worker: tokio::sync::Mutex::new(Some(worker)),
            pending,
        }
    }

    /// Queue a task. Never waits for the queue to drain.
    ///
    /// # Errors
    ///
    /// Returns error if the scheduler has been shut down.
    pub fn submit<F>(&self, label: impl Into<String>, task: F) -> Result<(), SchedulerError>
    where
        F: Future<Output = ActionResult<()>> + Send + 'static,
    {
        let label = label.into();
        let guard = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(sender) = guard.as_ref() else {
            return Err(SchedulerError::new(format!(
                "Scheduler is shut down, dropping {}",
                label
            )));
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        let job = Job {
            label,
            task: Box::pin(task),
        };
        sender.send(job).map_err(|rejected| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            SchedulerError::new(format!(
                "Scheduler worker has stopped, dropping {}",
                rejected.0.label
            ))
        })
    }

    /// Number of tasks submitted but not yet settled.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Stop accepting work and wait for already queued tasks to finish.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(error = %e, "Scheduler worker ended abnormally");
            }
        }
        info!("Action scheduler stopped");
    }
}

impl Default for ActionScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_ACTION_TIMEOUT)
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<Job>,
    pending: Arc<AtomicUsize>,
    action_timeout: Duration,
) {
    while let Some(job) = receiver.recv().await {
        let label = job.label;
        let started = tokio::time::Instant::now();
        debug!(label = %label, "Running action");

        match settle(job.task, action_timeout).await {
            Ok(()) => debug!(
                label = %label,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Action finished"
            ),
            Err(e) => error!(label = %label, error = %e, "Action failed"),
        }

        pending.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Run one task on its own Tokio task so a panic is contained like an error.
async fn settle(
    task: BoxFuture<'static, ActionResult<()>>,
    action_timeout: Duration,
) -> ActionResult<()> {
    let mut handle = tokio::spawn(task);

    match tokio::time::timeout(action_timeout, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(ActionError::new(ActionErrorKind::Panicked(
            join_error.to_string(),
        ))),
        Err(_) => {
            handle.abort();
            Err(ActionError::new(ActionErrorKind::TimedOut(
                action_timeout.as_secs(),
            )))
        }
    }
}
