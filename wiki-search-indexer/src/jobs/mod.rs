//! Background job queues.
//!
//! Each named queue is drained by one tokio worker task, so jobs on the same queue
//! run one at a time in submission order.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::errors::JobError;

/// Queue used for index rebuilds.
pub const LONG_QUEUE: &str = "long";

/// A unit of background work.
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs jobs outside the caller's request.
pub trait JobRunner: Send + Sync {
    /// Submit `job` to the named queue.
    fn enqueue(&self, job: Job, queue: &str) -> Result<(), JobError>;
}

/// Job runner with one tokio worker task per queue.
///
/// Workers are spawned on first use of a queue and live as long as the runner. A
/// panicking job is logged and does not stop its queue.
#[derive(Default)]
pub struct TokioJobRunner {
    queues: Mutex<HashMap<String, mpsc::UnboundedSender<Job>>>,
}

impl TokioJobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_worker(queue: &str) -> Result<mpsc::UnboundedSender<Job>, JobError> {
        let handle = Handle::try_current().map_err(|_| JobError::NoRuntime(queue.to_string()))?;
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let name = queue.to_string();

        handle.spawn(async move {
            info!(queue = %name, "Job queue worker started");
            while let Some(job) = receiver.recv().await {
                debug!(queue = %name, "Running job");
                if let Err(e) = tokio::spawn(job).await {
                    error!(queue = %name, error = %e, "Job failed");
                }
            }
            debug!(queue = %name, "Job queue worker stopped");
        });

        Ok(sender)
    }
}

impl JobRunner for TokioJobRunner {
    fn enqueue(&self, job: Job, queue: &str) -> Result<(), JobError> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| JobError::QueueClosed(queue.to_string()))?;

        if queues.get(queue).map_or(true, |sender| sender.is_closed()) {
            let sender = Self::spawn_worker(queue)?;
            queues.insert(queue.to_string(), sender);
        }

        queues
            .get(queue)
            .ok_or_else(|| JobError::QueueClosed(queue.to_string()))?
            .send(job)
            .map_err(|_| JobError::QueueClosed(queue.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_jobs_on_one_queue_run_in_order() {
        let runner = TokioJobRunner::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done_rx) = oneshot::channel();

        for i in 0..3 {
            let order = Arc::clone(&order);
            runner
                .enqueue(
                    Box::pin(async move {
                        tokio::task::yield_now().await;
                        order.lock().unwrap().push(i);
                    }),
                    LONG_QUEUE,
                )
                .unwrap();
        }
        runner
            .enqueue(
                Box::pin(async move {
                    let _ = done_tx.send(());
                }),
                LONG_QUEUE,
            )
            .unwrap();

        done_rx.await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_stop_queue() {
        let runner = TokioJobRunner::new();
        let (done_tx, done_rx) = oneshot::channel();

        runner
            .enqueue(Box::pin(async { panic!("boom") }), LONG_QUEUE)
            .unwrap();
        runner
            .enqueue(
                Box::pin(async move {
                    let _ = done_tx.send(());
                }),
                LONG_QUEUE,
            )
            .unwrap();

        done_rx.await.unwrap();
    }

    #[test]
    fn test_enqueue_without_runtime() {
        let runner = TokioJobRunner::new();
        let result = runner.enqueue(Box::pin(async {}), LONG_QUEUE);
        assert_eq!(result, Err(JobError::NoRuntime(LONG_QUEUE.to_string())));
    }
}
