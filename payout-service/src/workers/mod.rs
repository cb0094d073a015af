//! Background execution for queued bulk submissions.

use crate::config::BulkConfig;
use crate::services::bulk::{BulkSubmitJob, BulkSubmitter};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Consumes queued bulk jobs and runs each batch on its own task.
///
/// Batches are independent of each other; only the documents inside one
/// batch run in order.
pub struct SubmissionWorker {
    job_rx: mpsc::Receiver<BulkSubmitJob>,
    shutdown_token: CancellationToken,
}

impl SubmissionWorker {
    /// Create the worker together with the bounded sender feeding it.
    pub fn new(config: &BulkConfig) -> (Self, mpsc::Sender<BulkSubmitJob>, CancellationToken) {
        let (job_tx, job_rx) = mpsc::channel(config.queue_size);
        let shutdown_token = CancellationToken::new();

        (
            Self {
                job_rx,
                shutdown_token: shutdown_token.clone(),
            },
            job_tx,
            shutdown_token,
        )
    }

    /// Spawn the distributor loop.
    pub fn start(mut self, submitter: Arc<BulkSubmitter>) {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = self.shutdown_token.cancelled() => {
                        tracing::info!("Submission worker shutting down");
                        break;
                    }
                    job = self.job_rx.recv() => {
                        match job {
                            Some(job) => {
                                tracing::info!(
                                    task_id = job.task_id.as_deref().unwrap_or("-"),
                                    documents = job.docnames.len(),
                                    "Starting bulk job"
                                );

                                let submitter = submitter.clone();
                                tokio::spawn(async move {
                                    submitter.run_batch(job).await;
                                });
                            }
                            None => {
                                tracing::info!("Job channel closed, submission worker exiting");
                                break;
                            }
                        }
                    }
                }
            }
        });
    }
}
