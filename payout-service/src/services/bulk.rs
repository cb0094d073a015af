//! Bulk pay-and-submit orchestration.
//!
//! Small batches run inline so the caller sees final results; larger ones
//! are handed to the submission worker and report through the progress
//! tracker. Either way every document is validated, submitted, and
//! accounted for independently.

use crate::services::auth::{ensure_payment_authorized, PaymentAuthorizer};
use crate::services::documents::PaymentEntryStore;
use crate::services::policy::TransferMethodPolicy;
use crate::services::progress::ProgressTracker;
use service_core::error::AppError;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// One bulk submission request, carried whole onto the worker on the
/// queued path.
#[derive(Debug, Clone)]
pub struct BulkSubmitJob {
    pub auth_id: String,
    pub docnames: Vec<String>,
    pub mark_online_payment: bool,
    pub task_id: Option<String>,
}

/// How a dispatch was resolved.
#[derive(Debug)]
pub enum BulkDispatch {
    /// Ran inline; the failed names are final.
    Completed { failed: Vec<String> },
    /// Accepted for background execution; poll progress by task id.
    Queued { task_id: String },
}

/// Size policy for one bulk call.
#[derive(Debug, Clone)]
pub struct BulkLimits {
    /// Batches below this many documents run inline.
    pub sync_threshold: usize,
    /// Batches above this many documents are rejected outright.
    pub max_batch_size: usize,
}

enum ItemOutcome {
    Submitted(&'static str),
    Skipped,
    Failed(String),
}

pub struct BulkSubmitter {
    store: Arc<dyn PaymentEntryStore>,
    policy: TransferMethodPolicy,
    authorizer: Arc<dyn PaymentAuthorizer>,
    progress: ProgressTracker,
    limits: BulkLimits,
    job_tx: mpsc::Sender<BulkSubmitJob>,
}

impl BulkSubmitter {
    pub fn new(
        store: Arc<dyn PaymentEntryStore>,
        policy: TransferMethodPolicy,
        authorizer: Arc<dyn PaymentAuthorizer>,
        progress: ProgressTracker,
        limits: BulkLimits,
        job_tx: mpsc::Sender<BulkSubmitJob>,
    ) -> Self {
        Self {
            store,
            policy,
            authorizer,
            progress,
            limits,
            job_tx,
        }
    }

    /// Gate on authorization and size, then run inline or enqueue.
    pub async fn dispatch(&self, mut job: BulkSubmitJob) -> Result<BulkDispatch, AppError> {
        ensure_payment_authorized(self.authorizer.as_ref(), &job.auth_id, &job.docnames, true)
            .await?;

        let total = job.docnames.len();

        if total > self.limits.max_batch_size {
            metrics::counter!("bulk_dispatch_total", "mode" => "rejected").increment(1);
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Bulk operations only support up to {} documents.",
                self.limits.max_batch_size
            )));
        }

        if total < self.limits.sync_threshold {
            metrics::counter!("bulk_dispatch_total", "mode" => "sync").increment(1);
            let failed = self.run_batch(job).await;
            return Ok(BulkDispatch::Completed { failed });
        }

        let task_id = job
            .task_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        // Register the task before handing the job over so the caller can
        // poll progress the moment the response lands.
        self.progress.begin(&task_id, total);

        if self.job_tx.try_send(job).is_err() {
            self.progress.forget(&task_id);
            tracing::error!(task_id = %task_id, "Submission queue is full");
            return Err(AppError::ServiceUnavailable);
        }

        metrics::counter!("bulk_dispatch_total", "mode" => "queued").increment(1);
        tracing::info!(
            task_id = %task_id,
            documents = total,
            "Bulk operation is enqueued in background"
        );

        Ok(BulkDispatch::Queued { task_id })
    }

    /// Process every document in input order, collecting failures without
    /// aborting the batch.
    pub async fn run_batch(&self, job: BulkSubmitJob) -> Vec<String> {
        let total = job.docnames.len();

        if let Some(task_id) = &job.task_id {
            if !self.progress.is_known(task_id) {
                self.progress.begin(task_id, total);
            }
        }

        let mut failed = Vec::new();

        for (position, docname) in job.docnames.iter().enumerate() {
            let message = match self.process_one(docname, &job).await {
                ItemOutcome::Submitted(message) => {
                    metrics::counter!("payment_entry_submissions_total", "outcome" => "submitted")
                        .increment(1);
                    message
                }
                ItemOutcome::Skipped => {
                    metrics::counter!("payment_entry_submissions_total", "outcome" => "skipped")
                        .increment(1);
                    tracing::info!(entry = %docname, "Skipping Payment Entry not in draft state");
                    failed.push(docname.clone());
                    ""
                }
                ItemOutcome::Failed(reason) => {
                    metrics::counter!("payment_entry_submissions_total", "outcome" => "failed")
                        .increment(1);
                    tracing::warn!(
                        entry = %docname,
                        reason = %reason,
                        "Payment Entry failed in bulk submit"
                    );
                    failed.push(docname.clone());
                    ""
                }
            };

            if let Some(task_id) = &job.task_id {
                self.progress.publish(
                    task_id,
                    (position + 1) as f64 / total as f64 * 100.0,
                    message,
                    docname,
                );
            }
        }

        if let Some(task_id) = &job.task_id {
            self.progress.finish(task_id, &failed);
        }

        failed
    }

    async fn process_one(&self, docname: &str, job: &BulkSubmitJob) -> ItemOutcome {
        let mut entry = match self.store.load(docname).await {
            Ok(entry) => entry,
            Err(error) => return ItemOutcome::Failed(error.to_string()),
        };

        if job.mark_online_payment {
            entry.make_bank_online_payment = true;
        }

        if !entry.docstatus.is_draft() {
            return ItemOutcome::Skipped;
        }

        if let Err(error) = self.policy.validate(&mut entry).await {
            return ItemOutcome::Failed(format!("{}: {}", error.title(), error));
        }

        if entry.already_paid {
            tracing::info!(
                entry = %docname,
                "Already paid through the original; submitting without a new payout"
            );
        }

        let queue =
            self.store.prefers_queued_submission() && self.store.scheduler_active().await;

        let result = if queue {
            self.store.queue_submission(&entry, &job.auth_id).await
        } else {
            self.store.submit(&entry, &job.auth_id).await
        };

        match result {
            Ok(()) if queue => ItemOutcome::Submitted("Queuing Payment Entry for Submission"),
            Ok(()) => ItemOutcome::Submitted("Submitting Payment Entry"),
            Err(error) => ItemOutcome::Failed(error.to_string()),
        }
    }
}
