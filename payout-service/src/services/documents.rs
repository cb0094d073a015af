use crate::models::{DocStatus, PaymentEntry, PayoutField};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Access to Payment Entry documents owned by the host.
///
/// `submit` and `queue_submission` are the transactional units: they either
/// fully persist the transition or leave the document untouched.
#[async_trait]
pub trait PaymentEntryStore: Send + Sync {
    async fn load(&self, name: &str) -> Result<PaymentEntry, AppError>;

    /// Write fields straight to storage without a full save cycle.
    async fn update_fields(
        &self,
        name: &str,
        fields: &[(PayoutField, serde_json::Value)],
    ) -> Result<(), AppError>;

    /// Persist the entry and move it to Submitted, recording who authorized
    /// the payment.
    async fn submit(&self, entry: &PaymentEntry, auth_id: &str) -> Result<(), AppError>;

    /// Hand the submission to the host's deferred submission queue.
    async fn queue_submission(&self, entry: &PaymentEntry, auth_id: &str) -> Result<(), AppError>;

    /// Host preference for routing submissions through the deferred queue.
    fn prefers_queued_submission(&self) -> bool;

    /// Whether the host scheduler is currently draining that queue.
    async fn scheduler_active(&self) -> bool;
}

/// In-memory store used in tests and when no ERP host is configured.
#[derive(Default)]
pub struct InMemoryEntryStore {
    entries: DashMap<String, PaymentEntry>,
    queued: DashSet<String>,
    prefers_queue: AtomicBool,
    scheduler_active: AtomicBool,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, entry: PaymentEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &str) -> Option<PaymentEntry> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Names handed to the deferred queue, in no particular order.
    pub fn queued_names(&self) -> Vec<String> {
        self.queued.iter().map(|name| name.key().clone()).collect()
    }

    pub fn set_prefers_queued_submission(&self, value: bool) {
        self.prefers_queue.store(value, Ordering::Relaxed);
    }

    pub fn set_scheduler_active(&self, value: bool) {
        self.scheduler_active.store(value, Ordering::Relaxed);
    }
}

#[async_trait]
impl PaymentEntryStore for InMemoryEntryStore {
    async fn load(&self, name: &str) -> Result<PaymentEntry, AppError> {
        self.entries
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payment Entry {} not found", name)))
    }

    async fn update_fields(
        &self,
        name: &str,
        fields: &[(PayoutField, serde_json::Value)],
    ) -> Result<(), AppError> {
        let mut entry = self.entries.get_mut(name).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Payment Entry {} not found", name))
        })?;

        for (field, value) in fields {
            field.apply(&mut entry, value);
        }

        Ok(())
    }

    async fn submit(&self, entry: &PaymentEntry, auth_id: &str) -> Result<(), AppError> {
        let mut stored = self.entries.get_mut(&entry.name).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Payment Entry {} not found", entry.name))
        })?;

        if !stored.docstatus.is_draft() {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Payment Entry {} is not in draft state",
                entry.name
            )));
        }

        *stored = entry.clone();
        stored.docstatus = DocStatus::Submitted;
        stored.payment_authorized_by = Some(auth_id.to_string());

        Ok(())
    }

    async fn queue_submission(&self, entry: &PaymentEntry, _auth_id: &str) -> Result<(), AppError> {
        if !self.entries.contains_key(&entry.name) {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Payment Entry {} not found",
                entry.name
            )));
        }

        self.queued.insert(entry.name.clone());

        Ok(())
    }

    fn prefers_queued_submission(&self) -> bool {
        self.prefers_queue.load(Ordering::Relaxed)
    }

    async fn scheduler_active(&self) -> bool {
        self.scheduler_active.load(Ordering::Relaxed)
    }
}
