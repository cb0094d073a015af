use payout_service::config::{BulkConfig, ErpConfig, IfscConfig, PayoutConfig};
use payout_service::models::{PartyType, PaymentEntry, PaymentType, TransferMethod};
use payout_service::services::auth::StaticAuthorizer;
use payout_service::services::contacts::InMemoryContactDirectory;
use payout_service::services::documents::InMemoryEntryStore;
use payout_service::services::ifsc::InMemoryBankDirectory;
use payout_service::startup::{Application, Collaborators};
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;

#[allow(dead_code)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<InMemoryEntryStore>,
    pub contacts: Arc<InMemoryContactDirectory>,
    pub bank_codes: Arc<InMemoryBankDirectory>,
    pub authorizer: Arc<StaticAuthorizer>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let config = PayoutConfig {
            common: CoreConfig { port: 0 },
            erp: ErpConfig {
                base_url: "http://erp.invalid".to_string(),
                api_key: "test-key".to_string(),
                api_secret: Secret::new("test-secret".to_string()),
                queued_submission: false,
                enabled: false,
            },
            ifsc: IfscConfig {
                base_url: "http://ifsc.invalid".to_string(),
            },
            bulk: BulkConfig {
                sync_threshold: 20,
                max_batch_size: 500,
                queue_size: 16,
                extra_payout_fields: Vec::new(),
            },
        };

        let store = Arc::new(InMemoryEntryStore::new());
        let contacts = Arc::new(InMemoryContactDirectory::new());
        let bank_codes = Arc::new(InMemoryBankDirectory::new());
        let authorizer = Arc::new(StaticAuthorizer::new(false));

        let collaborators = Collaborators {
            store: store.clone(),
            contacts: contacts.clone(),
            bank_codes: bank_codes.clone(),
            authorizer: authorizer.clone(),
        };

        let app = Application::build_with(config, collaborators)
            .await
            .expect("failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.http_port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            client,
            store,
            contacts,
            bank_codes,
            authorizer,
        }
    }

    /// Seed `count` submit-ready drafts and return their names.
    #[allow(dead_code)]
    pub fn seed_draft_entries(&self, count: usize) -> Vec<String> {
        (1..=count)
            .map(|i| {
                let name = format!("ACC-PAY-2024-{:05}", i);
                self.store.put(upi_draft(&name));
                name
            })
            .collect()
    }
}

/// A draft that passes UPI validation without external lookups.
#[allow(dead_code)]
pub fn upi_draft(name: &str) -> PaymentEntry {
    PaymentEntry {
        name: name.to_string(),
        payment_type: Some(PaymentType::Pay),
        party_type: Some(PartyType::Supplier),
        party: Some("SUP-0001".to_string()),
        make_bank_online_payment: true,
        payment_transfer_method: TransferMethod::Upi,
        party_bank_account: Some("Creditor account - SUP-0001".to_string()),
        party_upi_id: Some("supplier@upi".to_string()),
        paid_amount: 1_000.0,
        integration_doctype: Some("Bank Payout".to_string()),
        integration_docname: Some(format!("PO-{}", name)),
        ..PaymentEntry::default()
    }
}
