//! REST client for the ERP host that owns the Payment Entry documents.

use crate::config::ErpConfig;
use crate::models::{PaymentEntry, PayoutField};
use crate::services::auth::PaymentAuthorizer;
use crate::services::contacts::{ContactDetails, ContactDirectory};
use crate::services::documents::PaymentEntryStore;
use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use service_core::error::AppError;

/// Client for the companion REST surface on the ERP host.
///
/// Authenticates with the host's `token key:secret` header scheme. One
/// client serves as document store, contact directory, and payment
/// authorizer since all three live behind the same API.
#[derive(Clone)]
pub struct ErpClient {
    client: reqwest::Client,
    config: ErpConfig,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct SchedulerStatus {
    active: bool,
}

#[derive(Debug, Deserialize)]
struct VerifyOutcome {
    authorized: bool,
}

impl ErpClient {
    pub fn new(config: ErpConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty() && !self.config.api_secret.expose_secret().is_empty()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn entry_path(&self, name: &str, suffix: &str) -> String {
        self.url(&format!(
            "/api/payment-entries/{}{}",
            urlencoding::encode(name),
            suffix
        ))
    }

    fn auth_header(&self) -> String {
        format!(
            "token {}:{}",
            self.config.api_key,
            self.config.api_secret.expose_secret()
        )
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AppError> {
        let response = request
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::BadGateway(format!("ERP host unreachable: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::BadGateway(format!("ERP host read failed: {}", e)))?;

        tracing::debug!(status = %status, "ERP host response");

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "ERP host has no such record"
            )));
        }

        if !status.is_success() {
            return Err(AppError::BadGateway(format!(
                "ERP host returned {}",
                status
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::BadGateway(format!("ERP host sent a malformed response: {}", e)))
    }
}

#[async_trait]
impl PaymentEntryStore for ErpClient {
    async fn load(&self, name: &str) -> Result<PaymentEntry, AppError> {
        let envelope: DataEnvelope<PaymentEntry> = self
            .execute(self.client.get(self.entry_path(name, "")))
            .await
            .map_err(|error| match error {
                AppError::NotFound(_) => {
                    AppError::NotFound(anyhow::anyhow!("Payment Entry {} not found", name))
                }
                other => other,
            })?;

        Ok(envelope.data)
    }

    async fn update_fields(
        &self,
        name: &str,
        fields: &[(PayoutField, Value)],
    ) -> Result<(), AppError> {
        let mut body = Map::new();
        for (field, value) in fields {
            body.insert(field.as_str().to_string(), value.clone());
        }

        let _: DataEnvelope<Value> = self
            .execute(
                self.client
                    .patch(self.entry_path(name, ""))
                    .json(&Value::Object(body)),
            )
            .await?;

        Ok(())
    }

    async fn submit(&self, entry: &PaymentEntry, auth_id: &str) -> Result<(), AppError> {
        let _: DataEnvelope<Value> = self
            .execute(
                self.client
                    .post(self.entry_path(&entry.name, "/submit"))
                    .json(&json!({ "auth_id": auth_id, "doc": entry })),
            )
            .await?;

        Ok(())
    }

    async fn queue_submission(&self, entry: &PaymentEntry, auth_id: &str) -> Result<(), AppError> {
        let _: DataEnvelope<Value> = self
            .execute(
                self.client
                    .post(self.entry_path(&entry.name, "/queue-submission"))
                    .json(&json!({ "auth_id": auth_id, "doc": entry })),
            )
            .await?;

        Ok(())
    }

    fn prefers_queued_submission(&self) -> bool {
        self.config.queued_submission
    }

    async fn scheduler_active(&self) -> bool {
        // Advisory only. An unreachable scheduler endpoint falls back to
        // direct submission, which surfaces its own errors per document.
        let result: Result<DataEnvelope<SchedulerStatus>, AppError> = self
            .execute(self.client.get(self.url("/api/scheduler/status")))
            .await;

        match result {
            Ok(envelope) => envelope.data.active,
            Err(error) => {
                tracing::warn!(error = %error, "Scheduler status unavailable, submitting directly");
                false
            }
        }
    }
}

#[async_trait]
impl ContactDirectory for ErpClient {
    async fn employee_contact(&self, employee: &str) -> Result<ContactDetails, AppError> {
        let result: Result<DataEnvelope<ContactDetails>, AppError> = self
            .execute(self.client.get(self.url(&format!(
                "/api/employees/{}/contact",
                urlencoding::encode(employee)
            ))))
            .await;

        match result {
            Ok(envelope) => Ok(envelope.data),
            Err(AppError::NotFound(_)) => Ok(ContactDetails::default()),
            Err(other) => Err(other),
        }
    }

    async fn contact(&self, contact_person: &str) -> Result<ContactDetails, AppError> {
        let result: Result<DataEnvelope<ContactDetails>, AppError> = self
            .execute(self.client.get(self.url(&format!(
                "/api/contacts/{}",
                urlencoding::encode(contact_person)
            ))))
            .await;

        match result {
            Ok(envelope) => Ok(envelope.data),
            Err(AppError::NotFound(_)) => Ok(ContactDetails::default()),
            Err(other) => Err(other),
        }
    }
}

#[async_trait]
impl PaymentAuthorizer for ErpClient {
    async fn verify(&self, auth_id: &str, docnames: &[String]) -> Result<bool, AppError> {
        let envelope: DataEnvelope<VerifyOutcome> = self
            .execute(
                self.client
                    .post(self.url("/api/authorizations/verify"))
                    .json(&json!({ "auth_id": auth_id, "docnames": docnames })),
            )
            .await?;

        Ok(envelope.data.authorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocStatus;
    use secrecy::Secret;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> ErpConfig {
        ErpConfig {
            base_url,
            api_key: "api-key".to_string(),
            api_secret: Secret::new("api-secret".to_string()),
            queued_submission: false,
            enabled: true,
        }
    }

    #[tokio::test]
    async fn load_sends_token_auth_and_parses_the_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/payment-entries/ACC-PAY-2024-00001"))
            .and(header("authorization", "token api-key:api-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "name": "ACC-PAY-2024-00001",
                    "docstatus": 0,
                    "make_bank_online_payment": 1,
                    "payment_transfer_method": "NEFT",
                    "paid_amount": 1500.0
                }
            })))
            .mount(&server)
            .await;

        let client = ErpClient::new(test_config(server.uri()));
        let entry = client.load("ACC-PAY-2024-00001").await.expect("load");

        assert_eq!(entry.name, "ACC-PAY-2024-00001");
        assert_eq!(entry.docstatus, DocStatus::Draft);
        assert!(entry.make_bank_online_payment);
        assert_eq!(entry.paid_amount, 1500.0);
    }

    #[tokio::test]
    async fn load_maps_missing_documents_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ErpClient::new(test_config(server.uri()));
        let error = client.load("ACC-PAY-2024-00404").await.expect_err("must fail");

        assert!(matches!(&error, AppError::NotFound(_)));
        assert!(error.to_string().contains("ACC-PAY-2024-00404"));
    }

    #[tokio::test]
    async fn submit_posts_the_document_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payment-entries/ACC-PAY-2024-00001/submit"))
            .and(body_partial_json(serde_json::json!({
                "auth_id": "otp-1",
                "doc": { "name": "ACC-PAY-2024-00001" }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": {} })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ErpClient::new(test_config(server.uri()));
        let entry = PaymentEntry {
            name: "ACC-PAY-2024-00001".to_string(),
            ..PaymentEntry::default()
        };

        client.submit(&entry, "otp-1").await.expect("submit");
    }

    #[tokio::test]
    async fn host_errors_become_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ErpClient::new(test_config(server.uri()));
        let error = client.load("ACC-PAY-2024-00001").await.expect_err("must fail");

        assert!(matches!(error, AppError::BadGateway(_)));
    }

    #[tokio::test]
    async fn missing_contacts_resolve_to_empty_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/contacts/Missing%20Person"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ErpClient::new(test_config(server.uri()));
        let details = client.contact("Missing Person").await.expect("lookup");

        assert!(details.is_empty());
    }
}
