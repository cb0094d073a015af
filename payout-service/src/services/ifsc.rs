//! Bank routing-code validation against the public IFSC directory.

use async_trait::async_trait;
use dashmap::DashSet;
use reqwest::StatusCode;
use service_core::error::AppError;

#[async_trait]
pub trait BankCodeDirectory: Send + Sync {
    /// True when the code exists in the directory.
    async fn lookup(&self, ifsc: &str) -> Result<bool, AppError>;
}

/// Client for the public IFSC directory.
///
/// `GET {base}/{code}` answers 200 for a known code and 404 for an unknown
/// one; anything else counts as a directory outage.
#[derive(Clone)]
pub struct IfscClient {
    client: reqwest::Client,
    base_url: String,
}

impl IfscClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BankCodeDirectory for IfscClient {
    async fn lookup(&self, ifsc: &str) -> Result<bool, AppError> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(ifsc)
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::BadGateway(format!("IFSC directory unreachable: {}", e))
        })?;

        let status = response.status();
        tracing::debug!(ifsc = %ifsc, status = %status, "IFSC directory lookup");

        match status {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(AppError::BadGateway(format!(
                "IFSC directory returned {} for {}",
                other, ifsc
            ))),
        }
    }
}

/// In-memory directory holding known-good codes, for tests and offline runs.
#[derive(Default)]
pub struct InMemoryBankDirectory {
    codes: DashSet<String>,
}

impl InMemoryBankDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, ifsc: &str) {
        self.codes.insert(ifsc.to_string());
    }
}

#[async_trait]
impl BankCodeDirectory for InMemoryBankDirectory {
    async fn lookup(&self, ifsc: &str) -> Result<bool, AppError> {
        Ok(self.codes.contains(ifsc))
    }
}

/// Check an IFSC code, optionally failing the caller when it is unknown.
pub async fn validate_ifsc_code(
    directory: &dyn BankCodeDirectory,
    ifsc: &str,
    throw: bool,
) -> Result<bool, AppError> {
    let found = directory.lookup(ifsc).await?;

    if !found && throw {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid IFSC Code: {}",
            ifsc
        )));
    }

    Ok(found)
}
