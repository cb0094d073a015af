use async_trait::async_trait;
use dashmap::DashMap;
use service_core::error::AppError;
use std::collections::HashSet;

/// Verifies that a previously issued authentication token still covers the
/// documents a payment action wants to touch. Issuing the token (OTP or
/// password challenge) is the host's job.
#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    async fn verify(&self, auth_id: &str, docnames: &[String]) -> Result<bool, AppError>;
}

/// In-memory authorizer with per-token grants.
pub struct StaticAuthorizer {
    allow_by_default: bool,
    grants: DashMap<String, HashSet<String>>,
}

impl StaticAuthorizer {
    /// `allow_by_default` decides tokens without explicit grants; the
    /// permissive form stands in when no ERP host is configured.
    pub fn new(allow_by_default: bool) -> Self {
        Self {
            allow_by_default,
            grants: DashMap::new(),
        }
    }

    /// Grant `auth_id` access to the given documents.
    pub fn allow(&self, auth_id: &str, docnames: &[&str]) {
        self.grants
            .entry(auth_id.to_string())
            .or_default()
            .extend(docnames.iter().map(|name| name.to_string()));
    }
}

#[async_trait]
impl PaymentAuthorizer for StaticAuthorizer {
    async fn verify(&self, auth_id: &str, docnames: &[String]) -> Result<bool, AppError> {
        match self.grants.get(auth_id) {
            Some(granted) => Ok(docnames.iter().all(|name| granted.contains(name))),
            None => Ok(self.allow_by_default),
        }
    }
}

/// Gate a payment action on `auth_id` covering every target document.
///
/// With `throw` a refusal becomes a hard permission error naming the
/// targets, used before any bulk document is touched. Without it the caller
/// just gets the boolean, which is what the on-load probe wants.
pub async fn ensure_payment_authorized(
    authorizer: &dyn PaymentAuthorizer,
    auth_id: &str,
    docnames: &[String],
    throw: bool,
) -> Result<bool, AppError> {
    let authorized = authorizer.verify(auth_id, docnames).await?;

    if !authorized && throw {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Payment action is not authorized for: {}",
            docnames.join(", ")
        )));
    }

    Ok(authorized)
}
