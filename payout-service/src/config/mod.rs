use secrecy::Secret;
use serde::Deserialize;
use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct PayoutConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub erp: ErpConfig,
    pub ifsc: IfscConfig,
    pub bulk: BulkConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErpConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: Secret<String>,
    /// Route submissions through the host's deferred queue when its
    /// scheduler is active.
    pub queued_submission: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IfscConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkConfig {
    /// Batches below this size run inline.
    pub sync_threshold: usize,
    /// Batches above this size are rejected.
    pub max_batch_size: usize,
    /// Bound of the background job channel.
    pub queue_size: usize,
    /// Host fields outside the fixed payout schema that must also stay
    /// frozen once the original document is paid.
    pub extra_payout_fields: Vec<String>,
}

impl PayoutConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = is_production();

        Ok(PayoutConfig {
            common,
            erp: ErpConfig {
                base_url: get_env("ERP_BASE_URL", Some("http://localhost:8000"), is_prod)?,
                api_key: get_env("ERP_API_KEY", Some(""), is_prod)?,
                api_secret: Secret::new(get_env("ERP_API_SECRET", Some(""), is_prod)?),
                queued_submission: parse_env("ERP_QUEUED_SUBMISSION", false),
                enabled: parse_env("ERP_ENABLED", false),
            },
            ifsc: IfscConfig {
                base_url: get_env("IFSC_BASE_URL", Some("https://ifsc.razorpay.com"), is_prod)?,
            },
            bulk: BulkConfig {
                sync_threshold: parse_env("BULK_SYNC_THRESHOLD", 20),
                max_batch_size: parse_env("BULK_MAX_BATCH_SIZE", 500),
                queue_size: parse_env("BULK_QUEUE_SIZE", 64),
                extra_payout_fields: env::var("EXTRA_PAYOUT_FIELDS")
                    .map(|raw| {
                        raw.split(',')
                            .map(str::trim)
                            .filter(|field| !field.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
