//! Application wiring and server lifecycle.

use crate::config::PayoutConfig;
use crate::handlers;
use crate::services::auth::{PaymentAuthorizer, StaticAuthorizer};
use crate::services::bulk::{BulkLimits, BulkSubmitter};
use crate::services::contacts::{ContactDirectory, InMemoryContactDirectory};
use crate::services::documents::{InMemoryEntryStore, PaymentEntryStore};
use crate::services::erp::ErpClient;
use crate::services::ifsc::{BankCodeDirectory, IfscClient};
use crate::services::metrics::get_metrics;
use crate::services::policy::TransferMethodPolicy;
use crate::services::progress::ProgressTracker;
use crate::workers::SubmissionWorker;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// External capabilities the service runs against.
pub struct Collaborators {
    pub store: Arc<dyn PaymentEntryStore>,
    pub contacts: Arc<dyn ContactDirectory>,
    pub bank_codes: Arc<dyn BankCodeDirectory>,
    pub authorizer: Arc<dyn PaymentAuthorizer>,
}

impl Collaborators {
    /// Wire against the configured ERP host, or fall back to in-memory
    /// implementations when it is disabled.
    pub fn from_config(config: &PayoutConfig) -> Self {
        let bank_codes: Arc<dyn BankCodeDirectory> =
            Arc::new(IfscClient::new(config.ifsc.base_url.clone()));

        if config.erp.enabled {
            let erp = Arc::new(ErpClient::new(config.erp.clone()));
            if erp.is_configured() {
                tracing::info!("ERP host client initialized");
            } else {
                tracing::warn!("ERP credentials not configured, host calls will be rejected");
            }

            Self {
                store: erp.clone(),
                contacts: erp.clone(),
                bank_codes,
                authorizer: erp,
            }
        } else {
            tracing::warn!("ERP host disabled, using permissive in-memory collaborators");

            Self {
                store: Arc::new(InMemoryEntryStore::new()),
                contacts: Arc::new(InMemoryContactDirectory::new()),
                bank_codes,
                authorizer: Arc::new(StaticAuthorizer::new(true)),
            }
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: PayoutConfig,
    pub authorizer: Arc<dyn PaymentAuthorizer>,
    pub submitter: Arc<BulkSubmitter>,
    pub progress: ProgressTracker,
}

/// Application container managing the server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    shutdown_token: CancellationToken,
}

impl Application {
    /// Build with collaborators picked from configuration.
    pub async fn build(config: PayoutConfig) -> Result<Self, AppError> {
        let collaborators = Collaborators::from_config(&config);
        Self::build_with(config, collaborators).await
    }

    /// Build against explicit collaborators. Tests use this to seed the
    /// in-memory implementations before spawning the server.
    pub async fn build_with(
        config: PayoutConfig,
        collaborators: Collaborators,
    ) -> Result<Self, AppError> {
        let progress = ProgressTracker::new();

        let policy = TransferMethodPolicy::new(
            collaborators.store.clone(),
            collaborators.bank_codes.clone(),
            collaborators.contacts.clone(),
            config.bulk.extra_payout_fields.clone(),
        );

        let (worker, job_tx, shutdown_token) = SubmissionWorker::new(&config.bulk);

        let submitter = Arc::new(BulkSubmitter::new(
            collaborators.store.clone(),
            policy,
            collaborators.authorizer.clone(),
            progress.clone(),
            BulkLimits {
                sync_threshold: config.bulk.sync_threshold,
                max_batch_size: config.bulk.max_batch_size,
            },
            job_tx,
        ));

        worker.start(submitter.clone());

        let state = AppState {
            config: config.clone(),
            authorizer: collaborators.authorizer,
            submitter,
            progress,
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics_endpoint))
            .route(
                "/payment-entries/bulk-pay-and-submit",
                post(handlers::payouts::bulk_pay_and_submit),
            )
            .route(
                "/payment-entries/:name/authorization",
                get(handlers::payouts::check_authorization),
            )
            .route(
                "/tasks/:task_id/progress",
                get(handlers::payouts::task_progress),
            )
            .layer(from_fn(metrics_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .layer(from_fn(request_id_middleware))
            .with_state(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
            shutdown_token,
        })
    }

    pub fn http_port(&self) -> u16 {
        self.port
    }

    /// Serve until the listener fails or the process is stopped.
    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        tracing::info!(port = self.port, "Payout service listening");

        let result = axum::serve(self.listener, self.router).await;

        self.shutdown_token.cancel();

        result.map_err(AppError::from)
    }
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "payout-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
