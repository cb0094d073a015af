use crate::dtos::{
    AuthorizationCheckResponse, AuthorizationQuery, BulkPayAndSubmitRequest,
    BulkPayAndSubmitResponse, TaskProgressResponse,
};
use crate::services::auth::ensure_payment_authorized;
use crate::services::bulk::{BulkDispatch, BulkSubmitJob};
use crate::startup::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use service_core::error::AppError;
use validator::Validate;

/// Pay and submit a set of Payment Entries in one call.
///
/// Small batches answer 200 with final results; larger ones answer 202 and
/// report through the task progress endpoint.
#[tracing::instrument(skip(state, request))]
pub async fn bulk_pay_and_submit(
    State(state): State<AppState>,
    Json(request): Json<BulkPayAndSubmitRequest>,
) -> Result<(StatusCode, Json<BulkPayAndSubmitResponse>), AppError> {
    request.validate()?;

    let job = BulkSubmitJob {
        auth_id: request.auth_id,
        docnames: request.docnames,
        mark_online_payment: request.mark_online_payment,
        task_id: request.task_id,
    };

    match state.submitter.dispatch(job).await? {
        BulkDispatch::Completed { failed } => Ok((
            StatusCode::OK,
            Json(BulkPayAndSubmitResponse::Completed { failed }),
        )),
        BulkDispatch::Queued { task_id } => Ok((
            StatusCode::ACCEPTED,
            Json(BulkPayAndSubmitResponse::Queued {
                task_id,
                message: "Bulk operation is enqueued in background.".to_string(),
            }),
        )),
    }
}

/// Tell a form on load whether `auth_id` already covers this entry.
#[tracing::instrument(skip(state))]
pub async fn check_authorization(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<AuthorizationQuery>,
) -> Result<Json<AuthorizationCheckResponse>, AppError> {
    let authorized = ensure_payment_authorized(
        state.authorizer.as_ref(),
        &query.auth_id,
        std::slice::from_ref(&name),
        false,
    )
    .await?;

    Ok(Json(AuthorizationCheckResponse { name, authorized }))
}

/// Progress snapshot for a queued bulk task.
#[tracing::instrument(skip(state))]
pub async fn task_progress(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskProgressResponse>, AppError> {
    let progress = state
        .progress
        .snapshot(&task_id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Unknown task: {}", task_id)))?;

    Ok(Json(TaskProgressResponse { task_id, progress }))
}
