//! HTTP handlers for pass issuance.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::PassApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;
use crate::application::handlers::IssuePassCommand;
use crate::domain::foundation::GymId;
use crate::domain::pass::{PassError, PassKind};

use super::dto::{IssuePassRequest, PassResponse};

/// POST /passes - Issue a 24-hour pass for the caller.
pub async fn issue_pass(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    body: Result<Json<IssuePassRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PassApiError> {
    let Json(request) =
        body.map_err(|rejection| PassError::validation("body", rejection.body_text()))?;

    let gym_id = request
        .gym_id
        .map(GymId::new)
        .ok_or_else(|| PassError::validation("gymId", "is required"))?;
    let kind = if request.guest {
        PassKind::Guest
    } else {
        PassKind::Member
    };

    let result = state
        .issue_pass
        .handle(IssuePassCommand {
            caller,
            gym_id,
            kind,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PassResponse::from(result))))
}
