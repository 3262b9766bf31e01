//! Route handlers.
//!
//! Store-backed operations run on the blocking pool: SQLite calls and
//! Argon2/AES work must not stall the async workers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::errors::{ErrorKind, VaultError};
use crate::generator::GenerationPolicy;
use crate::service::api::{
    CreateCredentialRequest, CredentialResponse, GenerateResponse, HealthResponse,
    MessageResponse, PasswordRequest, RevealResponse, StrengthResponse, UpdateCredentialRequest,
};
use crate::strength::PasswordValidation;
use crate::vault::{CredentialId, CredentialMetadata};

use super::AppState;

/// Error body: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A `VaultError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub VaultError);

impl From<VaultError> for ApiError {
    fn from(e: VaultError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "malformed request body");
        Self(VaultError::Validation("Invalid JSON body".into()))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self(VaultError::CommandFailed(format!("blocking task failed: {e}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.0.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        message: "Credential vault API is running".into(),
    })
}

/// Unknown paths.
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Endpoint not found".into(),
        }),
    )
}

/// GET /api/passwords
pub async fn list_credentials(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Vec<CredentialMetadata>>> {
    let service = state.service.clone();
    let list = tokio::task::spawn_blocking(move || service.list(&caller)).await??;
    Ok(Json(list))
}

/// POST /api/passwords
pub async fn create_credential(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Result<Json<CreateCredentialRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CredentialResponse>)> {
    let Json(request) = body?;
    let service = state.service.clone();
    let credential =
        tokio::task::spawn_blocking(move || service.create(&caller, request)).await??;
    Ok((
        StatusCode::CREATED,
        Json(CredentialResponse {
            message: "Password added successfully".into(),
            credential,
        }),
    ))
}

/// GET /api/passwords/{id}
pub async fn reveal_credential(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Json<RevealResponse>> {
    let service = state.service.clone();
    let id = CredentialId::from(id);
    let password = tokio::task::spawn_blocking(move || service.reveal(&caller, &id)).await??;
    Ok(Json(RevealResponse { password }))
}

/// PUT /api/passwords/{id}
pub async fn update_credential(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCredentialRequest>, JsonRejection>,
) -> ApiResult<Json<CredentialResponse>> {
    let Json(request) = body?;
    let service = state.service.clone();
    let id = CredentialId::from(id);
    let credential =
        tokio::task::spawn_blocking(move || service.update(&caller, &id, request)).await??;
    Ok(Json(CredentialResponse {
        message: "Password updated successfully".into(),
        credential,
    }))
}

/// DELETE /api/passwords/{id}
pub async fn delete_credential(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let service = state.service.clone();
    let id = CredentialId::from(id);
    tokio::task::spawn_blocking(move || service.delete(&caller, &id)).await??;
    Ok(Json(MessageResponse::new("Password deleted successfully")))
}

/// POST /api/passwords/generate
///
/// A request without a JSON body generates with the default policy.
pub async fn generate_password(
    State(state): State<AppState>,
    body: Result<Json<GenerationPolicy>, JsonRejection>,
) -> ApiResult<Json<GenerateResponse>> {
    let policy = match body {
        Ok(Json(policy)) => policy,
        Err(JsonRejection::MissingJsonContentType(_)) => GenerationPolicy::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    Ok(Json(state.service.generate(&policy)?))
}

/// POST /api/passwords/strength
pub async fn check_strength(
    State(state): State<AppState>,
    body: Result<Json<PasswordRequest>, JsonRejection>,
) -> ApiResult<Json<StrengthResponse>> {
    let Json(request) = body?;
    let password = request.into_password()?;
    Ok(Json(StrengthResponse {
        strength: state.service.check_strength(&password),
    }))
}

/// POST /api/passwords/validate
pub async fn validate_password(
    State(state): State<AppState>,
    body: Result<Json<PasswordRequest>, JsonRejection>,
) -> ApiResult<Json<PasswordValidation>> {
    let Json(request) = body?;
    let password = request.into_password()?;
    Ok(Json(state.service.validate(&password)))
}
