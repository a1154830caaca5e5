//! HTTP API server for the Attest node.
//!
//! Serves the read side of the directory, ledger and aggregator, plus
//! signature-gated registration of verification results.

use attest_core::{Principal, Verification, VerificationId, VerificationResult, VerifierInfo};
use attest_crypto::{RecoverableSignature, TypedDataDomain};
use attest_registry::{RegistryError, SourceRef};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::state::AppState;

// --- Response types ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifierResponse {
    pub principal: Principal,
    #[serde(flatten)]
    pub info: VerifierInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifiersResponse {
    pub verifiers: Vec<VerifierResponse>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationsResponse {
    pub verifications: Vec<Verification>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifiedResponse {
    pub subject: Principal,
    pub verified: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterVerificationRequest {
    pub result: VerificationResult,
    /// Hex-encoded signer public key followed by the signature.
    pub signature: RecoverableSignature,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SourcesResponse {
    pub requirement: String,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequirementVerifiedResponse {
    pub requirement: String,
    pub subject: Principal,
    pub verified: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn registry_error(e: RegistryError) -> ApiError {
    let status = match &e {
        _ if e.is_not_found() => StatusCode::NOT_FOUND,
        RegistryError::InvalidSignature => StatusCode::UNAUTHORIZED,
        RegistryError::Unauthorized(_) => StatusCode::FORBIDDEN,
        RegistryError::AlreadyExists(_) | RegistryError::SigningKeyInUse { .. } => {
            StatusCode::CONFLICT
        }
        _ => StatusCode::BAD_REQUEST,
    };
    error_response(status, e)
}

fn parse_principal(raw: &str) -> Result<Principal, ApiError> {
    raw.parse::<Principal>()
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e))
}

fn verifications(list: Vec<Verification>) -> Json<VerificationsResponse> {
    let count = list.len();
    Json(VerificationsResponse {
        verifications: list,
        count,
    })
}

// --- Handlers ---

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn handle_domain(State(state): State<Arc<AppState>>) -> Json<TypedDataDomain> {
    Json(state.ledger.domain().clone())
}

async fn handle_list_verifiers(State(state): State<Arc<AppState>>) -> Json<VerifiersResponse> {
    let verifiers: Vec<VerifierResponse> = state
        .directory
        .verifiers()
        .into_iter()
        .map(|(principal, info)| VerifierResponse { principal, info })
        .collect();
    let count = verifiers.len();
    Json(VerifiersResponse { verifiers, count })
}

async fn handle_get_verifier(
    State(state): State<Arc<AppState>>,
    Path(principal): Path<String>,
) -> Result<Json<VerifierResponse>, ApiError> {
    let principal = parse_principal(&principal)?;
    let info = state
        .directory
        .get_verifier(&principal)
        .map_err(registry_error)?;
    Ok(Json(VerifierResponse { principal, info }))
}

async fn handle_verifications_by_verifier(
    State(state): State<Arc<AppState>>,
    Path(principal): Path<String>,
) -> Result<Json<VerificationsResponse>, ApiError> {
    let principal = parse_principal(&principal)?;
    Ok(verifications(
        state.ledger.verifications_for_verifier(&principal),
    ))
}

async fn handle_verification_count(State(state): State<Arc<AppState>>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.ledger.verification_count(),
    })
}

async fn handle_get_verification(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<VerificationId>,
) -> Result<Json<Verification>, ApiError> {
    state
        .ledger
        .get_verification(uuid)
        .map(Json)
        .map_err(registry_error)
}

async fn handle_register_verification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterVerificationRequest>,
) -> Result<(StatusCode, Json<Verification>), ApiError> {
    // Stored subjects must stay addressable through the subject routes.
    parse_principal(req.result.subject.as_str())?;
    let record = state
        .ledger
        .register_verification(&req.result, &req.signature)
        .map_err(registry_error)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn handle_subject_verifications(
    State(state): State<Arc<AppState>>,
    Path(subject): Path<String>,
) -> Result<Json<VerificationsResponse>, ApiError> {
    let subject = parse_principal(&subject)?;
    Ok(verifications(state.ledger.verifications_for_subject(&subject)))
}

async fn handle_subject_verified(
    State(state): State<Arc<AppState>>,
    Path(subject): Path<String>,
) -> Result<Json<VerifiedResponse>, ApiError> {
    let subject = parse_principal(&subject)?;
    let verified = state.ledger.is_verified(&subject);
    Ok(Json(VerifiedResponse { subject, verified }))
}

async fn handle_requirement_sources(
    State(state): State<Arc<AppState>>,
    Path(requirement): Path<String>,
) -> Json<SourcesResponse> {
    let sources = state.aggregator.sources(&requirement);
    Json(SourcesResponse {
        requirement,
        sources,
    })
}

async fn handle_requirement_verified(
    State(state): State<Arc<AppState>>,
    Path((requirement, subject)): Path<(String, String)>,
) -> Result<Json<RequirementVerifiedResponse>, ApiError> {
    let subject = parse_principal(&subject)?;
    let verified = state.aggregator.is_verified(&requirement, &subject);
    Ok(Json(RequirementVerifiedResponse {
        requirement,
        subject,
        verified,
    }))
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/domain", get(handle_domain))
        .route("/api/v1/verifiers", get(handle_list_verifiers))
        .route("/api/v1/verifiers/{principal}", get(handle_get_verifier))
        .route(
            "/api/v1/verifiers/{principal}/verifications",
            get(handle_verifications_by_verifier),
        )
        .route("/api/v1/verifications", post(handle_register_verification))
        .route("/api/v1/verifications/count", get(handle_verification_count))
        .route("/api/v1/verifications/{uuid}", get(handle_get_verification))
        .route(
            "/api/v1/subjects/{subject}/verifications",
            get(handle_subject_verifications),
        )
        .route(
            "/api/v1/subjects/{subject}/verified",
            get(handle_subject_verified),
        )
        .route(
            "/api/v1/requirements/{id}/sources",
            get(handle_requirement_sources),
        )
        .route(
            "/api/v1/requirements/{id}/verified/{subject}",
            get(handle_requirement_verified),
        )
        .with_state(state)
}

pub async fn start_api_server(listen_addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
