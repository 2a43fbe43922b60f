//! JSON HTTP surface over [`FormsService`].
//!
//! The caller is identified by trusted reverse-proxy headers:
//! `X-Forwarded-Email` (required) and `X-Forwarded-Groups` (comma-separated
//! permissions). Each route requires one of a fixed set of permissions before
//! the tag rules of the gateway apply.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{info, instrument, warn};

use crate::client::GatewayClient;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::forms::{FormSummary, FormsService, SubmissionSummary};
use crate::permissions::Principal;

pub const EMAIL_HEADER: &str = "x-forwarded-email";
pub const GROUPS_HEADER: &str = "x-forwarded-groups";

const CAN_READ: &[&str] = &["forms.can_read", "forms.can_read_all"];
const CAN_CREATE: &[&str] = &["forms.can_create"];
const CAN_UPDATE: &[&str] = &["forms.can_update", "forms.can_update_all"];

type AppState = Arc<FormsService>;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    /// No caller identity on the request.
    Unauthenticated,
    /// The caller lacks every permission the route accepts.
    Forbidden,
    Gateway(GatewayError),
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::Forbidden => write!(f, "{}", GatewayError::PermissionDenied),
            Self::Gateway(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, message(&self)),
            Self::Forbidden => (StatusCode::FORBIDDEN, message(&self)),
            Self::Gateway(GatewayError::UpstreamApplication { status, body }) => {
                (to_status(status), body)
            }
            Self::Gateway(ref e) => (to_status(e.status_code()), message(&self)),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed");
        } else {
            warn!(status = status.as_u16(), "request rejected");
        }

        (status, Json(body)).into_response()
    }
}

fn message(err: &ApiError) -> Value {
    json!({ "message": err.to_string() })
}

fn to_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
}

// ── Caller identity ───────────────────────────────────────────────────────────

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = header_value(parts, EMAIL_HEADER).ok_or(ApiError::Unauthenticated)?;
        let groups = header_value(parts, GROUPS_HEADER)
            .into_iter()
            .flat_map(|g| g.split(','))
            .map(str::trim)
            .filter(|g| !g.is_empty());

        Ok(Principal::new(email, groups))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn require(principal: &Principal, any_of: &[&str]) -> Result<(), ApiError> {
    if principal.has_any(any_of) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn router(forms: Arc<FormsService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/view/favicon.ico", get(favicon))
        .route("/view/{form_path}", get(form_view).post(form_post))
        .route("/view/{form_path}/submission", get(form_submissions))
        .route(
            "/view/{form_path}/submission/{submission_id}",
            get(single_submission).put(update_submission),
        )
        .with_state(forms)
}

/// Starts the forms HTTP server on `config.port`.
pub async fn serve(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let codec = config.id_codec()?;
    let client = GatewayClient::new(&config);
    let forms = Arc::new(FormsService::new(
        client,
        codec,
        config.application_root.clone(),
    ));

    let app = router(forms);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, upstream = %config.api_url, "forms server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct IndexQuery {
    category: Option<String>,
}

#[instrument(name = "forms.index", skip_all, fields(user = %principal.email))]
async fn index(
    State(forms): State<AppState>,
    principal: Principal,
    Query(query): Query<IndexQuery>,
) -> Result<Json<Vec<FormSummary>>, ApiError> {
    require(&principal, CAN_READ)?;
    let listed = forms
        .list_forms(&principal, query.category.as_deref())
        .await?;
    Ok(Json(listed))
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[instrument(name = "forms.view", skip_all, fields(user = %principal.email, form = %form_path))]
async fn form_view(
    State(forms): State<AppState>,
    principal: Principal,
    Path(form_path): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require(&principal, CAN_READ)?;
    Ok(Json(forms.get_form(&principal, &form_path).await?))
}

#[instrument(name = "forms.create", skip_all, fields(user = %principal.email, form = %form_path))]
async fn form_post(
    State(forms): State<AppState>,
    principal: Principal,
    Path(form_path): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    require(&principal, CAN_CREATE)?;
    Ok(Json(
        forms
            .create_submission(&principal, &form_path, payload)
            .await?,
    ))
}

#[instrument(name = "forms.submissions", skip_all, fields(user = %principal.email, form = %form_path))]
async fn form_submissions(
    State(forms): State<AppState>,
    principal: Principal,
    Path(form_path): Path<String>,
) -> Result<Json<Vec<SubmissionSummary>>, ApiError> {
    require(&principal, CAN_READ)?;
    Ok(Json(forms.list_submissions(&principal, &form_path).await?))
}

#[instrument(name = "forms.submission", skip_all, fields(user = %principal.email, form = %form_path))]
async fn single_submission(
    State(forms): State<AppState>,
    principal: Principal,
    Path((form_path, submission_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    require(&principal, CAN_READ)?;
    Ok(Json(
        forms
            .get_submission(&principal, &form_path, &submission_id)
            .await?,
    ))
}

#[instrument(name = "forms.update", skip_all, fields(user = %principal.email, form = %form_path))]
async fn update_submission(
    State(forms): State<AppState>,
    principal: Principal,
    Path((form_path, submission_id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    require(&principal, CAN_UPDATE)?;
    Ok(Json(
        forms
            .update_submission(&principal, &form_path, &submission_id, payload)
            .await?,
    ))
}
