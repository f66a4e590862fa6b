use crate::abtest::{AbTestManager, CookieAssignmentStore, VariantConfig};
use crate::alerts::{Alert, AlertRule};
use crate::content::{collect_stats, ContentStats, ContentType};
use crate::dashboard::AppState;
use crate::error::{AbTestError, ContentError};
use crate::scheduler::trigger_alerts;
use crate::security::{api_key_matches, API_KEY_HEADER};
use crate::validation::{ConsistencyReport, MissingTranslationReport, ValidationReport};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

/// Errors returned by dashboard handlers
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Internal(String),
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound { .. }
            | ContentError::MissingDirectory { .. }
            | ContentError::RuleNotFound(_) => ApiError::NotFound(err.to_string()),
            ContentError::UnknownContentType(_) | ContentError::UnknownLanguage(_) => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AbTestError> for ApiError {
    fn from(err: AbTestError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid API key".to_string(),
            ),
            ApiError::Internal(msg) => {
                error!("Dashboard request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

fn require_api_key(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if api_key_matches(state.api_key.as_deref(), presented) {
        Ok(())
    } else {
        warn!("Rejected request with missing or invalid API key");
        Err(ApiError::Unauthorized)
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ==================== Validation ====================

pub async fn validation_report(State(state): State<AppState>) -> Json<ValidationReport> {
    if let Some(report) = state.cached_report() {
        return Json(report);
    }
    Json(state.refresh_report().await)
}

pub async fn regenerate_report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ValidationReport>, ApiError> {
    require_api_key(&state, &headers)?;
    Ok(Json(state.refresh_report().await))
}

pub async fn missing_translations(
    State(state): State<AppState>,
) -> Json<Vec<MissingTranslationReport>> {
    Json(state.validator.generate_missing_translation_report().await)
}

#[derive(Debug, Deserialize)]
pub struct ConsistencyQuery {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

pub async fn consistency_report(
    State(state): State<AppState>,
    Query(query): Query<ConsistencyQuery>,
) -> Result<Json<ConsistencyReport>, ApiError> {
    let checker = state.validator.checker();
    let report = match query.content_type {
        Some(name) => {
            let content_type: ContentType = name.parse()?;
            checker.check_content_type(content_type).await
        }
        None => checker.check_all_content().await,
    };
    Ok(Json(report))
}

pub async fn content_stats(State(state): State<AppState>) -> Json<ContentStats> {
    Json(collect_stats(state.accessor.as_ref()).await)
}

// ==================== Alerts ====================

pub async fn alerts(State(state): State<AppState>) -> Json<Vec<Alert>> {
    Json(state.feed.snapshot())
}

pub async fn run_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Alert>>, ApiError> {
    require_api_key(&state, &headers)?;
    trigger_alerts(&state.engine, &state.feed).await;
    Ok(Json(state.feed.snapshot()))
}

pub async fn run_alert_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Alert>>, ApiError> {
    require_api_key(&state, &headers)?;
    Ok(Json(state.engine.run_alert_rule(&id).await?))
}

pub async fn alert_rules(State(state): State<AppState>) -> Json<Vec<AlertRule>> {
    Json(state.engine.get_alert_rules())
}

// ==================== Experiments ====================

#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct VariantResponse {
    pub variant: Option<String>,
    pub config: Option<VariantConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub user: String,
    pub conversion_type: String,
    pub value: Option<f64>,
}

fn cookie_manager(
    state: &AppState,
    experiment_id: &str,
    headers: &HeaderMap,
) -> Result<AbTestManager<CookieAssignmentStore>, ApiError> {
    if !state.experiments.contains_key(experiment_id) {
        return Err(ApiError::NotFound(format!(
            "Experiment not found: '{}'",
            experiment_id
        )));
    }

    let cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());
    let store = CookieAssignmentStore::from_cookie_header(cookie);

    Ok(AbTestManager::with_catalog(Arc::clone(&state.experiments), store)
        .with_analytics(Arc::clone(&state.analytics)))
}

pub async fn experiment_variant(
    State(state): State<AppState>,
    Path(experiment_id): Path<String>,
    Query(query): Query<VariantQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let manager = cookie_manager(&state, &experiment_id, &headers)?;

    let variant = manager.get_user_variant(&query.user, &experiment_id)?;
    let config = variant
        .as_deref()
        .and_then(|variant_id| manager.get_variant_config(&experiment_id, variant_id))
        .cloned();

    let mut response = Json(VariantResponse { variant, config }).into_response();
    if let Some(cookie) = manager.into_store().set_cookie_header(state.cookie_max_age_days) {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Assignment cookie is not a valid header value: {}", e),
        }
    }
    Ok(response)
}

pub async fn experiment_conversion(
    State(state): State<AppState>,
    Path(experiment_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ConversionRequest>,
) -> Result<StatusCode, ApiError> {
    let manager = cookie_manager(&state, &experiment_id, &headers)?;
    manager.track_conversion(
        &request.user,
        &experiment_id,
        &request.conversion_type,
        request.value,
    );
    Ok(StatusCode::NO_CONTENT)
}
