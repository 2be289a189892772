use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::engine::{RecommendRequest, Recommender};
use crate::error::ApiError;
use crate::experience::{estimate_years, MAX_EXPERIENCE_YEARS};
use crate::format::{truncate_chars, RecommendedItem};
use crate::index::Representation;
use crate::metrics;

pub const MAX_QUERY_CHARS: usize = 4_000;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
}

impl AppState {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            recommender: Arc::new(recommender),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/recommend", post(recommend))
        .route("/recommend/structured", post(recommend_structured))
        .route("/recommend/resume", post(recommend_resume))
        .route("/catalog/stats", get(catalog_stats))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResp {
    status: &'static str,
}

async fn health() -> Json<HealthResp> {
    Json(HealthResp { status: "healthy" })
}

#[derive(Debug, Deserialize)]
pub struct QueryReq {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub experience_years: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StructuredReq {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_years: u32,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResp {
    pub recommended_assessments: Vec<RecommendedItem>,
}

fn run(state: &AppState, route: &'static str, req: RecommendRequest) -> Json<RecommendationResp> {
    let started = Instant::now();
    let items = state.recommender.recommend(&req);
    metrics::record_request(
        route,
        items.len(),
        started.elapsed().as_secs_f64() * 1_000.0,
    );
    Json(RecommendationResp {
        recommended_assessments: items,
    })
}

fn validate_query(query: &str) -> Result<(), ApiError> {
    if query.trim().is_empty() {
        return Err(ApiError::invalid("query must not be empty"));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ApiError::invalid(format!(
            "query longer than {MAX_QUERY_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_experience(years: Option<u32>) -> Result<(), ApiError> {
    match years {
        Some(y) if y > MAX_EXPERIENCE_YEARS => Err(ApiError::invalid(format!(
            "experience_years must be at most {MAX_EXPERIENCE_YEARS}"
        ))),
        _ => Ok(()),
    }
}

fn validate_top_k(top_k: Option<usize>) -> Result<(), ApiError> {
    match top_k {
        Some(0) => Err(ApiError::invalid("top_k must be at least 1")),
        _ => Ok(()),
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v)
        .map_err(|e| ApiError::invalid(e.body_text()))
}

async fn recommend(
    State(state): State<AppState>,
    body: Result<Json<QueryReq>, JsonRejection>,
) -> Result<Json<RecommendationResp>, ApiError> {
    let body = json_body(body)?;
    validate_query(&body.query)?;
    validate_experience(body.experience_years)?;
    validate_top_k(body.top_k)?;

    let req = RecommendRequest::new(body.query)
        .with_experience(body.experience_years)
        .with_top_k(body.top_k);
    Ok(run(&state, "recommend", req))
}

async fn recommend_structured(
    State(state): State<AppState>,
    body: Result<Json<StructuredReq>, JsonRejection>,
) -> Result<Json<RecommendationResp>, ApiError> {
    let body = json_body(body)?;
    validate_experience(Some(body.experience_years))?;
    validate_top_k(body.top_k)?;

    let req = RecommendRequest::structured(&body.role, &body.skills, body.experience_years)
        .with_top_k(body.top_k);
    if req.query.is_empty() {
        return Err(ApiError::invalid("role or skills must be provided"));
    }
    validate_query(&req.query)?;
    Ok(run(&state, "structured", req))
}

/// Plain-text resume upload. Experience comes from the resume; the query
/// defaults to the resume text itself.
async fn recommend_resume(
    State(state): State<AppState>,
    Query(params): Query<ResumeParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RecommendationResp>, ApiError> {
    validate_top_k(params.top_k)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/plain")
        .to_ascii_lowercase();
    if !content_type.starts_with("text/") {
        return Err(ApiError::UnsupportedMedia { content_type });
    }

    let text = std::str::from_utf8(&body).map_err(|e| ApiError::Extraction {
        reason: format!("body is not valid UTF-8 text: {e}"),
    })?;
    if text.trim().is_empty() {
        return Err(ApiError::Extraction {
            reason: "document contains no text".into(),
        });
    }

    let query = match params.query.filter(|q| !q.trim().is_empty()) {
        Some(q) => q,
        None => truncate_chars(text.trim(), MAX_QUERY_CHARS - 3),
    };
    validate_query(&query)?;

    let req = RecommendRequest::new(query)
        .with_experience(estimate_years(text))
        .with_top_k(params.top_k);
    Ok(run(&state, "resume", req))
}

#[derive(Serialize)]
struct CatalogStats {
    records: usize,
    representation: Representation,
    dimensions: usize,
    floor: f32,
    default_top_k: usize,
}

async fn catalog_stats(State(state): State<AppState>) -> Json<CatalogStats> {
    let r = &state.recommender;
    Json(CatalogStats {
        records: r.index().len(),
        representation: r.index().representation(),
        dimensions: r.index().dimensions(),
        floor: r.floor(),
        default_top_k: r.default_top_k(),
    })
}
