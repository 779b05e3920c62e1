use crate::analytics::{AnalyticsSummary, ClickFeedback, DEFAULT_PERIOD_DAYS};
use crate::api::{AppState, RequestMeta, RequireUser};
use crate::error::Result;
use crate::history::{
    PopularSearch, SaveSearchRequest, SavedSearch, SearchHistoryEntry, DEFAULT_HISTORY_LIMIT,
    MAX_HISTORY_LIMIT,
};
use crate::metrics::gather_metrics;
use crate::models::ResultType;
use crate::search::{BackendCapability, SearchRequest, SearchResponse, Suggestion, SuggestionProvider};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        backend: state.search.capability(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub backend: BackendCapability,
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(&state.registry),
    )
}

/// Search with query-string parameters
pub async fn search_get(
    State(state): State<AppState>,
    RequestMeta(context): RequestMeta,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    request.validate()?;
    Ok(Json(state.search.search(&request, context).await?))
}

/// Search with a JSON body
pub async fn search_post(
    State(state): State<AppState>,
    RequestMeta(context): RequestMeta,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    request.validate()?;
    Ok(Json(state.search.search(&request, context).await?))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
    pub query: String,
    pub total: usize,
}

pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<SuggestionsResponse>> {
    let query = params.q.unwrap_or_default().trim().to_string();
    let limit = SuggestionProvider::clamp_limit(params.limit);
    let suggestions = state.suggestions.suggest(&query, limit).await?;

    Ok(Json(SuggestionsResponse {
        total: suggestions.len(),
        suggestions,
        query,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: AnalyticsSummary,
}

pub async fn analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsResponse>> {
    let days = params.days.unwrap_or(DEFAULT_PERIOD_DAYS);
    let summary = state.search.analytics().summary(days).await?;
    Ok(Json(AnalyticsResponse {
        success: true,
        summary,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ClickRequest {
    pub search_id: Uuid,
    #[validate(range(min = 1))]
    pub position: u32,
    pub result_type: ResultType,
    pub time_to_click_ms: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub async fn record_click(
    State(state): State<AppState>,
    Json(request): Json<ClickRequest>,
) -> Result<Json<SuccessResponse>> {
    request.validate()?;
    state
        .search
        .analytics()
        .record_click(
            request.search_id,
            ClickFeedback {
                position: request.position,
                result_type: request.result_type,
                time_to_click_ms: request.time_to_click_ms,
            },
        )
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entries: u64,
}

pub async fn cache_stats(State(state): State<AppState>) -> Result<Json<CacheStatsResponse>> {
    let stats = state.search.metrics().cache_stats();
    Ok(Json(CacheStatsResponse {
        hits: stats.hits,
        misses: stats.misses,
        hit_rate: stats.hit_rate,
        entries: state.search.cached_entries().await,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    fn clamped(&self) -> usize {
        self.limit
            .map(|l| l.clamp(1, MAX_HISTORY_LIMIT as i64) as usize)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<SearchHistoryEntry>,
    pub total: usize,
}

pub async fn history(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Query(params): Query<LimitParams>,
) -> Result<Json<HistoryResponse>> {
    let history = state.search.history().recent(user_id, params.clamped());
    Ok(Json(HistoryResponse {
        total: history.len(),
        history,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    pub deleted: usize,
}

pub async fn clear_history(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<ClearHistoryResponse>> {
    let deleted = state.search.history().clear(user_id);
    tracing::info!(user_id, deleted, "Search history cleared");
    Ok(Json(ClearHistoryResponse { deleted }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PopularResponse {
    pub popular: Vec<PopularSearch>,
}

pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<PopularResponse>> {
    Ok(Json(PopularResponse {
        popular: state.search.history().popular(params.clamped()),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedSearchesResponse {
    pub saved_searches: Vec<SavedSearch>,
}

pub async fn list_saved(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<SavedSearchesResponse>> {
    Ok(Json(SavedSearchesResponse {
        saved_searches: state.saved.list(user_id),
    }))
}

pub async fn create_saved(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(request): Json<SaveSearchRequest>,
) -> Result<(StatusCode, Json<SavedSearch>)> {
    let saved = state.saved.save(user_id, request)?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn delete_saved(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.saved.delete(user_id, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn use_saved(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SavedSearch>> {
    Ok(Json(state.saved.mark_used(user_id, id)?))
}
