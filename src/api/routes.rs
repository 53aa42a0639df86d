//! API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<EngineState>`; the
//! store sits behind an async `RwLock` and the statistics snapshot is
//! cached until a refresh changes the history.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::generator::{self, Strategy};
use crate::refresh;
use crate::source::DrawSource;
use crate::stats::{DigitStat, NumberDelay, NumberFrequency, ParityStat, PositionStat, RangeStat, StatsSnapshot};
use crate::storage;
use crate::store::DrawStore;
use crate::types::{Draw, EngineError, RefreshReport, VerificationResult, DRAW_SIZE};
use crate::verifier;

/// Default page size for the results listing.
const DEFAULT_RESULTS_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct EngineState {
    pub store: RwLock<DrawStore>,
    /// Invalidated whenever the store changes; recomputed lazily.
    pub stats_cache: RwLock<Option<Arc<StatsSnapshot>>>,
    pub source: Arc<dyn DrawSource>,
    /// Snapshot file path; `None` uses the default.
    pub store_path: Option<String>,
}

impl EngineState {
    pub fn new(store: DrawStore, source: Arc<dyn DrawSource>, store_path: Option<String>) -> Self {
        Self {
            store: RwLock::new(store),
            stats_cache: RwLock::new(None),
            source,
            store_path,
        }
    }

    /// Current statistics snapshot, computing it once per store version.
    async fn stats(&self) -> Arc<StatsSnapshot> {
        if let Some(snapshot) = self.stats_cache.read().await.as_ref() {
            return Arc::clone(snapshot);
        }

        // Compute while holding the cache write guard: an invalidation
        // cannot land between the compute and the install.
        let mut cache = self.stats_cache.write().await;
        if let Some(snapshot) = cache.as_ref() {
            return Arc::clone(snapshot);
        }
        let store = self.store.read().await;
        let snapshot = Arc::new(StatsSnapshot::compute(&store));
        drop(store);

        *cache = Some(Arc::clone(&snapshot));
        snapshot
    }
}

pub type AppState = Arc<EngineState>;

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// A handler failure carrying the HTTP status it maps to.
///
/// The body is always `{ "error": <message> }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

// Malformed request bodies get the same `{ "error": ... }` shape as
// domain failures instead of axum's plain-text rejection.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match &e {
            EngineError::InvalidDraw(_)
            | EngineError::DuplicateContest(_)
            | EngineError::InvalidParameter(_)
            | EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) | EngineError::EmptyStore => StatusCode::NOT_FOUND,
            EngineError::Source(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError {
            status,
            message: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    /// Re-walk the full history from contest 1, back-filling gaps.
    #[serde(default)]
    pub full: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub strategy: Option<String>,
    pub numbers_per_game: Option<usize>,
    pub game_count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub strategy: Strategy,
    pub numbers_per_game: usize,
    pub game_count: usize,
    pub games: Vec<Vec<u8>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub numbers: Vec<u16>,
    pub contest_number: Option<u32>,
}

/// The statistics payload. Positional stats are keyed `position_1` through
/// `position_5` (an empty map when no draws are stored).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_draws: u64,
    pub frequency_by_number: Vec<NumberFrequency>,
    pub delays_by_number: Vec<NumberDelay>,
    pub by_position: BTreeMap<String, PositionStat>,
    pub by_range: Vec<RangeStat>,
    pub parity: ParityStat,
    pub by_digit: Vec<DigitStat>,
}

impl StatisticsResponse {
    fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        let by_position = snapshot
            .by_position
            .iter()
            .map(|p| (format!("position_{}", p.position), p.clone()))
            .collect();
        Self {
            total_draws: snapshot.total_draws,
            frequency_by_number: snapshot.frequency_by_number.clone(),
            delays_by_number: snapshot.delays_by_number.clone(),
            by_position,
            by_range: snapshot.by_range.clone(),
            parity: snapshot.parity.clone(),
            by_digit: snapshot.by_digit.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub total_draws: usize,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/latest-result
pub async fn get_latest_result(State(state): State<AppState>) -> Result<Json<Draw>, ApiError> {
    let store = state.store.read().await;
    let draw = store.latest()?.clone();
    Ok(Json(draw))
}

/// GET /api/results?limit=N
pub async fn get_results(
    State(state): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<Vec<Draw>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RESULTS_LIMIT);
    if limit == 0 {
        return Err(EngineError::InvalidParameter("limit must be positive".into()).into());
    }
    let store = state.store.read().await;
    Ok(Json(store.recent(Some(limit)).into_iter().cloned().collect()))
}

/// GET /api/result/{contest}
pub async fn get_result(
    State(state): State<AppState>,
    Path(contest_number): Path<u32>,
) -> Result<Json<Draw>, ApiError> {
    let store = state.store.read().await;
    let draw = store.get(contest_number)?.clone();
    Ok(Json(draw))
}

/// GET /api/statistics
pub async fn get_statistics(State(state): State<AppState>) -> Json<StatisticsResponse> {
    let snapshot = state.stats().await;
    Json(StatisticsResponse::from_snapshot(&snapshot))
}

/// POST /api/refresh
///
/// The walk locks the store per append only, so reads keep serving while
/// fetches are in flight; mid-walk readers see a valid prefix of the new
/// history.
pub async fn post_refresh(
    State(state): State<AppState>,
    body: Option<Json<RefreshRequest>>,
) -> Json<RefreshReport> {
    let Json(request) = body.unwrap_or_default();

    let report = refresh::refresh(state.source.as_ref(), &state.store, request.full).await;

    if report.total_inserted > 0 {
        *state.stats_cache.write().await = None;
        let store = state.store.read().await;
        if let Err(e) = storage::save_store(&store, state.store_path.as_deref()) {
            error!(error = %e, "Failed to persist draw history");
        }
    }
    info!(%report, "Refresh finished");

    Json(report)
}

/// POST /api/generate-guess
pub async fn post_generate_guess(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;
    let strategy = match request.strategy.as_deref() {
        Some(name) => Strategy::from_str(name)?,
        None => Strategy::Random,
    };
    let numbers_per_game = request.numbers_per_game.unwrap_or(DRAW_SIZE);
    let game_count = request.game_count.unwrap_or(1);

    let snapshot = state.stats().await;
    let games = generator::generate(
        strategy,
        numbers_per_game,
        game_count,
        &snapshot,
        &mut rand::thread_rng(),
    )?;

    Ok(Json(GenerateResponse {
        strategy,
        numbers_per_game,
        game_count,
        games,
    }))
}

/// POST /api/verify-guess
///
/// With no contest number the game is checked against the latest stored
/// draw.
pub async fn post_verify_guess(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerificationResult>, ApiError> {
    let Json(request) = payload?;
    let store = state.store.read().await;
    let contest_number = match request.contest_number {
        Some(n) => n,
        None => store.latest()?.contest_number,
    };
    let result = verifier::verify(&store, &request.numbers, contest_number)?;
    Ok(Json(result))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        total_draws: store.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
