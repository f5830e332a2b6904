// Clubdesk - Read-only Stats API

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{Datelike, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use clubdesk::{
    attendance, dues, match_stats, roster, treasury, AttendanceSummary, DebtPolicy,
    MatchSummary, MonthKey, MonthStatus, RosterSummary, TeamSummary, TreasurySummary,
    get_all_matches, get_all_movements, get_all_players, get_all_sessions, get_all_teams,
    get_movements_for_player, setup_database,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Club-wide stats response
#[derive(Serialize)]
struct StatsResponse {
    matches: MatchSummary,
    roster: Option<RosterSummary>,
    treasury: TreasurySummary,
    attendance: Option<AttendanceSummary>,
}

/// One month on a player's dues timeline
#[derive(Serialize)]
struct MonthEntry {
    month: String,
    status: MonthStatus,
}

/// Per-player dues response (current year)
#[derive(Serialize)]
struct DuesResponse {
    player_id: String,
    year: i32,
    months: Vec<MonthEntry>,
    debt_months: u32,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/stats - Overall club summary
async fn club_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StatsResponse>>, StatusCode> {
    let conn = state.db.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let matches = get_all_matches(&conn).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let players = get_all_players(&conn).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let movements = get_all_movements(&conn).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let sessions = get_all_sessions(&conn).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let today = Utc::now().date_naive();

    Ok(Json(ApiResponse::ok(StatsResponse {
        matches: match_stats::summarize_overall(&matches),
        roster: roster::summarize(&players, today),
        treasury: treasury::summarize(&movements),
        attendance: attendance::summarize(&sessions),
    })))
}

/// GET /api/teams - Teams ranked by win rate
async fn team_rankings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TeamSummary>>>, StatusCode> {
    let conn = state.db.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let teams = get_all_teams(&conn).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let matches = get_all_matches(&conn).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(ApiResponse::ok(match_stats::summarize_by_team(
        &teams, &matches,
    ))))
}

/// GET /api/players/:id/dues - Month-by-month dues timeline for this year
async fn player_dues(
    State(state): State<AppState>,
    AxumPath(player_id): AxumPath<String>,
) -> Result<Json<ApiResponse<DuesResponse>>, StatusCode> {
    let conn = state.db.lock().map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let payments =
        get_movements_for_player(&conn, &player_id).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let today = Utc::now().date_naive();
    let policy = DebtPolicy::default();

    let months = MonthKey::months_through(today.year(), 12)
        .into_iter()
        .map(|month| MonthEntry {
            month: month.key(),
            status: dues::month_status(&player_id, month, today, &payments, &policy),
        })
        .collect();

    Ok(Json(ApiResponse::ok(DuesResponse {
        player_id: player_id.clone(),
        year: today.year(),
        months,
        debt_months: dues::count_debt_months(&player_id, today, &payments, &policy),
    })))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let db_path = std::env::args().nth(1).unwrap_or_else(|| "clubdesk.db".to_string());

    let conn = Connection::open(&db_path)?;
    setup_database(&conn)?;

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/stats", get(club_stats))
        .route("/api/teams", get(team_rankings))
        .route("/api/players/:id/dues", get(player_dues))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
    println!("Clubdesk API listening on http://127.0.0.1:8080 (db: {})", db_path);

    axum::serve(listener, app).await?;

    Ok(())
}
