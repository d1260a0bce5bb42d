//! HTTP API endpoints.
//!
//! Read-only game views for displays, plus the staff CSV import.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::TriviaResult;
use crate::protocol::{FinalRoundInfo, ServerMessage};
use crate::state::{AppState, ImportSummary};
use crate::types::{Actor, Game, PlayerScorecard, Round};

/// Public view of a game: answers stay on the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub game: Game,
    pub rounds: Vec<Round>,
    pub final_round: Option<FinalRoundInfo>,
}

/// GET /api/games
pub async fn list_games(State(state): State<Arc<AppState>>) -> Json<Vec<Game>> {
    Json(state.list_games().await)
}

/// GET /api/games/{id}
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> TriviaResult<Json<GameView>> {
    let detail = state.game_detail(&game_id).await?;
    Ok(Json(GameView {
        final_round: detail.final_round.as_ref().map(FinalRoundInfo::from),
        game: detail.game,
        rounds: detail.rounds,
    }))
}

/// GET /api/games/{id}/scores
pub async fn game_scores(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> TriviaResult<Json<Vec<PlayerScorecard>>> {
    Ok(Json(state.game_scores(&game_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub title: String,
}

/// Import a game from a headerless CSV body.
///
/// POST /api/staff/games/import?title=...
///
/// Sits behind the staff auth middleware.
pub async fn import_game(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> TriviaResult<(StatusCode, Json<ImportSummary>)> {
    let summary = state
        .import_game_csv(&Actor::staff(), query.title, body.as_bytes())
        .await?;
    state.broadcast_to_all(ServerMessage::GameCreated {
        game: summary.game.clone(),
    });
    Ok((StatusCode::CREATED, Json(summary)))
}
