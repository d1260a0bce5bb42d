//! Staff-only command handlers
//!
//! Authorization is checked in the dispatch layer before calling these.
//! The state layer repeats the check.

use super::handlers::reply;
use crate::protocol::{PlayerToken, ServerMessage};
use crate::state::AppState;
use crate::types::*;
use std::sync::Arc;

pub async fn handle_create_game(
    state: &Arc<AppState>,
    actor: &Actor,
    title: String,
) -> Option<ServerMessage> {
    reply(state.create_game(actor, title).await, |game| {
        ServerMessage::GameCreated { game }
    })
}

pub async fn handle_create_players(
    state: &Arc<AppState>,
    actor: &Actor,
    count: u32,
) -> Option<ServerMessage> {
    tracing::info!("Staff creating {} players", count);
    reply(state.create_players(actor, count).await, |players| {
        ServerMessage::PlayersCreated {
            players: players
                .into_iter()
                .map(|p| PlayerToken {
                    id: p.id,
                    token: p.token,
                })
                .collect(),
        }
    })
}

pub async fn handle_create_round(
    state: &Arc<AppState>,
    actor: &Actor,
    game_id: String,
    category: String,
) -> Option<ServerMessage> {
    reply(
        state.create_round(actor, &game_id, category).await,
        |round| ServerMessage::RoundCreated { round },
    )
}

pub async fn handle_add_question(
    state: &Arc<AppState>,
    actor: &Actor,
    round_id: String,
    question: NewQuestion,
) -> Option<ServerMessage> {
    reply(
        state.add_question(actor, &round_id, question).await,
        |question| ServerMessage::QuestionAdded { question },
    )
}

pub async fn handle_create_final_round(
    state: &Arc<AppState>,
    actor: &Actor,
    game_id: String,
    final_round: NewFinalRound,
) -> Option<ServerMessage> {
    reply(
        state.create_final_round(actor, &game_id, final_round).await,
        |final_round| ServerMessage::FinalRoundCreated { final_round },
    )
}

/// The status broadcast and scoreboard go out from the state layer;
/// the acting staff member also gets the auto-check count.
pub async fn handle_set_round_status(
    state: &Arc<AppState>,
    actor: &Actor,
    round_id: String,
    status: RoundStatus,
) -> Option<ServerMessage> {
    reply(
        state.set_round_status(actor, &round_id, status).await,
        |transition| ServerMessage::RoundUpdated {
            round: transition.round,
            auto_checked: transition.auto_checked,
        },
    )
}

pub async fn handle_set_final_round_status(
    state: &Arc<AppState>,
    actor: &Actor,
    final_round_id: String,
    status: FinalRoundStatus,
) -> Option<ServerMessage> {
    reply(
        state
            .set_final_round_status(actor, &final_round_id, status)
            .await,
        |final_round| ServerMessage::FinalRoundUpdated { final_round },
    )
}

pub async fn handle_mark_final_response(
    state: &Arc<AppState>,
    actor: &Actor,
    final_response_id: String,
    correct: bool,
) -> Option<ServerMessage> {
    reply(
        state
            .mark_final_response(actor, &final_response_id, correct)
            .await,
        |response| ServerMessage::FinalResponseMarked { response },
    )
}

pub async fn handle_list_final_responses(
    state: &Arc<AppState>,
    actor: &Actor,
    game_id: String,
) -> Option<ServerMessage> {
    reply(
        state.final_responses_for_game(actor, &game_id).await,
        |responses| ServerMessage::FinalResponses { game_id, responses },
    )
}

pub async fn handle_complete_game(
    state: &Arc<AppState>,
    actor: &Actor,
    game_id: String,
) -> Option<ServerMessage> {
    match state.complete_game(actor, &game_id).await {
        Ok(game) => {
            state.broadcast_scoreboard(&game.id).await;
            let msg = ServerMessage::GameCompleted { game };
            state.broadcast_to_all(msg.clone());
            Some(msg)
        }
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_delete_game(
    state: &Arc<AppState>,
    actor: &Actor,
    game_id: String,
) -> Option<ServerMessage> {
    match state.delete_game(actor, &game_id).await {
        Ok(()) => {
            let msg = ServerMessage::GameDeleted { game_id };
            state.broadcast_to_all(msg.clone());
            Some(msg)
        }
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_import_game(
    state: &Arc<AppState>,
    actor: &Actor,
    title: String,
    csv: String,
) -> Option<ServerMessage> {
    reply(
        state.import_game_csv(actor, title, csv.as_bytes()).await,
        |summary| ServerMessage::GameImported { summary },
    )
}
