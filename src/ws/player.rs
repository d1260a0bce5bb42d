//! Player message handlers
//!
//! Handlers for messages any connected player may send: registration,
//! joining, answering, wagering and peer review.

use super::handlers::reply;
use crate::error::TriviaError;
use crate::protocol::{QuestionInfo, ServerMessage};
use crate::state::AppState;
use crate::types::Actor;
use std::sync::Arc;

pub async fn handle_register_player(
    state: &Arc<AppState>,
    actor: &Actor,
    display_name: String,
) -> Option<ServerMessage> {
    let result = async {
        let player_id = actor.require_player()?;
        let player = state.get_player(player_id).await?;
        state.register_player(&player.token, display_name).await
    }
    .await;
    reply(result, |player| {
        tracing::info!("Player {} registered", player.id);
        ServerMessage::PlayerRegistered {
            player_id: player.id,
            display_name: player.display_name.unwrap_or_default(),
        }
    })
}

pub async fn handle_join_game(
    state: &Arc<AppState>,
    actor: &Actor,
    game_id: String,
) -> Option<ServerMessage> {
    reply(state.join_game(actor, &game_id).await, |game| {
        ServerMessage::Joined { game }
    })
}

pub async fn handle_list_games(state: &Arc<AppState>) -> Option<ServerMessage> {
    Some(ServerMessage::Games {
        games: state.list_games().await,
    })
}

pub async fn handle_get_game(state: &Arc<AppState>, game_id: String) -> Option<ServerMessage> {
    reply(state.game_detail(&game_id).await, ServerMessage::from)
}

pub async fn handle_get_round_questions(
    state: &Arc<AppState>,
    round_id: String,
) -> Option<ServerMessage> {
    reply(state.round_questions(&round_id).await, |questions| {
        ServerMessage::RoundQuestions {
            round_id,
            questions: questions.iter().map(QuestionInfo::from).collect(),
        }
    })
}

pub async fn handle_submit_response(
    state: &Arc<AppState>,
    actor: &Actor,
    question_id: String,
    text: String,
) -> Option<ServerMessage> {
    reply(
        state.submit_response(actor, &question_id, text).await,
        |response| ServerMessage::ResponseSaved { response },
    )
}

pub async fn handle_get_my_responses(
    state: &Arc<AppState>,
    actor: &Actor,
    round_id: String,
) -> Option<ServerMessage> {
    reply(state.my_responses(actor, &round_id).await, |responses| {
        ServerMessage::MyResponses {
            round_id,
            responses,
        }
    })
}

pub async fn handle_choose_double_round(
    state: &Arc<AppState>,
    actor: &Actor,
    game_id: String,
    round_id: String,
) -> Option<ServerMessage> {
    reply(
        state.choose_double_round(actor, &game_id, &round_id).await,
        |double_round| ServerMessage::DoubleRoundChosen { double_round },
    )
}

pub async fn handle_submit_wager(
    state: &Arc<AppState>,
    actor: &Actor,
    game_id: String,
    wager: i64,
) -> Option<ServerMessage> {
    reply(
        state.submit_wager(actor, &game_id, wager).await,
        |response| ServerMessage::WagerAccepted { response },
    )
}

pub async fn handle_submit_final_answer(
    state: &Arc<AppState>,
    actor: &Actor,
    game_id: String,
    text: String,
) -> Option<ServerMessage> {
    reply(
        state.submit_final_answer(actor, &game_id, text).await,
        |response| ServerMessage::FinalAnswerSaved { response },
    )
}

pub async fn handle_check_response(
    state: &Arc<AppState>,
    actor: &Actor,
    response_id: String,
    correct: bool,
) -> Option<ServerMessage> {
    reply(
        state.set_response_correct(actor, &response_id, correct).await,
        |response| ServerMessage::ResponseChecked { response },
    )
}

pub async fn handle_get_round_review(
    state: &Arc<AppState>,
    actor: &Actor,
    round_id: String,
) -> Option<ServerMessage> {
    reply(state.round_review(actor, &round_id).await, |review| {
        ServerMessage::RoundReview { review }
    })
}

pub async fn handle_get_scores(state: &Arc<AppState>, game_id: String) -> Option<ServerMessage> {
    reply(state.game_scores(&game_id).await, |players| {
        ServerMessage::Scoreboard { game_id, players }
    })
}

/// Resolve a join code from the connection query into an acting player
pub async fn resolve_player(state: &Arc<AppState>, token: Option<&str>) -> Result<Actor, TriviaError> {
    let token = token.ok_or_else(|| {
        TriviaError::PermissionDenied("a join code is required to play".to_string())
    })?;
    state
        .get_player_by_token(token)
        .await
        .map(|p| Actor::player(p.id))
        .ok_or_else(|| TriviaError::not_found("player", token))
}
