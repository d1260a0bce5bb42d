//! WebSocket message dispatch
//!
//! Staff authorization is checked here, then messages are dispatched to the
//! player or staff handler modules. Per-operation permissions (participation,
//! status windows) are enforced by the state layer.

use crate::error::TriviaResult;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::Actor;
use std::sync::Arc;

use super::{player, staff};

/// Macro to check staff authorization and return early if unauthorized
macro_rules! check_staff {
    ($actor:expr, $action:expr) => {
        if !$actor.is_staff {
            return Some(ServerMessage::Error {
                code: "PERMISSION_DENIED".to_string(),
                msg: format!("Only staff can {}", $action),
            });
        }
    };
}

/// Turn a state result into a reply, mapping errors to `Error` messages
pub(super) fn reply<T>(
    result: TriviaResult<T>,
    ok: impl FnOnce(T) -> ServerMessage,
) -> Option<ServerMessage> {
    Some(match result {
        Ok(value) => ok(value),
        Err(e) => {
            tracing::debug!("Request rejected: {}", e);
            e.into()
        }
    })
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    actor: &Actor,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        // Player and shared messages
        ClientMessage::RegisterPlayer { display_name } => {
            player::handle_register_player(state, actor, display_name).await
        }
        ClientMessage::JoinGame { game_id } => player::handle_join_game(state, actor, game_id).await,
        ClientMessage::ListGames => player::handle_list_games(state).await,
        ClientMessage::GetGame { game_id } => player::handle_get_game(state, game_id).await,
        ClientMessage::GetRoundQuestions { round_id } => {
            player::handle_get_round_questions(state, round_id).await
        }
        ClientMessage::SubmitResponse { question_id, text } => {
            player::handle_submit_response(state, actor, question_id, text).await
        }
        ClientMessage::GetMyResponses { round_id } => {
            player::handle_get_my_responses(state, actor, round_id).await
        }
        ClientMessage::ChooseDoubleRound { game_id, round_id } => {
            player::handle_choose_double_round(state, actor, game_id, round_id).await
        }
        ClientMessage::SubmitWager { game_id, wager } => {
            player::handle_submit_wager(state, actor, game_id, wager).await
        }
        ClientMessage::SubmitFinalAnswer { game_id, text } => {
            player::handle_submit_final_answer(state, actor, game_id, text).await
        }
        ClientMessage::CheckResponse {
            response_id,
            correct,
        } => player::handle_check_response(state, actor, response_id, correct).await,
        ClientMessage::GetRoundReview { round_id } => {
            player::handle_get_round_review(state, actor, round_id).await
        }
        ClientMessage::GetScores { game_id } => player::handle_get_scores(state, game_id).await,

        // Staff-only commands (authorization checked before dispatch)
        ClientMessage::StaffCreateGame { title } => {
            check_staff!(actor, "create games");
            staff::handle_create_game(state, actor, title).await
        }
        ClientMessage::StaffCreatePlayers { count } => {
            check_staff!(actor, "create players");
            staff::handle_create_players(state, actor, count).await
        }
        ClientMessage::StaffCreateRound { game_id, category } => {
            check_staff!(actor, "create rounds");
            staff::handle_create_round(state, actor, game_id, category).await
        }
        ClientMessage::StaffAddQuestion { round_id, question } => {
            check_staff!(actor, "add questions");
            staff::handle_add_question(state, actor, round_id, question).await
        }
        ClientMessage::StaffCreateFinalRound {
            game_id,
            final_round,
        } => {
            check_staff!(actor, "create the final round");
            staff::handle_create_final_round(state, actor, game_id, final_round).await
        }
        ClientMessage::StaffSetRoundStatus { round_id, status } => {
            check_staff!(actor, "change round status");
            staff::handle_set_round_status(state, actor, round_id, status).await
        }
        ClientMessage::StaffSetFinalRoundStatus {
            final_round_id,
            status,
        } => {
            check_staff!(actor, "change final round status");
            staff::handle_set_final_round_status(state, actor, final_round_id, status).await
        }
        ClientMessage::StaffMarkFinalResponse {
            final_response_id,
            correct,
        } => {
            check_staff!(actor, "mark final responses");
            staff::handle_mark_final_response(state, actor, final_response_id, correct).await
        }
        ClientMessage::StaffListFinalResponses { game_id } => {
            check_staff!(actor, "list final responses");
            staff::handle_list_final_responses(state, actor, game_id).await
        }
        ClientMessage::StaffCompleteGame { game_id } => {
            check_staff!(actor, "complete games");
            staff::handle_complete_game(state, actor, game_id).await
        }
        ClientMessage::StaffDeleteGame { game_id } => {
            check_staff!(actor, "delete games");
            staff::handle_delete_game(state, actor, game_id).await
        }
        ClientMessage::StaffImportGame { title, csv } => {
            check_staff!(actor, "import games");
            staff::handle_import_game(state, actor, title, csv).await
        }
    }
}
