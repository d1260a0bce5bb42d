use super::game::ensure_participant;
use super::score::collect_snapshot;
use super::{new_id, AppState};
use crate::error::{TriviaError, TriviaResult};
use crate::lifecycle;
use crate::protocol::ServerMessage;
use crate::types::*;

impl AppState {
    /// Create the game's single final round (staff only)
    pub async fn create_final_round(
        &self,
        actor: &Actor,
        game_id: &str,
        new: NewFinalRound,
    ) -> TriviaResult<FinalRound> {
        actor.require_staff()?;
        if new.question.trim().is_empty() || new.answer.trim().is_empty() {
            return Err(TriviaError::Validation(
                "question and answer are required".to_string(),
            ));
        }
        if new.max_wager < 0 {
            return Err(TriviaError::Validation(
                "max wager cannot be negative".to_string(),
            ));
        }

        let games = self.games.read().await;
        if !games.contains_key(game_id) {
            return Err(TriviaError::not_found("game", game_id));
        }
        let mut final_rounds = self.final_rounds.write().await;
        if final_rounds.values().any(|f| f.game_id == game_id) {
            return Err(TriviaError::ConstraintViolation(
                "a game has at most one final round".to_string(),
            ));
        }

        let final_round = FinalRound {
            id: new_id(),
            game_id: game_id.to_string(),
            category: new.category,
            status: FinalRoundStatus::NotOpen,
            question: new.question,
            answer: new.answer,
            alt_answers: new.alt_answers.filter(|a| !a.trim().is_empty()),
            max_wager: new.max_wager,
        };
        final_rounds.insert(final_round.id.clone(), final_round.clone());
        tracing::info!("Created final round for game {}", game_id);
        Ok(final_round)
    }

    pub async fn final_round_for_game(&self, game_id: &str) -> TriviaResult<FinalRound> {
        self.final_rounds
            .read()
            .await
            .values()
            .find(|f| f.game_id == game_id)
            .cloned()
            .ok_or_else(|| TriviaError::not_found("final round", game_id))
    }

    /// Move the final round one step forward (staff only)
    pub async fn set_final_round_status(
        &self,
        actor: &Actor,
        final_round_id: &str,
        status: FinalRoundStatus,
    ) -> TriviaResult<FinalRound> {
        actor.require_staff()?;
        let final_round = {
            let mut final_rounds = self.final_rounds.write().await;
            let final_round = final_rounds
                .get_mut(final_round_id)
                .ok_or_else(|| TriviaError::not_found("final round", final_round_id))?;
            lifecycle::check_final_round_transition(final_round.status, status)?;
            final_round.status = status;
            tracing::info!("Final round {} is now {:?}", final_round_id, status);
            final_round.clone()
        };

        self.broadcast_to_all(ServerMessage::FinalRoundStatus {
            final_round_id: final_round.id.clone(),
            game_id: final_round.game_id.clone(),
            status,
        });
        self.broadcast_scoreboard(&final_round.game_id).await;
        Ok(final_round)
    }

    /// Place or change the acting player's wager. Only during the Wager stage.
    ///
    /// The cap is checked against the player's ordinary-round score read in the
    /// same locked section as the write.
    pub async fn submit_wager(
        &self,
        actor: &Actor,
        game_id: &str,
        wager: i64,
    ) -> TriviaResult<FinalResponse> {
        let player_id = actor.require_player()?;

        let games = self.games.read().await;
        let rounds = self.rounds.read().await;
        let questions = self.questions.read().await;
        let responses = self.responses.read().await;
        let double_rounds = self.double_rounds.read().await;
        let final_rounds = self.final_rounds.read().await;
        let mut final_responses = self.final_responses.write().await;

        let game = games
            .get(game_id)
            .ok_or_else(|| TriviaError::not_found("game", game_id))?;
        ensure_participant(game, player_id)?;
        let final_round = final_rounds
            .values()
            .find(|f| f.game_id == game_id)
            .ok_or_else(|| TriviaError::not_found("final round", game_id))?;
        lifecycle::check_wager_window(final_round)?;

        let current_score = collect_snapshot(
            game,
            &rounds,
            &questions,
            &responses,
            &double_rounds,
            &final_rounds,
            &final_responses,
        )
        .rounds_total(player_id);
        lifecycle::validate_wager(wager, final_round.max_wager, current_score)?;

        let existing_id = final_responses
            .values()
            .find(|r| r.final_round_id == final_round.id && r.player_id == *player_id)
            .map(|r| r.id.clone());

        let final_response = match existing_id.and_then(|id| final_responses.get_mut(&id)) {
            Some(existing) => {
                existing.wager = wager;
                existing.clone()
            }
            None => {
                let final_response = FinalResponse {
                    id: new_id(),
                    final_round_id: final_round.id.clone(),
                    player_id: player_id.clone(),
                    wager,
                    response: String::new(),
                    correct: false,
                };
                final_responses.insert(final_response.id.clone(), final_response.clone());
                final_response
            }
        };

        tracing::info!("Player {} wagered {} in game {}", player_id, wager, game_id);
        Ok(final_response)
    }

    /// Record the acting player's final answer. Requires a wager and AnswerTime.
    pub async fn submit_final_answer(
        &self,
        actor: &Actor,
        game_id: &str,
        text: String,
    ) -> TriviaResult<FinalResponse> {
        let player_id = actor.require_player()?;

        let games = self.games.read().await;
        let final_rounds = self.final_rounds.read().await;
        let mut final_responses = self.final_responses.write().await;

        let game = games
            .get(game_id)
            .ok_or_else(|| TriviaError::not_found("game", game_id))?;
        ensure_participant(game, player_id)?;
        let final_round = final_rounds
            .values()
            .find(|f| f.game_id == game_id)
            .ok_or_else(|| TriviaError::not_found("final round", game_id))?;
        lifecycle::check_final_answer_window(final_round)?;

        let final_response = final_responses
            .values_mut()
            .find(|r| r.final_round_id == final_round.id && r.player_id == *player_id)
            .ok_or_else(|| TriviaError::not_found("final response", player_id.clone()))?;
        final_response.response = text;
        Ok(final_response.clone())
    }

    /// Staff judgement of a final answer, during CheckAnswers
    pub async fn mark_final_response(
        &self,
        actor: &Actor,
        final_response_id: &str,
        correct: bool,
    ) -> TriviaResult<FinalResponse> {
        actor.require_staff()?;
        let final_rounds = self.final_rounds.read().await;
        let mut final_responses = self.final_responses.write().await;

        let final_response = final_responses
            .get_mut(final_response_id)
            .ok_or_else(|| TriviaError::not_found("final response", final_response_id))?;
        let final_round = final_rounds
            .get(&final_response.final_round_id)
            .ok_or_else(|| {
                TriviaError::not_found("final round", final_response.final_round_id.clone())
            })?;
        if final_round.status != FinalRoundStatus::CheckAnswers {
            return Err(TriviaError::PermissionDenied(format!(
                "final answers are judged during CheckAnswers (final round is {:?})",
                final_round.status
            )));
        }

        final_response.correct = correct;
        Ok(final_response.clone())
    }

    /// All final responses for a game, for staff review
    pub async fn final_responses_for_game(
        &self,
        actor: &Actor,
        game_id: &str,
    ) -> TriviaResult<Vec<FinalResponse>> {
        actor.require_staff()?;
        let final_round = self.final_round_for_game(game_id).await?;
        let mut list: Vec<FinalResponse> = self
            .final_responses
            .read()
            .await
            .values()
            .filter(|r| r.final_round_id == final_round.id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        Ok(list)
    }
}
