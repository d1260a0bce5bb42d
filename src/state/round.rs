use super::{new_id, AppState};
use crate::error::{TriviaError, TriviaResult};
use crate::lifecycle;
use crate::protocol::ServerMessage;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Outcome of a round status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTransition {
    pub round: Round,
    /// Responses marked correct by the automatic check (CheckAnswers only)
    pub auto_checked: usize,
}

impl AppState {
    /// Create a new round at the end of the game (staff only)
    pub async fn create_round(
        &self,
        actor: &Actor,
        game_id: &str,
        category: String,
    ) -> TriviaResult<Round> {
        actor.require_staff()?;
        let category = category.trim().to_string();
        if category.is_empty() {
            return Err(TriviaError::Validation(
                "round category cannot be empty".to_string(),
            ));
        }

        let games = self.games.read().await;
        if !games.contains_key(game_id) {
            return Err(TriviaError::not_found("game", game_id));
        }
        let mut rounds = self.rounds.write().await;
        let number = rounds.values().filter(|r| r.game_id == game_id).count() as u32 + 1;

        let round = Round {
            id: new_id(),
            game_id: game_id.to_string(),
            number,
            category,
            status: RoundStatus::NotOpen,
        };
        rounds.insert(round.id.clone(), round.clone());
        tracing::info!("Created round {} '{}' in game {}", number, round.category, game_id);
        Ok(round)
    }

    pub async fn get_round(&self, round_id: &str) -> TriviaResult<Round> {
        self.rounds
            .read()
            .await
            .get(round_id)
            .cloned()
            .ok_or_else(|| TriviaError::not_found("round", round_id))
    }

    /// Add a question to a round (staff only)
    pub async fn add_question(
        &self,
        actor: &Actor,
        round_id: &str,
        new: NewQuestion,
    ) -> TriviaResult<Question> {
        actor.require_staff()?;
        if new.question.trim().is_empty() || new.answer.trim().is_empty() {
            return Err(TriviaError::Validation(
                "question and answer are required".to_string(),
            ));
        }
        let points = new.points.unwrap_or(self.scoring.default_points);
        if points < 0 {
            return Err(TriviaError::Validation(
                "points cannot be negative".to_string(),
            ));
        }

        let rounds = self.rounds.read().await;
        if !rounds.contains_key(round_id) {
            return Err(TriviaError::not_found("round", round_id));
        }

        let question = Question {
            id: new_id(),
            round_id: round_id.to_string(),
            question: new.question,
            answer: new.answer,
            alt_answers: new.alt_answers.filter(|a| !a.trim().is_empty()),
            points,
        };
        self.questions
            .write()
            .await
            .insert(question.id.clone(), question.clone());
        Ok(question)
    }

    pub async fn get_question(&self, question_id: &str) -> TriviaResult<Question> {
        self.questions
            .read()
            .await
            .get(question_id)
            .cloned()
            .ok_or_else(|| TriviaError::not_found("question", question_id))
    }

    /// Questions of a round in insertion order
    pub async fn round_questions(&self, round_id: &str) -> TriviaResult<Vec<Question>> {
        let rounds = self.rounds.read().await;
        if !rounds.contains_key(round_id) {
            return Err(TriviaError::not_found("round", round_id));
        }
        let mut questions: Vec<Question> = self
            .questions
            .read()
            .await
            .values()
            .filter(|q| q.round_id == round_id)
            .cloned()
            .collect();
        // ULIDs sort by creation time
        questions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(questions)
    }

    /// Move a round one step forward (staff only).
    ///
    /// Entering CheckAnswers auto-checks every response in the round while the
    /// round, question and response tables are locked, so the new status and
    /// the correctness flags become visible together.
    pub async fn set_round_status(
        &self,
        actor: &Actor,
        round_id: &str,
        status: RoundStatus,
    ) -> TriviaResult<RoundTransition> {
        actor.require_staff()?;

        let transition = {
            let mut rounds = self.rounds.write().await;
            let questions = self.questions.read().await;
            let mut responses = self.responses.write().await;

            let round = rounds
                .get_mut(round_id)
                .ok_or_else(|| TriviaError::not_found("round", round_id))?;
            lifecycle::check_round_transition(round.status, status)?;

            let mut auto_checked = 0;
            if status == RoundStatus::CheckAnswers {
                for response in responses.values_mut() {
                    let Some(question) = questions.get(&response.question_id) else {
                        continue;
                    };
                    if question.round_id == round_id
                        && !response.correct
                        && question.accepts(&response.response)
                    {
                        response.correct = true;
                        auto_checked += 1;
                    }
                }
            }

            round.status = status;
            tracing::info!(
                "Round '{}' ({}) is now {:?}, auto-checked {} responses",
                round.category,
                round.id,
                status,
                auto_checked
            );
            RoundTransition {
                round: round.clone(),
                auto_checked,
            }
        };

        self.broadcast_to_all(ServerMessage::RoundStatus {
            round_id: transition.round.id.clone(),
            game_id: transition.round.game_id.clone(),
            status,
        });
        self.broadcast_scoreboard(&transition.round.game_id).await;

        Ok(transition)
    }
}
