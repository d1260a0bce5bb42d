use super::game::ensure_participant;
use super::{new_id, AppState};
use crate::error::{TriviaError, TriviaResult};
use crate::lifecycle;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// One response as shown on the round review page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewedResponse {
    pub response_id: ResponseId,
    pub question_id: QuestionId,
    pub question: String,
    pub answer: String,
    pub player_id: PlayerId,
    pub response: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReview {
    pub round: Round,
    pub responses: Vec<ReviewedResponse>,
}

impl AppState {
    /// Create or update the acting player's answer to a question.
    ///
    /// Only allowed while the question's round is in AnswerTime. A player
    /// holds at most one response per question; resubmitting edits it.
    pub async fn submit_response(
        &self,
        actor: &Actor,
        question_id: &str,
        text: String,
    ) -> TriviaResult<Response> {
        let player_id = actor.require_player()?;

        let games = self.games.read().await;
        let rounds = self.rounds.read().await;
        let questions = self.questions.read().await;

        let question = questions
            .get(question_id)
            .ok_or_else(|| TriviaError::not_found("question", question_id))?;
        let round = rounds
            .get(&question.round_id)
            .ok_or_else(|| TriviaError::not_found("round", question.round_id.clone()))?;
        let game = games
            .get(&round.game_id)
            .ok_or_else(|| TriviaError::not_found("game", round.game_id.clone()))?;
        ensure_participant(game, player_id)?;
        lifecycle::check_response_window(round)?;

        let mut responses = self.responses.write().await;
        let existing_id = responses
            .values()
            .find(|r| r.player_id == *player_id && r.question_id == question_id)
            .map(|r| r.id.clone());

        let response = match existing_id.and_then(|id| responses.get_mut(&id)) {
            Some(response) => {
                response.response = text;
                response.correct = false;
                response.clone()
            }
            None => {
                let response = Response {
                    id: new_id(),
                    question_id: question_id.to_string(),
                    player_id: player_id.clone(),
                    response: text,
                    correct: false,
                };
                responses.insert(response.id.clone(), response.clone());
                response
            }
        };

        tracing::debug!("Player {} answered question {}", player_id, question_id);
        Ok(response)
    }

    /// The acting player's own responses in a round
    pub async fn my_responses(&self, actor: &Actor, round_id: &str) -> TriviaResult<Vec<Response>> {
        let player_id = actor.require_player()?;
        let rounds = self.rounds.read().await;
        if !rounds.contains_key(round_id) {
            return Err(TriviaError::not_found("round", round_id));
        }
        let questions = self.questions.read().await;
        let responses = self.responses.read().await;

        Ok(responses
            .values()
            .filter(|r| r.player_id == *player_id)
            .filter(|r| {
                questions
                    .get(&r.question_id)
                    .is_some_and(|q| q.round_id == round_id)
            })
            .cloned()
            .collect())
    }

    /// Mark a response right or wrong.
    ///
    /// Staff may override at any time; other players may check during
    /// CheckAnswers, but never their own answers.
    pub async fn set_response_correct(
        &self,
        actor: &Actor,
        response_id: &str,
        correct: bool,
    ) -> TriviaResult<Response> {
        let rounds = self.rounds.read().await;
        let questions = self.questions.read().await;
        let mut responses = self.responses.write().await;

        let response = responses
            .get_mut(response_id)
            .ok_or_else(|| TriviaError::not_found("response", response_id))?;
        let question = questions
            .get(&response.question_id)
            .ok_or_else(|| TriviaError::not_found("question", response.question_id.clone()))?;
        let round = rounds
            .get(&question.round_id)
            .ok_or_else(|| TriviaError::not_found("round", question.round_id.clone()))?;
        lifecycle::check_review_permission(actor, round, response)?;

        response.correct = correct;
        tracing::info!(
            "Response {} marked {} (staff: {})",
            response_id,
            if correct { "correct" } else { "incorrect" },
            actor.is_staff
        );
        Ok(response.clone())
    }

    /// Every answer given in a round. Staff anytime, players once it is closed.
    pub async fn round_review(&self, actor: &Actor, round_id: &str) -> TriviaResult<RoundReview> {
        let rounds = self.rounds.read().await;
        let questions = self.questions.read().await;
        let responses = self.responses.read().await;

        let round = rounds
            .get(round_id)
            .ok_or_else(|| TriviaError::not_found("round", round_id))?;
        lifecycle::check_round_review(actor, round)?;

        let mut reviewed: Vec<ReviewedResponse> = responses
            .values()
            .filter_map(|r| {
                let q = questions.get(&r.question_id)?;
                (q.round_id == round_id).then(|| ReviewedResponse {
                    response_id: r.id.clone(),
                    question_id: q.id.clone(),
                    question: q.question.clone(),
                    answer: q.answer.clone(),
                    player_id: r.player_id.clone(),
                    response: r.response.clone(),
                    correct: r.correct,
                })
            })
            .collect();
        reviewed.sort_by(|a, b| {
            a.question_id
                .cmp(&b.question_id)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        Ok(RoundReview {
            round: round.clone(),
            responses: reviewed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_submit_outside_answer_time_rejected() {
        let s = seeded().await;
        let alice = Actor::player(&s.alice.id);
        let err = s
            .state
            .submit_response(&alice, &s.questions[0].id, "Paris".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");
        assert!(s.state.responses.read().await.is_empty());

        advance_round(&s.state, &s.round.id, RoundStatus::AnswerTime).await;
        advance_round(&s.state, &s.round.id, RoundStatus::CheckAnswers).await;
        let err = s
            .state
            .submit_response(&alice, &s.questions[0].id, "Paris".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn test_resubmission_updates_in_place() {
        let s = seeded().await;
        advance_round(&s.state, &s.round.id, RoundStatus::AnswerTime).await;
        let alice = Actor::player(&s.alice.id);

        let first = s
            .state
            .submit_response(&alice, &s.questions[0].id, "Lyon".to_string())
            .await
            .unwrap();
        let second = s
            .state
            .submit_response(&alice, &s.questions[0].id, "Paris".to_string())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let responses = s.state.responses.read().await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[&first.id].response, "Paris");
    }

    #[tokio::test]
    async fn test_concurrent_submissions_leave_one_row() {
        let s = seeded().await;
        advance_round(&s.state, &s.round.id, RoundStatus::AnswerTime).await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let state = s.state.clone();
            let actor = Actor::player(&s.alice.id);
            let question_id = s.questions[1].id.clone();
            handles.push(tokio::spawn(async move {
                state
                    .submit_response(&actor, &question_id, format!("guess {}", i))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(s.state.responses.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_non_participant_rejected() {
        let s = seeded().await;
        advance_round(&s.state, &s.round.id, RoundStatus::AnswerTime).await;
        let carol = s.state.create_player().await;
        let err = s
            .state
            .submit_response(&Actor::player(&carol.id), &s.questions[0].id, "Paris".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn test_unknown_question() {
        let s = seeded().await;
        let err = s
            .state
            .submit_response(&Actor::player(&s.alice.id), "nope", "x".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_peer_checking_rules() {
        let s = seeded().await;
        advance_round(&s.state, &s.round.id, RoundStatus::AnswerTime).await;
        let alice = Actor::player(&s.alice.id);
        let bob = Actor::player(&s.bob.id);
        let response = s
            .state
            .submit_response(&alice, &s.questions[1].id, "Tokio".to_string())
            .await
            .unwrap();

        // Not checking time yet
        assert!(s
            .state
            .set_response_correct(&bob, &response.id, true)
            .await
            .is_err());

        advance_round(&s.state, &s.round.id, RoundStatus::CheckAnswers).await;

        // Own answers are off limits
        let err = s
            .state
            .set_response_correct(&alice, &response.id, true)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");

        let checked = s
            .state
            .set_response_correct(&bob, &response.id, true)
            .await
            .unwrap();
        assert!(checked.correct);
    }

    #[tokio::test]
    async fn test_round_review_visibility() {
        let s = seeded().await;
        advance_round(&s.state, &s.round.id, RoundStatus::AnswerTime).await;
        let alice = Actor::player(&s.alice.id);
        s.state
            .submit_response(&alice, &s.questions[0].id, "Paris".to_string())
            .await
            .unwrap();

        assert!(s.state.round_review(&alice, &s.round.id).await.is_err());
        let review = s
            .state
            .round_review(&Actor::staff(), &s.round.id)
            .await
            .unwrap();
        assert_eq!(review.responses.len(), 1);
        assert_eq!(review.responses[0].answer, "Paris");

        let mine = s.state.my_responses(&alice, &s.round.id).await.unwrap();
        assert_eq!(mine.len(), 1);
    }
}
