use super::AppState;
use crate::error::{TriviaError, TriviaResult};
use crate::protocol::ServerMessage;
use crate::scoring::GameSnapshot;
use crate::types::*;
use std::collections::HashMap;

/// Copy one game's rows out of already-locked tables
#[allow(clippy::too_many_arguments)]
pub(super) fn collect_snapshot(
    game: &Game,
    rounds: &HashMap<RoundId, Round>,
    questions: &HashMap<QuestionId, Question>,
    responses: &HashMap<ResponseId, Response>,
    double_rounds: &HashMap<DoubleRoundId, DoubleRound>,
    final_rounds: &HashMap<FinalRoundId, FinalRound>,
    final_responses: &HashMap<FinalResponseId, FinalResponse>,
) -> GameSnapshot {
    let mut game_rounds: Vec<Round> = rounds
        .values()
        .filter(|r| r.game_id == game.id)
        .cloned()
        .collect();
    game_rounds.sort_by_key(|r| r.number);

    let game_questions: Vec<Question> = questions
        .values()
        .filter(|q| game_rounds.iter().any(|r| r.id == q.round_id))
        .cloned()
        .collect();
    let game_responses: Vec<Response> = responses
        .values()
        .filter(|r| game_questions.iter().any(|q| q.id == r.question_id))
        .cloned()
        .collect();
    let game_doubles: Vec<DoubleRound> = double_rounds
        .values()
        .filter(|d| d.game_id == game.id)
        .cloned()
        .collect();
    let final_round = final_rounds
        .values()
        .find(|f| f.game_id == game.id)
        .cloned();
    let game_final_responses: Vec<FinalResponse> = match &final_round {
        Some(f) => final_responses
            .values()
            .filter(|r| r.final_round_id == f.id)
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    GameSnapshot {
        game: game.clone(),
        rounds: game_rounds,
        questions: game_questions,
        responses: game_responses,
        double_rounds: game_doubles,
        final_round,
        final_responses: game_final_responses,
    }
}

impl AppState {
    /// A consistent read of everything that feeds a game's scores
    pub async fn game_snapshot(&self, game_id: &str) -> TriviaResult<GameSnapshot> {
        let games = self.games.read().await;
        let rounds = self.rounds.read().await;
        let questions = self.questions.read().await;
        let responses = self.responses.read().await;
        let double_rounds = self.double_rounds.read().await;
        let final_rounds = self.final_rounds.read().await;
        let final_responses = self.final_responses.read().await;

        let game = games
            .get(game_id)
            .ok_or_else(|| TriviaError::not_found("game", game_id))?;
        Ok(collect_snapshot(
            game,
            &rounds,
            &questions,
            &responses,
            &double_rounds,
            &final_rounds,
            &final_responses,
        ))
    }

    /// A player's score for one round
    pub async fn round_score(&self, round_id: &str, player_id: &str) -> TriviaResult<i64> {
        let round = self.get_round(round_id).await?;
        let snapshot = self.game_snapshot(&round.game_id).await?;
        Ok(snapshot.round_score(round_id, player_id))
    }

    /// A player's signed final-round contribution
    pub async fn final_score(&self, game_id: &str, player_id: &str) -> TriviaResult<i64> {
        Ok(self.game_snapshot(game_id).await?.final_score(player_id))
    }

    /// Per-round breakdown and total for every participating player
    pub async fn game_scores(&self, game_id: &str) -> TriviaResult<Vec<PlayerScorecard>> {
        Ok(self.game_snapshot(game_id).await?.scoreboard())
    }

    /// Recompute and push the scoreboard to every client
    pub async fn broadcast_scoreboard(&self, game_id: &str) {
        match self.game_scores(game_id).await {
            Ok(players) => self.broadcast_to_all(ServerMessage::Scoreboard {
                game_id: game_id.to_string(),
                players,
            }),
            Err(e) => tracing::warn!("Could not compute scoreboard for {}: {}", game_id, e),
        }
    }
}
