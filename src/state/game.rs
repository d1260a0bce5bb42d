use super::{new_id, AppState};
use crate::error::{TriviaError, TriviaResult};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// A game with its rounds in order and its final round, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDetail {
    pub game: Game,
    pub rounds: Vec<Round>,
    pub final_round: Option<FinalRound>,
}

impl AppState {
    /// Create a new game (staff only)
    pub async fn create_game(&self, actor: &Actor, title: String) -> TriviaResult<Game> {
        actor.require_staff()?;
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(TriviaError::Validation(
                "game title cannot be empty".to_string(),
            ));
        }

        let game = Game {
            id: new_id(),
            title,
            pub_date: chrono::Utc::now().to_rfc3339(),
            completed: false,
            players: Vec::new(),
        };

        self.games
            .write()
            .await
            .insert(game.id.clone(), game.clone());
        tracing::info!("Created game '{}' ({})", game.title, game.id);
        Ok(game)
    }

    pub async fn get_game(&self, game_id: &str) -> TriviaResult<Game> {
        self.games
            .read()
            .await
            .get(game_id)
            .cloned()
            .ok_or_else(|| TriviaError::not_found("game", game_id))
    }

    /// All games, newest first
    pub async fn list_games(&self) -> Vec<Game> {
        let mut games: Vec<Game> = self.games.read().await.values().cloned().collect();
        games.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then_with(|| b.id.cmp(&a.id)));
        games
    }

    /// Add the acting player to the game's participants (idempotent)
    pub async fn join_game(&self, actor: &Actor, game_id: &str) -> TriviaResult<Game> {
        let player_id = actor.require_player()?;
        if !self.players.read().await.contains_key(player_id) {
            return Err(TriviaError::not_found("player", player_id.clone()));
        }

        let mut games = self.games.write().await;
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| TriviaError::not_found("game", game_id))?;
        if game.completed {
            return Err(TriviaError::PermissionDenied(
                "the game is already over".to_string(),
            ));
        }
        if !game.has_player(player_id) {
            game.players.push(player_id.clone());
            tracing::info!("Player {} joined game {}", player_id, game_id);
        }
        Ok(game.clone())
    }

    /// Game with ordered rounds and final round
    pub async fn game_detail(&self, game_id: &str) -> TriviaResult<GameDetail> {
        let games = self.games.read().await;
        let rounds = self.rounds.read().await;
        let final_rounds = self.final_rounds.read().await;

        let game = games
            .get(game_id)
            .cloned()
            .ok_or_else(|| TriviaError::not_found("game", game_id))?;
        let mut game_rounds: Vec<Round> = rounds
            .values()
            .filter(|r| r.game_id == game_id)
            .cloned()
            .collect();
        game_rounds.sort_by_key(|r| r.number);
        let final_round = final_rounds
            .values()
            .find(|f| f.game_id == game_id)
            .cloned();

        Ok(GameDetail {
            game,
            rounds: game_rounds,
            final_round,
        })
    }

    /// Mark the game completed once every round and the final round are closed
    pub async fn complete_game(&self, actor: &Actor, game_id: &str) -> TriviaResult<Game> {
        actor.require_staff()?;
        let mut games = self.games.write().await;
        let rounds = self.rounds.read().await;
        let final_rounds = self.final_rounds.read().await;

        let game = games
            .get_mut(game_id)
            .ok_or_else(|| TriviaError::not_found("game", game_id))?;

        if let Some(open) = rounds
            .values()
            .find(|r| r.game_id == game_id && r.status != RoundStatus::Closed)
        {
            return Err(TriviaError::Validation(format!(
                "round '{}' is still {:?}",
                open.category, open.status
            )));
        }
        if let Some(open) = final_rounds
            .values()
            .find(|f| f.game_id == game_id && f.status != FinalRoundStatus::Closed)
        {
            return Err(TriviaError::Validation(format!(
                "the final round is still {:?}",
                open.status
            )));
        }

        game.completed = true;
        tracing::info!("Game '{}' ({}) completed", game.title, game.id);
        Ok(game.clone())
    }

    /// Delete a game and everything it owns
    pub async fn delete_game(&self, actor: &Actor, game_id: &str) -> TriviaResult<()> {
        actor.require_staff()?;
        let mut games = self.games.write().await;
        let mut rounds = self.rounds.write().await;
        let mut questions = self.questions.write().await;
        let mut responses = self.responses.write().await;
        let mut double_rounds = self.double_rounds.write().await;
        let mut final_rounds = self.final_rounds.write().await;
        let mut final_responses = self.final_responses.write().await;

        if games.remove(game_id).is_none() {
            return Err(TriviaError::not_found("game", game_id));
        }

        let round_ids: Vec<RoundId> = rounds
            .values()
            .filter(|r| r.game_id == game_id)
            .map(|r| r.id.clone())
            .collect();
        rounds.retain(|_, r| r.game_id != game_id);

        let question_ids: Vec<QuestionId> = questions
            .values()
            .filter(|q| round_ids.contains(&q.round_id))
            .map(|q| q.id.clone())
            .collect();
        questions.retain(|_, q| !round_ids.contains(&q.round_id));
        responses.retain(|_, r| !question_ids.contains(&r.question_id));
        double_rounds.retain(|_, d| d.game_id != game_id);

        let final_ids: Vec<FinalRoundId> = final_rounds
            .values()
            .filter(|f| f.game_id == game_id)
            .map(|f| f.id.clone())
            .collect();
        final_rounds.retain(|_, f| f.game_id != game_id);
        final_responses.retain(|_, r| !final_ids.contains(&r.final_round_id));

        tracing::info!(
            "Deleted game {} with {} rounds and {} questions",
            game_id,
            round_ids.len(),
            question_ids.len()
        );
        Ok(())
    }
}

/// Players must have joined a game before submitting anything to it
pub(super) fn ensure_participant(game: &Game, player_id: &str) -> TriviaResult<()> {
    if game.has_player(player_id) {
        Ok(())
    } else {
        Err(TriviaError::PermissionDenied(format!(
            "you have not joined '{}'",
            game.title
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_create_game_requires_staff() {
        let state = AppState::new();
        let player = state.create_player().await;
        let err = state
            .create_game(&Actor::player(&player.id), "Nope".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");
        assert!(state.list_games().await.is_empty());
    }

    #[tokio::test]
    async fn test_join_game_is_idempotent() {
        let s = seeded().await;
        let game = s
            .state
            .join_game(&Actor::player(&s.alice.id), &s.game.id)
            .await
            .unwrap();
        assert_eq!(game.players.len(), 2);
    }

    #[tokio::test]
    async fn test_join_unknown_game() {
        let s = seeded().await;
        let err = s
            .state
            .join_game(&Actor::player(&s.alice.id), "missing")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_game_detail_orders_rounds() {
        let s = seeded().await;
        s.state
            .create_round(&Actor::staff(), &s.game.id, "Rivers".to_string())
            .await
            .unwrap();
        let detail = s.state.game_detail(&s.game.id).await.unwrap();
        assert_eq!(detail.rounds.len(), 2);
        assert_eq!(detail.rounds[0].category, "Capitals");
        assert_eq!(detail.rounds[1].number, 2);
        assert!(detail.final_round.is_none());
    }

    #[tokio::test]
    async fn test_complete_game_requires_closed_rounds() {
        let s = seeded().await;
        let staff = Actor::staff();
        let err = s.state.complete_game(&staff, &s.game.id).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        advance_round(&s.state, &s.round.id, RoundStatus::AnswerTime).await;
        advance_round(&s.state, &s.round.id, RoundStatus::CheckAnswers).await;
        advance_round(&s.state, &s.round.id, RoundStatus::Closed).await;

        let game = s.state.complete_game(&staff, &s.game.id).await.unwrap();
        assert!(game.completed);
    }

    #[tokio::test]
    async fn test_delete_game_cascades() {
        let s = seeded().await;
        advance_round(&s.state, &s.round.id, RoundStatus::AnswerTime).await;
        s.state
            .submit_response(&Actor::player(&s.alice.id), &s.questions[0].id, "Paris".to_string())
            .await
            .unwrap();

        s.state.delete_game(&Actor::staff(), &s.game.id).await.unwrap();

        assert!(s.state.games.read().await.is_empty());
        assert!(s.state.rounds.read().await.is_empty());
        assert!(s.state.questions.read().await.is_empty());
        assert!(s.state.responses.read().await.is_empty());
        // Players are not owned by games
        assert_eq!(s.state.players.read().await.len(), 2);
    }
}
