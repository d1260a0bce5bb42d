use super::game::ensure_participant;
use super::{new_id, AppState};
use crate::error::{TriviaError, TriviaResult};
use crate::lifecycle;
use crate::types::*;

impl AppState {
    /// Pick (or change) the round the acting player wants scored double.
    ///
    /// One selection per player per game, only while every round in the
    /// game is still NotOpen.
    pub async fn choose_double_round(
        &self,
        actor: &Actor,
        game_id: &str,
        round_id: &str,
    ) -> TriviaResult<DoubleRound> {
        let player_id = actor.require_player()?;

        let games = self.games.read().await;
        let rounds = self.rounds.read().await;

        let game = games
            .get(game_id)
            .ok_or_else(|| TriviaError::not_found("game", game_id))?;
        ensure_participant(game, player_id)?;

        let round = rounds
            .get(round_id)
            .ok_or_else(|| TriviaError::not_found("round", round_id))?;
        if round.game_id != game_id {
            return Err(TriviaError::Validation(format!(
                "round '{}' is not part of '{}'",
                round.category, game.title
            )));
        }

        let game_rounds: Vec<Round> = rounds
            .values()
            .filter(|r| r.game_id == game_id)
            .cloned()
            .collect();
        lifecycle::check_double_round_window(&game_rounds)?;

        let mut double_rounds = self.double_rounds.write().await;
        let existing_id = double_rounds
            .values()
            .find(|d| d.player_id == *player_id && d.game_id == game_id)
            .map(|d| d.id.clone());

        let double_round = match existing_id.and_then(|id| double_rounds.get_mut(&id)) {
            Some(existing) => {
                existing.round_id = round_id.to_string();
                existing.clone()
            }
            None => {
                let double_round = DoubleRound {
                    id: new_id(),
                    game_id: game_id.to_string(),
                    player_id: player_id.clone(),
                    round_id: round_id.to_string(),
                    multiplier: self.scoring.double_multiplier,
                };
                double_rounds.insert(double_round.id.clone(), double_round.clone());
                double_round
            }
        };

        tracing::info!(
            "Player {} doubled round '{}' in game {}",
            player_id,
            round.category,
            game_id
        );
        Ok(double_round)
    }

    pub async fn get_double_round(
        &self,
        actor: &Actor,
        game_id: &str,
    ) -> TriviaResult<Option<DoubleRound>> {
        let player_id = actor.require_player()?;
        Ok(self
            .double_rounds
            .read()
            .await
            .values()
            .find(|d| d.player_id == *player_id && d.game_id == game_id)
            .cloned())
    }
}
