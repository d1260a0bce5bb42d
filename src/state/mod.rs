mod double;
mod final_round;
mod game;
mod import;
mod player;
mod response;
mod round;
mod score;

pub use game::GameDetail;
pub use import::ImportSummary;
pub use response::{ReviewedResponse, RoundReview};
pub use round::RoundTransition;

use crate::config::ScoringConfig;
use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Shared application state.
///
/// Operations touching several tables take their locks in field order
/// (games, rounds, questions, responses, double_rounds, final_rounds,
/// final_responses), so multi-table reads and writes are atomic with
/// respect to each other and cannot deadlock. Players are independent.
#[derive(Clone)]
pub struct AppState {
    pub games: Arc<RwLock<HashMap<GameId, Game>>>,
    pub rounds: Arc<RwLock<HashMap<RoundId, Round>>>,
    pub questions: Arc<RwLock<HashMap<QuestionId, Question>>>,
    pub responses: Arc<RwLock<HashMap<ResponseId, Response>>>,
    pub double_rounds: Arc<RwLock<HashMap<DoubleRoundId, DoubleRound>>>,
    pub final_rounds: Arc<RwLock<HashMap<FinalRoundId, FinalRound>>>,
    pub final_responses: Arc<RwLock<HashMap<FinalResponseId, FinalResponse>>>,
    pub players: Arc<RwLock<HashMap<PlayerId, Player>>>,
    pub scoring: ScoringConfig,
    /// Broadcast channel for status and scoreboard updates to every client
    pub broadcast: broadcast::Sender<ServerMessage>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_scoring(ScoringConfig::default())
    }

    pub fn with_scoring(scoring: ScoringConfig) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            games: Arc::new(RwLock::new(HashMap::new())),
            rounds: Arc::new(RwLock::new(HashMap::new())),
            questions: Arc::new(RwLock::new(HashMap::new())),
            responses: Arc::new(RwLock::new(HashMap::new())),
            double_rounds: Arc::new(RwLock::new(HashMap::new())),
            final_rounds: Arc::new(RwLock::new(HashMap::new())),
            final_responses: Arc::new(RwLock::new(HashMap::new())),
            players: Arc::new(RwLock::new(HashMap::new())),
            scoring,
            broadcast: tx,
        }
    }

    /// Send a message to every connected client
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        // No receivers connected is fine
        let _ = self.broadcast.send(msg);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A game with two joined players and one round holding three questions:
    /// two worth 2 points ("Paris", "Tokyo") and one worth 5 ("Canberra").
    pub struct Seeded {
        pub state: AppState,
        pub game: Game,
        pub round: Round,
        pub questions: Vec<Question>,
        pub alice: Player,
        pub bob: Player,
    }

    pub async fn seeded() -> Seeded {
        let state = AppState::new();
        let staff = Actor::staff();
        let game = state.create_game(&staff, "Pub Quiz".to_string()).await.unwrap();
        let round = state
            .create_round(&staff, &game.id, "Capitals".to_string())
            .await
            .unwrap();

        let mut questions = Vec::new();
        for (q, a, points) in [
            ("Capital of France?", "Paris", None),
            ("Capital of Japan?", "Tokyo", None),
            ("Capital of Australia?", "Canberra", Some(5)),
        ] {
            let question = state
                .add_question(
                    &staff,
                    &round.id,
                    NewQuestion {
                        question: q.to_string(),
                        answer: a.to_string(),
                        alt_answers: None,
                        points,
                    },
                )
                .await
                .unwrap();
            questions.push(question);
        }

        let alice = state.create_player().await;
        let bob = state.create_player().await;
        state
            .join_game(&Actor::player(&alice.id), &game.id)
            .await
            .unwrap();
        let game = state
            .join_game(&Actor::player(&bob.id), &game.id)
            .await
            .unwrap();

        Seeded {
            state,
            game,
            round,
            questions,
            alice,
            bob,
        }
    }

    pub async fn advance_round(state: &AppState, round_id: &str, to: RoundStatus) {
        state
            .set_round_status(&Actor::staff(), round_id, to)
            .await
            .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_state_is_empty() {
        let state = AppState::new();
        assert!(state.games.read().await.is_empty());
        assert!(state.players.read().await.is_empty());
        assert_eq!(state.scoring.default_points, 2);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let state = AppState::new();
        let mut rx = state.broadcast.subscribe();
        state.broadcast_to_all(ServerMessage::GameDeleted {
            game_id: "g1".to_string(),
        });
        match rx.recv().await.unwrap() {
            ServerMessage::GameDeleted { game_id } => assert_eq!(game_id, "g1"),
            other => panic!("unexpected message {:?}", other),
        }
    }
}
