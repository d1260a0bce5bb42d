use super::{new_id, AppState};
use crate::error::{TriviaError, TriviaResult};
use crate::types::*;
use rand::Rng;

/// Safe character set for join codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

/// Generate a random join code
fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

impl AppState {
    /// Create a player with a unique join code
    pub async fn create_player(&self) -> Player {
        let mut players = self.players.write().await;
        let token = loop {
            let code = generate_join_code();
            if !players.values().any(|p| p.token == code) {
                break code;
            }
        };

        let player = Player {
            id: new_id(),
            token,
            display_name: None,
        };
        players.insert(player.id.clone(), player.clone());
        player
    }

    /// Create a batch of players (staff only)
    pub async fn create_players(&self, actor: &Actor, count: u32) -> TriviaResult<Vec<Player>> {
        actor.require_staff()?;
        if count == 0 || count > 100 {
            return Err(TriviaError::Validation(
                "player count must be between 1 and 100".to_string(),
            ));
        }
        let mut created = Vec::with_capacity(count as usize);
        for _ in 0..count {
            created.push(self.create_player().await);
        }
        tracing::info!("Created {} players", count);
        Ok(created)
    }

    /// Set a display name using the player's join code
    pub async fn register_player(&self, token: &str, display_name: String) -> TriviaResult<Player> {
        let display_name = display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(TriviaError::Validation(
                "display name cannot be empty".to_string(),
            ));
        }
        let mut players = self.players.write().await;
        let player = players
            .values_mut()
            .find(|p| p.token.eq_ignore_ascii_case(token.trim()))
            .ok_or_else(|| TriviaError::not_found("player", token))?;
        player.display_name = Some(display_name);
        Ok(player.clone())
    }

    /// Get player by join code (case-insensitive)
    pub async fn get_player_by_token(&self, token: &str) -> Option<Player> {
        self.players
            .read()
            .await
            .values()
            .find(|p| p.token.eq_ignore_ascii_case(token.trim()))
            .cloned()
    }

    pub async fn get_player(&self, player_id: &str) -> TriviaResult<Player> {
        self.players
            .read()
            .await
            .get(player_id)
            .cloned()
            .ok_or_else(|| TriviaError::not_found("player", player_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_code_alphabet() {
        for _ in 0..50 {
            let code = generate_join_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(!code.contains('0') && !code.contains('O') && !code.contains('I'));
        }
    }

    #[tokio::test]
    async fn test_create_player() {
        let state = AppState::new();
        let player = state.create_player().await;

        assert!(player.display_name.is_none());
        assert!(!player.token.is_empty());
        assert!(state.get_player_by_token(&player.token).await.is_some());
        assert!(state
            .get_player_by_token(&player.token.to_lowercase())
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_register_player() {
        let state = AppState::new();
        let player = state.create_player().await;

        let registered = state
            .register_player(&player.token, "Quizzy McQuizface".to_string())
            .await
            .unwrap();
        assert_eq!(registered.display_name.as_deref(), Some("Quizzy McQuizface"));

        let err = state
            .register_player("ZZZZZ9", "Nobody".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_players_staff_only() {
        let state = AppState::new();
        let err = state
            .create_players(&Actor::anonymous(), 3)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");

        let players = state.create_players(&Actor::staff(), 3).await.unwrap();
        assert_eq!(players.len(), 3);
        assert_eq!(state.players.read().await.len(), 3);
    }
}
