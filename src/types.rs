use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type GameId = String;
pub type RoundId = String;
pub type QuestionId = String;
pub type ResponseId = String;
pub type DoubleRoundId = String;
pub type FinalRoundId = String;
pub type FinalResponseId = String;
pub type PlayerId = String;

/// Status of an ordinary round. The numeric code is the position in the lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    NotOpen,
    AnswerTime,
    CheckAnswers,
    Closed,
}

impl RoundStatus {
    pub fn code(self) -> u32 {
        match self {
            RoundStatus::NotOpen => 0,
            RoundStatus::AnswerTime => 1,
            RoundStatus::CheckAnswers => 2,
            RoundStatus::Closed => 3,
        }
    }

    /// The only status this one may move to, if any
    pub fn next(self) -> Option<RoundStatus> {
        match self {
            RoundStatus::NotOpen => Some(RoundStatus::AnswerTime),
            RoundStatus::AnswerTime => Some(RoundStatus::CheckAnswers),
            RoundStatus::CheckAnswers => Some(RoundStatus::Closed),
            RoundStatus::Closed => None,
        }
    }
}

/// Status of the wagering final round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalRoundStatus {
    NotOpen,
    Wager,
    AnswerTime,
    CheckAnswers,
    Closed,
}

impl FinalRoundStatus {
    pub fn code(self) -> u32 {
        match self {
            FinalRoundStatus::NotOpen => 0,
            FinalRoundStatus::Wager => 1,
            FinalRoundStatus::AnswerTime => 2,
            FinalRoundStatus::CheckAnswers => 3,
            FinalRoundStatus::Closed => 4,
        }
    }

    pub fn next(self) -> Option<FinalRoundStatus> {
        match self {
            FinalRoundStatus::NotOpen => Some(FinalRoundStatus::Wager),
            FinalRoundStatus::Wager => Some(FinalRoundStatus::AnswerTime),
            FinalRoundStatus::AnswerTime => Some(FinalRoundStatus::CheckAnswers),
            FinalRoundStatus::CheckAnswers => Some(FinalRoundStatus::Closed),
            FinalRoundStatus::Closed => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub pub_date: String, // RFC 3339
    pub completed: bool,
    /// Participating players (unordered, no duplicates)
    pub players: Vec<PlayerId>,
}

impl Game {
    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p == player_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub game_id: GameId,
    /// 1-based position within the game
    pub number: u32,
    pub category: String,
    pub status: RoundStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub round_id: RoundId,
    pub question: String,
    pub answer: String,
    /// Comma-separated alternate answers
    pub alt_answers: Option<String>,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: ResponseId,
    pub question_id: QuestionId,
    pub player_id: PlayerId,
    pub response: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoubleRound {
    pub id: DoubleRoundId,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub round_id: RoundId,
    pub multiplier: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalRound {
    pub id: FinalRoundId,
    pub game_id: GameId,
    pub category: String,
    pub status: FinalRoundStatus,
    pub question: String,
    pub answer: String,
    pub alt_answers: Option<String>,
    /// 0 means the wager is capped by the player's current score
    pub max_wager: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalResponse {
    pub id: FinalResponseId,
    pub final_round_id: FinalRoundId,
    pub player_id: PlayerId,
    pub wager: i64,
    pub response: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Short join code
    pub token: String,
    pub display_name: Option<String>,
}

/// Who is performing an operation. Passed explicitly, never read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub player_id: Option<PlayerId>,
    pub is_staff: bool,
}

impl Actor {
    pub fn staff() -> Self {
        Self {
            player_id: None,
            is_staff: true,
        }
    }

    pub fn player(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: Some(player_id.into()),
            is_staff: false,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            player_id: None,
            is_staff: false,
        }
    }

    pub fn require_staff(&self) -> crate::error::TriviaResult<()> {
        if self.is_staff {
            Ok(())
        } else {
            Err(crate::error::TriviaError::PermissionDenied(
                "staff only".to_string(),
            ))
        }
    }

    pub fn require_player(&self) -> crate::error::TriviaResult<&PlayerId> {
        self.player_id.as_ref().ok_or_else(|| {
            crate::error::TriviaError::PermissionDenied("a player identity is required".to_string())
        })
    }
}

/// Input for a new question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub alt_answers: Option<String>,
    /// Falls back to the configured default when absent
    #[serde(default)]
    pub points: Option<i64>,
}

/// Input for the final round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFinalRound {
    pub category: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub alt_answers: Option<String>,
    #[serde(default)]
    pub max_wager: i64,
}

/// Key of one entry in a player's scorecard. The total is kept separately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "round_id", rename_all = "lowercase")]
pub enum RoundKey {
    Round(RoundId),
    Final,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreEntry {
    pub key: RoundKey,
    pub score: i64,
}

/// Immutable per-player score record for one game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerScorecard {
    pub player_id: PlayerId,
    /// Rounds in game order, final round last
    pub entries: Vec<ScoreEntry>,
    pub total: i64,
}

impl PlayerScorecard {
    pub fn new(player_id: PlayerId, entries: Vec<ScoreEntry>) -> Self {
        let total = entries.iter().map(|e| e.score).sum();
        Self {
            player_id,
            entries,
            total,
        }
    }

    pub fn score_for(&self, key: &RoundKey) -> Option<i64> {
        self.entries.iter().find(|e| &e.key == key).map(|e| e.score)
    }
}
