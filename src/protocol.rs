use crate::error::TriviaError;
use crate::state::{GameDetail, ImportSummary, RoundReview};
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Set a display name for the join code on this connection
    RegisterPlayer {
        display_name: String,
    },
    JoinGame {
        game_id: GameId,
    },
    ListGames,
    GetGame {
        game_id: GameId,
    },
    GetRoundQuestions {
        round_id: RoundId,
    },
    SubmitResponse {
        question_id: QuestionId,
        text: String,
    },
    GetMyResponses {
        round_id: RoundId,
    },
    ChooseDoubleRound {
        game_id: GameId,
        round_id: RoundId,
    },
    SubmitWager {
        game_id: GameId,
        wager: i64,
    },
    SubmitFinalAnswer {
        game_id: GameId,
        text: String,
    },
    /// Peer (or staff) review of one response while the round is being checked
    CheckResponse {
        response_id: ResponseId,
        correct: bool,
    },
    GetRoundReview {
        round_id: RoundId,
    },
    GetScores {
        game_id: GameId,
    },
    // Staff-only messages
    StaffCreateGame {
        title: String,
    },
    StaffCreatePlayers {
        count: u32,
    },
    StaffCreateRound {
        game_id: GameId,
        category: String,
    },
    StaffAddQuestion {
        round_id: RoundId,
        question: NewQuestion,
    },
    StaffCreateFinalRound {
        game_id: GameId,
        final_round: NewFinalRound,
    },
    StaffSetRoundStatus {
        round_id: RoundId,
        status: RoundStatus,
    },
    StaffSetFinalRoundStatus {
        final_round_id: FinalRoundId,
        status: FinalRoundStatus,
    },
    StaffMarkFinalResponse {
        final_response_id: FinalResponseId,
        correct: bool,
    },
    StaffListFinalResponses {
        game_id: GameId,
    },
    StaffCompleteGame {
        game_id: GameId,
    },
    StaffDeleteGame {
        game_id: GameId,
    },
    /// Headerless CSV, one question per row
    StaffImportGame {
        title: String,
        csv: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        is_staff: bool,
        player: Option<PlayerInfo>,
        games: Vec<Game>,
        server_now: String,
    },
    Games {
        games: Vec<Game>,
    },
    GameCreated {
        game: Game,
    },
    GameDetail {
        game: Game,
        rounds: Vec<Round>,
        final_round: Option<FinalRoundInfo>,
    },
    RoundQuestions {
        round_id: RoundId,
        questions: Vec<QuestionInfo>,
    },
    PlayersCreated {
        players: Vec<PlayerToken>,
    },
    PlayerRegistered {
        player_id: PlayerId,
        display_name: String,
    },
    Joined {
        game: Game,
    },
    RoundCreated {
        round: Round,
    },
    QuestionAdded {
        question: Question,
    },
    FinalRoundCreated {
        final_round: FinalRound,
    },
    /// Broadcast whenever a round changes status
    RoundStatus {
        round_id: RoundId,
        game_id: GameId,
        status: RoundStatus,
    },
    /// Broadcast whenever the final round changes status
    FinalRoundStatus {
        final_round_id: FinalRoundId,
        game_id: GameId,
        status: FinalRoundStatus,
    },
    /// Reply to the staff member who moved a round
    RoundUpdated {
        round: Round,
        auto_checked: usize,
    },
    FinalRoundUpdated {
        final_round: FinalRound,
    },
    ResponseSaved {
        response: Response,
    },
    MyResponses {
        round_id: RoundId,
        responses: Vec<Response>,
    },
    ResponseChecked {
        response: Response,
    },
    DoubleRoundChosen {
        double_round: DoubleRound,
    },
    WagerAccepted {
        response: FinalResponse,
    },
    FinalAnswerSaved {
        response: FinalResponse,
    },
    FinalResponseMarked {
        response: FinalResponse,
    },
    FinalResponses {
        game_id: GameId,
        responses: Vec<FinalResponse>,
    },
    Scoreboard {
        game_id: GameId,
        players: Vec<PlayerScorecard>,
    },
    RoundReview {
        review: RoundReview,
    },
    GameCompleted {
        game: Game,
    },
    GameDeleted {
        game_id: GameId,
    },
    GameImported {
        summary: ImportSummary,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl From<TriviaError> for ServerMessage {
    fn from(e: TriviaError) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }
    }
}

impl From<GameDetail> for ServerMessage {
    fn from(detail: GameDetail) -> Self {
        ServerMessage::GameDetail {
            game: detail.game,
            rounds: detail.rounds,
            final_round: detail.final_round.as_ref().map(FinalRoundInfo::from),
        }
    }
}

/// What a player sees of a question: never the answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionInfo {
    pub id: QuestionId,
    pub round_id: RoundId,
    pub question: String,
    pub points: i64,
}

impl From<&Question> for QuestionInfo {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            round_id: q.round_id.clone(),
            question: q.question.clone(),
            points: q.points,
        }
    }
}

/// Public view of the final round. The question stays hidden until answer time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalRoundInfo {
    pub id: FinalRoundId,
    pub category: String,
    pub status: FinalRoundStatus,
    pub max_wager: i64,
    pub question: Option<String>,
}

impl From<&FinalRound> for FinalRoundInfo {
    fn from(f: &FinalRound) -> Self {
        Self {
            id: f.id.clone(),
            category: f.category.clone(),
            status: f.status,
            max_wager: f.max_wager,
            question: (f.status >= FinalRoundStatus::AnswerTime).then(|| f.question.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub display_name: Option<String>,
}

impl From<&Player> for PlayerInfo {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            display_name: p.display_name.clone(),
        }
    }
}

/// Player join code handed to staff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerToken {
    pub id: PlayerId,
    pub token: String,
}
