//! Score computation. Everything here is a pure function of a snapshot;
//! scores are recomputed on every call and never stored.

use crate::types::*;
use std::collections::HashSet;

/// Sum of points for the player's correct responses in one round, times the
/// double-round multiplier when the player doubled this round.
pub fn score_round(
    round_id: &str,
    questions: &[Question],
    responses: &[Response],
    double_round: Option<&DoubleRound>,
    player_id: &str,
) -> i64 {
    let round_questions: Vec<&Question> =
        questions.iter().filter(|q| q.round_id == round_id).collect();

    let base: i64 = responses
        .iter()
        .filter(|r| r.player_id == player_id && r.correct)
        .filter_map(|r| round_questions.iter().find(|q| q.id == r.question_id))
        .map(|q| q.points)
        .sum();

    match double_round {
        Some(d) if d.player_id == player_id && d.round_id == round_id => base * d.multiplier,
        _ => base,
    }
}

/// Signed final-round contribution. Nothing counts until the round is closed.
pub fn score_final(status: FinalRoundStatus, final_response: Option<&FinalResponse>) -> i64 {
    if status != FinalRoundStatus::Closed {
        return 0;
    }
    match final_response {
        None => 0,
        Some(r) if r.correct => r.wager,
        Some(r) => -r.wager,
    }
}

/// Consistent copy of everything needed to score one game
#[derive(Debug, Clone)]
pub struct GameSnapshot {
    pub game: Game,
    /// Ordered by round number
    pub rounds: Vec<Round>,
    pub questions: Vec<Question>,
    pub responses: Vec<Response>,
    pub double_rounds: Vec<DoubleRound>,
    pub final_round: Option<FinalRound>,
    pub final_responses: Vec<FinalResponse>,
}

impl GameSnapshot {
    fn double_round_for(&self, player_id: &str) -> Option<&DoubleRound> {
        self.double_rounds
            .iter()
            .find(|d| d.player_id == player_id && d.game_id == self.game.id)
    }

    pub fn round_score(&self, round_id: &str, player_id: &str) -> i64 {
        score_round(
            round_id,
            &self.questions,
            &self.responses,
            self.double_round_for(player_id),
            player_id,
        )
    }

    pub fn final_score(&self, player_id: &str) -> i64 {
        let Some(final_round) = &self.final_round else {
            return 0;
        };
        let response = self
            .final_responses
            .iter()
            .find(|r| r.final_round_id == final_round.id && r.player_id == player_id);
        score_final(final_round.status, response)
    }

    /// Total across ordinary rounds only (the cap for an uncapped wager)
    pub fn rounds_total(&self, player_id: &str) -> i64 {
        self.rounds
            .iter()
            .map(|r| self.round_score(&r.id, player_id))
            .sum()
    }

    pub fn scorecard(&self, player_id: &str) -> PlayerScorecard {
        let mut entries: Vec<ScoreEntry> = self
            .rounds
            .iter()
            .map(|r| ScoreEntry {
                key: RoundKey::Round(r.id.clone()),
                score: self.round_score(&r.id, player_id),
            })
            .collect();
        entries.push(ScoreEntry {
            key: RoundKey::Final,
            score: self.final_score(player_id),
        });
        PlayerScorecard::new(player_id.to_string(), entries)
    }

    /// Scorecards for every participating player, highest total first
    pub fn scoreboard(&self) -> Vec<PlayerScorecard> {
        let mut seen = HashSet::new();
        let mut cards: Vec<PlayerScorecard> = self
            .game
            .players
            .iter()
            .filter(|p| seen.insert(p.as_str()))
            .map(|p| self.scorecard(p))
            .collect();
        cards.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.player_id.cmp(&b.player_id)));
        cards
    }
}
