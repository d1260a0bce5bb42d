//! Lifecycle guards: which status changes and mutations are legal.
//!
//! These are pure checks. The state layer calls them before writing anything.

use crate::error::{TriviaError, TriviaResult};
use crate::types::*;

/// Rounds only move one step forward: NotOpen -> AnswerTime -> CheckAnswers -> Closed
pub fn check_round_transition(from: RoundStatus, to: RoundStatus) -> TriviaResult<()> {
    if from.next() == Some(to) {
        Ok(())
    } else {
        Err(TriviaError::transition(from, to))
    }
}

/// NotOpen -> Wager -> AnswerTime -> CheckAnswers -> Closed
pub fn check_final_round_transition(
    from: FinalRoundStatus,
    to: FinalRoundStatus,
) -> TriviaResult<()> {
    if from.next() == Some(to) {
        Ok(())
    } else {
        Err(TriviaError::transition(from, to))
    }
}

pub fn check_response_window(round: &Round) -> TriviaResult<()> {
    if round.status == RoundStatus::AnswerTime {
        Ok(())
    } else {
        Err(TriviaError::PermissionDenied(format!(
            "answers for '{}' are not open (round is {:?})",
            round.category, round.status
        )))
    }
}

pub fn check_wager_window(final_round: &FinalRound) -> TriviaResult<()> {
    if final_round.status == FinalRoundStatus::Wager {
        Ok(())
    } else {
        Err(TriviaError::PermissionDenied(
            "the time to wager has passed".to_string(),
        ))
    }
}

pub fn check_final_answer_window(final_round: &FinalRound) -> TriviaResult<()> {
    if final_round.status == FinalRoundStatus::AnswerTime {
        Ok(())
    } else {
        Err(TriviaError::PermissionDenied(format!(
            "final answers are not open (final round is {:?})",
            final_round.status
        )))
    }
}

/// A double round may be picked only before any round in the game has opened
pub fn check_double_round_window(rounds: &[Round]) -> TriviaResult<()> {
    let status_sum: u32 = rounds.iter().map(|r| r.status.code()).sum();
    if status_sum == 0 {
        Ok(())
    } else {
        Err(TriviaError::PermissionDenied(
            "double rounds are locked once the first round opens".to_string(),
        ))
    }
}

/// Peer checking: staff anytime, players during CheckAnswers and never their own answers
pub fn check_review_permission(actor: &Actor, round: &Round, response: &Response) -> TriviaResult<()> {
    if actor.is_staff {
        return Ok(());
    }
    let player_id = actor.require_player()?;
    if round.status != RoundStatus::CheckAnswers {
        return Err(TriviaError::PermissionDenied(
            "it's not time to check the round".to_string(),
        ));
    }
    if &response.player_id == player_id {
        return Err(TriviaError::PermissionDenied(
            "players cannot check their own answers".to_string(),
        ));
    }
    Ok(())
}

/// Round review: staff anytime, everyone else once the round is closed
pub fn check_round_review(actor: &Actor, round: &Round) -> TriviaResult<()> {
    if actor.is_staff || round.status == RoundStatus::Closed {
        Ok(())
    } else {
        Err(TriviaError::PermissionDenied(
            "answers are shown after the round is closed".to_string(),
        ))
    }
}

/// A positive cap is a fixed maximum; a cap of 0 limits the wager to the
/// player's current score from ordinary rounds.
pub fn validate_wager(wager: i64, max_wager: i64, current_score: i64) -> TriviaResult<()> {
    if wager < 0 {
        return Err(TriviaError::Validation(
            "wager cannot be negative".to_string(),
        ));
    }
    if max_wager > 0 && wager > max_wager {
        return Err(TriviaError::Validation(format!(
            "above max wager. Max wager is {}",
            max_wager
        )));
    }
    if max_wager == 0 && wager > current_score {
        return Err(TriviaError::Validation(format!(
            "your max wager is your score. You have {}",
            current_score
        )));
    }
    Ok(())
}
