//! Bulk import of a game from headerless CSV.
//!
//! Rows are `category, question, answer[, alt_answers]`, or
//! `final round, category, question, answer[, alt_answers]` for the final round.
//! The whole file is staged first and committed under one set of write locks,
//! so a bad row leaves nothing behind.

use super::{new_id, AppState};
use crate::error::{TriviaError, TriviaResult};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

const FINAL_ROUND_MARKER: &str = "final round";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub game: Game,
    pub rounds: usize,
    pub questions: usize,
    pub has_final_round: bool,
}

/// Everything a file creates, before it touches shared state
struct StagedGame {
    game: Game,
    rounds: Vec<Round>,
    questions: Vec<Question>,
    final_round: Option<FinalRound>,
}

fn row_error(row: usize, message: impl Into<String>) -> TriviaError {
    TriviaError::Import {
        row,
        message: message.into(),
    }
}

/// A required, non-empty field
fn field<'a>(record: &'a csv::StringRecord, idx: usize, name: &str, row: usize) -> TriviaResult<&'a str> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(row_error(row, format!("{} is empty", name))),
        None => Err(row_error(
            row,
            format!("missing {} (expected at least {} fields)", name, idx + 1),
        )),
    }
}

fn optional_field(record: &csv::StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn stage<R: Read>(title: String, reader: R, default_points: i64) -> TriviaResult<StagedGame> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let game = Game {
        id: new_id(),
        title,
        pub_date: chrono::Utc::now().to_rfc3339(),
        completed: false,
        players: Vec::new(),
    };
    let mut rounds: Vec<Round> = Vec::new();
    let mut questions = Vec::new();
    let mut final_round: Option<FinalRound> = None;

    for (idx, record) in csv_reader.records().enumerate() {
        let row = idx + 1;
        let record = record.map_err(|e| row_error(row, e.to_string()))?;
        let first = field(&record, 0, "category", row)?;

        if first.eq_ignore_ascii_case(FINAL_ROUND_MARKER) {
            if final_round.is_some() {
                return Err(row_error(row, "a game has at most one final round"));
            }
            final_round = Some(FinalRound {
                id: new_id(),
                game_id: game.id.clone(),
                category: field(&record, 1, "category", row)?.to_string(),
                status: FinalRoundStatus::NotOpen,
                question: field(&record, 2, "question", row)?.to_string(),
                answer: field(&record, 3, "answer", row)?.to_string(),
                alt_answers: optional_field(&record, 4),
                max_wager: 0,
            });
            continue;
        }

        let question = field(&record, 1, "question", row)?.to_string();
        let answer = field(&record, 2, "answer", row)?.to_string();

        let round_id = match rounds.iter().find(|r| r.category == first) {
            Some(round) => round.id.clone(),
            None => {
                let round = Round {
                    id: new_id(),
                    game_id: game.id.clone(),
                    number: rounds.len() as u32 + 1,
                    category: first.to_string(),
                    status: RoundStatus::NotOpen,
                };
                let id = round.id.clone();
                rounds.push(round);
                id
            }
        };

        questions.push(Question {
            id: new_id(),
            round_id,
            question,
            answer,
            alt_answers: optional_field(&record, 3),
            points: default_points,
        });
    }

    if rounds.is_empty() && final_round.is_none() {
        return Err(row_error(0, "the file contains no questions"));
    }

    Ok(StagedGame {
        game,
        rounds,
        questions,
        final_round,
    })
}

impl AppState {
    /// Import a game from CSV (staff only). All or nothing.
    pub async fn import_game_csv<R: Read>(
        &self,
        actor: &Actor,
        title: String,
        reader: R,
    ) -> TriviaResult<ImportSummary> {
        actor.require_staff()?;
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(TriviaError::Validation(
                "game title cannot be empty".to_string(),
            ));
        }

        let staged = match stage(title, reader, self.scoring.default_points) {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!("Discarding import: {}", e);
                return Err(e);
            }
        };

        let summary = ImportSummary {
            game: staged.game.clone(),
            rounds: staged.rounds.len(),
            questions: staged.questions.len(),
            has_final_round: staged.final_round.is_some(),
        };

        {
            let mut games = self.games.write().await;
            let mut rounds = self.rounds.write().await;
            let mut questions = self.questions.write().await;
            let mut final_rounds = self.final_rounds.write().await;

            games.insert(staged.game.id.clone(), staged.game);
            rounds.extend(staged.rounds.into_iter().map(|r| (r.id.clone(), r)));
            questions.extend(staged.questions.into_iter().map(|q| (q.id.clone(), q)));
            if let Some(f) = staged.final_round {
                final_rounds.insert(f.id.clone(), f);
            }
        }

        tracing::info!(
            "Imported game '{}' with {} rounds and {} questions",
            summary.game.title,
            summary.rounds,
            summary.questions
        );
        Ok(summary)
    }

    /// Import a game from a CSV file; the title defaults to the file name
    pub async fn import_game_file(
        &self,
        actor: &Actor,
        path: &Path,
        title: Option<&str>,
    ) -> TriviaResult<ImportSummary> {
        actor.require_staff()?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| row_error(0, format!("cannot read {}: {}", path.display(), e)))?;
        let title = match title {
            Some(t) => t.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Imported game".to_string()),
        };
        self.import_game_csv(actor, title, bytes.as_slice()).await
    }
}
