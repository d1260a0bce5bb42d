//! Answer matching: exact comparison after trimming and lower-casing.

use crate::types::{FinalRound, Question};

/// Normalize text for answer comparison (trim whitespace, lowercase)
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The normalized answers accepted for a question: the canonical answer
/// followed by each non-blank comma-separated alternate.
pub fn answer_set(answer: &str, alt_answers: Option<&str>) -> Vec<String> {
    let mut accepted = vec![normalize(answer)];
    if let Some(alts) = alt_answers.filter(|a| !a.trim().is_empty()) {
        accepted.extend(alts.split(',').map(normalize).filter(|a| !a.is_empty()));
    }
    accepted
}

/// Whether a submitted answer is in the accepted set
pub fn matches(answer: &str, alt_answers: Option<&str>, submitted: &str) -> bool {
    let submitted = normalize(submitted);
    answer_set(answer, alt_answers).contains(&submitted)
}

impl Question {
    pub fn answer_set(&self) -> Vec<String> {
        answer_set(&self.answer, self.alt_answers.as_deref())
    }

    pub fn accepts(&self, submitted: &str) -> bool {
        matches(&self.answer, self.alt_answers.as_deref(), submitted)
    }
}

impl FinalRound {
    pub fn answer_set(&self) -> Vec<String> {
        answer_set(&self.answer, self.alt_answers.as_deref())
    }
}
