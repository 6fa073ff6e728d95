use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a quiz question, issued by the backend.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying identifier string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single true/false question as fetched from the backend.
///
/// Immutable once fetched; lives for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Collected true/false answers keyed by question id.
///
/// Built up incrementally while the user answers. A set is only submittable
/// when its key set equals the question id set exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    answers: BTreeMap<QuestionId, bool>,
}

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the answer for a question.
    pub fn record(&mut self, id: QuestionId, value: bool) {
        self.answers.insert(id, value);
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<bool> {
        self.answers.get(id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, bool)> {
        self.answers.iter().map(|(id, value)| (id, *value))
    }

    /// Question ids that have no recorded answer yet.
    #[must_use]
    pub fn missing_for(&self, questions: &[Question]) -> Vec<QuestionId> {
        questions
            .iter()
            .filter(|q| !self.answers.contains_key(q.id()))
            .map(|q| q.id().clone())
            .collect()
    }

    /// True when every question is answered and no stray ids are present.
    #[must_use]
    pub fn is_complete_for(&self, questions: &[Question]) -> bool {
        if self.answers.len() != questions.len() {
            return false;
        }
        questions.iter().all(|q| self.answers.contains_key(q.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_questions() -> Vec<Question> {
        vec![
            Question::new(QuestionId::new("q1"), "A"),
            Question::new(QuestionId::new("q2"), "B"),
        ]
    }

    #[test]
    fn empty_set_is_incomplete() {
        let questions = two_questions();
        let answers = AnswerSet::new();
        assert!(!answers.is_complete_for(&questions));
        assert_eq!(answers.missing_for(&questions).len(), 2);
    }

    #[test]
    fn partial_set_reports_missing_ids() {
        let questions = two_questions();
        let mut answers = AnswerSet::new();
        answers.record(QuestionId::new("q1"), true);

        assert!(!answers.is_complete_for(&questions));
        assert_eq!(answers.missing_for(&questions), vec![QuestionId::new("q2")]);
    }

    #[test]
    fn full_set_is_complete() {
        let questions = two_questions();
        let mut answers = AnswerSet::new();
        answers.record(QuestionId::new("q1"), true);
        answers.record(QuestionId::new("q2"), false);

        assert!(answers.is_complete_for(&questions));
        assert!(answers.missing_for(&questions).is_empty());
    }

    #[test]
    fn stray_id_makes_set_incomplete() {
        let questions = two_questions();
        let mut answers = AnswerSet::new();
        answers.record(QuestionId::new("q1"), true);
        answers.record(QuestionId::new("q3"), false);

        assert!(!answers.is_complete_for(&questions));
    }

    #[test]
    fn recording_twice_overwrites() {
        let mut answers = AnswerSet::new();
        answers.record(QuestionId::new("q1"), true);
        answers.record(QuestionId::new("q1"), false);

        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(&QuestionId::new("q1")), Some(false));
    }
}
