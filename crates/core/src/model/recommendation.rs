/// Canonical recommendation shape.
///
/// The backend sends recommendation entries either as bare strings or as
/// objects carrying a `text` field; the services layer coerces both into this
/// single shape immediately after deserialization so nothing downstream
/// branches on the wire representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub text: String,
    pub completed: bool,
    /// Free-text note added by the user. Local state only, never uploaded.
    pub note: Option<String>,
}

impl Recommendation {
    /// A fresh, not-yet-completed recommendation.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
            note: None,
        }
    }

    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
