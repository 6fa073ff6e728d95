mod owasp;
mod question;
mod recommendation;
pub mod score;
pub mod session;

pub use owasp::{OwaspIssue, resolve_owasp_issue};
pub use question::{AnswerSet, Question, QuestionId};
pub use recommendation::Recommendation;
pub use score::{RiskLevel, RiskScore, ScoreError, ScoreResult};
pub use session::{FailureKind, Session, SessionState, SessionStateError};
