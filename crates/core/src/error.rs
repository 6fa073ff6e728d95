use thiserror::Error;

use crate::model::score::ScoreError;
use crate::model::session::SessionStateError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    SessionState(#[from] SessionStateError),
}
