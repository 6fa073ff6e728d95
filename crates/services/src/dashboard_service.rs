use std::sync::Arc;

use assess_core::model::ScoreResult;
use storage::Storage;

use crate::error::{ApiError, DashboardError};
use crate::quiz_client::QuizApi;

/// Loads the scored result for the dashboard/result views.
///
/// Precedence when both a fresh server value and a local cache exist: the
/// server value always wins, and a successful fetch rewrites the cache before
/// the value is returned. The cache is only consulted when the server cannot
/// be reached.
#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn QuizApi>,
    storage: Storage,
}

impl DashboardService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, storage: Storage) -> Self {
        Self { api, storage }
    }

    /// Fetch the current result, falling back to the cache on outage.
    ///
    /// A 401 clears the stored token and propagates; an expired session is
    /// never masked by cached data.
    ///
    /// # Errors
    ///
    /// `DashboardError::NotAuthenticated` without a stored token, `Api` when
    /// the fetch fails and no usable cache exists, `Storage` for backend
    /// read/write failures.
    pub async fn load(&self) -> Result<ScoreResult, DashboardError> {
        let token = self
            .storage
            .token
            .load()
            .await?
            .ok_or(DashboardError::NotAuthenticated)?;

        match self.api.fetch_dashboard(&token).await {
            Ok(result) => {
                self.storage.results.clear().await?;
                self.storage.results.save(&result).await?;
                Ok(result)
            }
            Err(ApiError::Auth) => {
                self.storage.token.clear().await?;
                Err(ApiError::Auth.into())
            }
            Err(err) => {
                // A cache read failure must not mask why the fetch failed.
                if let Ok(Some(cached)) = self.storage.results.load().await {
                    return Ok(cached);
                }
                Err(err.into())
            }
        }
    }

    /// Toggle a recommendation's completed flag and mirror the whole result
    /// back to the store, keeping memory and cache in lockstep.
    ///
    /// # Errors
    ///
    /// `DashboardError::Score` for an out-of-bounds index, `Storage` if the
    /// mirror write fails.
    pub async fn set_completed(
        &self,
        result: &mut ScoreResult,
        index: usize,
        completed: bool,
    ) -> Result<(), DashboardError> {
        result.set_completed(index, completed)?;
        self.storage.results.save(result).await?;
        Ok(())
    }
}
