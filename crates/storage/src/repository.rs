use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use assess_core::model::{Recommendation, RiskScore, ScoreError, ScoreResult};

/// Key for the auth bearer token. Deliberately disjoint from the result keys
/// so clearing a session never touches credentials and vice versa.
pub const KEY_TOKEN: &str = "token";
/// Keys holding the cached score triple.
pub const KEY_RISK_SCORE: &str = "riskScore";
pub const KEY_RECOMMENDATIONS: &str = "recommendations";
pub const KEY_OWASP_ISSUES: &str = "owaspIssues";

/// Errors surfaced by storage backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A browser-`localStorage`-like string key-value contract.
///
/// Backends only move opaque strings; all typing lives in the wrappers below.
/// Not safe for concurrent writers sharing one backend; the pipeline assumes
/// a single active writer per storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value, `None` when the key was never set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory backend for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Persisted shape for one recommendation entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RecommendationRecord {
    #[must_use]
    fn from_recommendation(rec: &Recommendation) -> Self {
        Self {
            text: rec.text.clone(),
            completed: rec.completed,
            note: rec.note.clone(),
        }
    }

    #[must_use]
    fn into_recommendation(self) -> Recommendation {
        Recommendation {
            text: self.text,
            completed: self.completed,
            note: self.note,
        }
    }
}

/// Persisted shape for a scored result.
///
/// Mirrors the domain `ScoreResult` so the store can serialize without
/// leaking storage concerns into the domain layer.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub risk_score: i64,
    pub recommendations: Vec<RecommendationRecord>,
    pub owasp_issues: Vec<String>,
}

impl ResultRecord {
    #[must_use]
    pub fn from_result(result: &ScoreResult) -> Self {
        Self {
            risk_score: i64::from(result.risk_score().value()),
            recommendations: result
                .recommendations()
                .iter()
                .map(RecommendationRecord::from_recommendation)
                .collect(),
            owasp_issues: result.owasp_issues().to_vec(),
        }
    }

    /// Convert the record back into a domain `ScoreResult`.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError` if the persisted score is out of range.
    pub fn into_result(self) -> Result<ScoreResult, ScoreError> {
        let risk_score = RiskScore::new(self.risk_score)?;
        Ok(ScoreResult::new(
            risk_score,
            self.recommendations
                .into_iter()
                .map(RecommendationRecord::into_recommendation)
                .collect(),
            self.owasp_issues,
        ))
    }
}

/// Typed wrapper persisting the scored-result triple.
///
/// Uses the same three keys the original client kept in browser storage.
/// Missing or unparseable entries are treated as "no prior result", never
/// as a fault.
#[derive(Clone)]
pub struct ResultStore {
    backend: Arc<dyn KeyValueStore>,
}

impl ResultStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Overwrite the stored result with a fresh one.
    ///
    /// The score key is removed first and written last: `load` refuses to
    /// assemble a result without it, so an interrupted save is observed as
    /// absence, never as a mix of old and new entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any key cannot be written.
    pub async fn save(&self, result: &ScoreResult) -> Result<(), StorageError> {
        let record = ResultRecord::from_result(result);
        let recommendations = serde_json::to_string(&record.recommendations)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let issues = serde_json::to_string(&record.owasp_issues)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.backend.remove(KEY_RISK_SCORE).await?;
        self.backend.set(KEY_RECOMMENDATIONS, &recommendations).await?;
        self.backend.set(KEY_OWASP_ISSUES, &issues).await?;
        self.backend
            .set(KEY_RISK_SCORE, &record.risk_score.to_string())
            .await?;
        Ok(())
    }

    /// Load the cached result, if a complete and well-formed one exists.
    ///
    /// Corrupt or partially-present entries degrade to `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for backend read failures.
    pub async fn load(&self) -> Result<Option<ScoreResult>, StorageError> {
        let Some(raw_score) = self.backend.get(KEY_RISK_SCORE).await? else {
            return Ok(None);
        };
        let Some(raw_recs) = self.backend.get(KEY_RECOMMENDATIONS).await? else {
            return Ok(None);
        };
        let Some(raw_issues) = self.backend.get(KEY_OWASP_ISSUES).await? else {
            return Ok(None);
        };

        let Ok(risk_score) = raw_score.parse::<i64>() else {
            return Ok(None);
        };
        let Ok(recommendations) = serde_json::from_str::<Vec<RecommendationRecord>>(&raw_recs)
        else {
            return Ok(None);
        };
        let Ok(owasp_issues) = serde_json::from_str::<Vec<String>>(&raw_issues) else {
            return Ok(None);
        };

        let record = ResultRecord {
            risk_score,
            recommendations,
            owasp_issues,
        };
        Ok(record.into_result().ok())
    }

    /// Remove the result keys; the auth token is untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(KEY_RISK_SCORE).await?;
        self.backend.remove(KEY_RECOMMENDATIONS).await?;
        self.backend.remove(KEY_OWASP_ISSUES).await?;
        Ok(())
    }
}

/// Typed wrapper for the auth bearer token.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Persist the bearer token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn save(&self, token: &str) -> Result<(), StorageError> {
        self.backend.set(KEY_TOKEN, token).await
    }

    /// Load the bearer token, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn load(&self) -> Result<Option<String>, StorageError> {
        self.backend.get(KEY_TOKEN).await
    }

    /// Drop the bearer token (logout, or forced on a 401).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(KEY_TOKEN).await
    }
}

/// Bundles the typed stores over one backend for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: ResultStore,
    pub token: TokenStore,
}

impl Storage {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            results: ResultStore::new(backend.clone()),
            token: TokenStore::new(backend),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Delegates to an `InMemoryStore` but refuses to write one key.
    struct FlakyStore {
        inner: InMemoryStore,
        fail_key: &'static str,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.fail_key {
                return Err(StorageError::Connection("write refused".to_owned()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    fn sample_result() -> ScoreResult {
        ScoreResult::new(
            RiskScore::new(72).unwrap(),
            vec![
                Recommendation::new("Enable MFA"),
                Recommendation::new("Rotate access keys").with_completed(true),
            ],
            vec!["Cryptographic Failures".to_owned()],
        )
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let storage = Storage::in_memory();
        let result = sample_result();

        storage.results.save(&result).await.unwrap();
        let loaded = storage.results.load().await.unwrap();
        assert_eq!(loaded, Some(result));
    }

    #[tokio::test]
    async fn load_without_save_is_none() {
        let storage = Storage::in_memory();
        assert_eq!(storage.results.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_entries_degrade_to_none() {
        let backend = Arc::new(InMemoryStore::new());
        let storage = Storage::new(backend.clone());

        storage.results.save(&sample_result()).await.unwrap();
        backend.set(KEY_RECOMMENDATIONS, "not json").await.unwrap();

        assert_eq!(storage.results.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn out_of_range_persisted_score_degrades_to_none() {
        let backend = Arc::new(InMemoryStore::new());
        let storage = Storage::new(backend.clone());

        storage.results.save(&sample_result()).await.unwrap();
        backend.set(KEY_RISK_SCORE, "250").await.unwrap();

        assert_eq!(storage.results.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn interrupted_save_degrades_to_absence_not_a_mix() {
        let inner = InMemoryStore::new();
        let previous = ScoreResult::new(
            RiskScore::new(30).unwrap(),
            vec![Recommendation::new("Old advice").with_completed(true)],
            vec!["Broken Access Control".to_owned()],
        );
        ResultStore::new(Arc::new(inner.clone()))
            .save(&previous)
            .await
            .unwrap();

        // The overwrite dies between key writes.
        let flaky = ResultStore::new(Arc::new(FlakyStore {
            inner: inner.clone(),
            fail_key: KEY_RECOMMENDATIONS,
        }));
        let err = flaky.save(&sample_result()).await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));

        // Neither the old result nor a mix of old and new is observable.
        let after = ResultStore::new(Arc::new(inner)).load().await.unwrap();
        assert_eq!(after, None);
    }

    #[tokio::test]
    async fn clear_removes_result_keys_but_not_token() {
        let storage = Storage::in_memory();
        storage.token.save("jwt-abc").await.unwrap();
        storage.results.save(&sample_result()).await.unwrap();

        storage.results.clear().await.unwrap();

        assert_eq!(storage.results.load().await.unwrap(), None);
        assert_eq!(storage.token.load().await.unwrap().as_deref(), Some("jwt-abc"));
    }

    #[tokio::test]
    async fn token_store_round_trips_and_clears() {
        let storage = Storage::in_memory();
        assert_eq!(storage.token.load().await.unwrap(), None);

        storage.token.save("jwt-abc").await.unwrap();
        assert_eq!(storage.token.load().await.unwrap().as_deref(), Some("jwt-abc"));

        storage.token.clear().await.unwrap();
        assert_eq!(storage.token.load().await.unwrap(), None);
    }
}
