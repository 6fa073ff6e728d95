use std::env;

/// Where the assessment backend lives.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read the base URL from `ASSESS_API_BASE_URL`, defaulting to the
    /// local development backend.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("ASSESS_API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".into());
        Self { base_url }
    }

    /// Join an absolute endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ApiConfig::new("http://localhost:5000/");
        assert_eq!(
            config.endpoint("/api/quiz/questions"),
            "http://localhost:5000/api/quiz/questions"
        );
    }
}
