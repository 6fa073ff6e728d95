use thiserror::Error;

use crate::model::Recommendation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("risk score {value} is outside 0..=100")]
    OutOfRange { value: i64 },

    #[error("no recommendation at index {index}")]
    RecommendationIndex { index: usize },
}

/// A risk score in `[0, 100]`.
///
/// Always displayed alongside its complement (`100 - score`), so the pair is
/// computed here rather than at the rendering edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Validate a raw backend value into a score.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` for values outside `0..=100`.
    pub fn new(value: i64) -> Result<Self, ScoreError> {
        let score = u8::try_from(value).map_err(|_| ScoreError::OutOfRange { value })?;
        if score > 100 {
            return Err(ScoreError::OutOfRange { value });
        }
        Ok(Self(score))
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }

    /// The "room for improvement" share shown next to the score.
    #[must_use]
    pub fn complement(&self) -> u8 {
        100 - self.0
    }

    #[must_use]
    pub fn level(&self) -> RiskLevel {
        match self.0 {
            85..=100 => RiskLevel::Excellent,
            60..=84 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        }
    }
}

/// Coarse classification of a score for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Excellent,
    Moderate,
    High,
}

impl RiskLevel {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Excellent => "Excellent",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High risk",
        }
    }
}

/// The scored outcome of one submission.
///
/// Produced once per submission and replaced wholesale when the user retakes
/// the quiz; individual fields are never patched from the wire after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    risk_score: RiskScore,
    recommendations: Vec<Recommendation>,
    owasp_issues: Vec<String>,
}

impl ScoreResult {
    #[must_use]
    pub fn new(
        risk_score: RiskScore,
        recommendations: Vec<Recommendation>,
        owasp_issues: Vec<String>,
    ) -> Self {
        Self {
            risk_score,
            recommendations,
            owasp_issues,
        }
    }

    #[must_use]
    pub fn risk_score(&self) -> RiskScore {
        self.risk_score
    }

    #[must_use]
    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    #[must_use]
    pub fn owasp_issues(&self) -> &[String] {
        &self.owasp_issues
    }

    /// Toggle the completion flag on one recommendation.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::RecommendationIndex` if `index` is out of bounds.
    pub fn set_completed(&mut self, index: usize, completed: bool) -> Result<(), ScoreError> {
        let rec = self
            .recommendations
            .get_mut(index)
            .ok_or(ScoreError::RecommendationIndex { index })?;
        rec.completed = completed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_scores() {
        assert!(matches!(
            RiskScore::new(-1),
            Err(ScoreError::OutOfRange { value: -1 })
        ));
        assert!(matches!(
            RiskScore::new(101),
            Err(ScoreError::OutOfRange { value: 101 })
        ));
        assert!(RiskScore::new(0).is_ok());
        assert!(RiskScore::new(100).is_ok());
    }

    #[test]
    fn complement_pairs_with_score() {
        let score = RiskScore::new(72).unwrap();
        assert_eq!(score.value(), 72);
        assert_eq!(score.complement(), 28);
    }

    #[test]
    fn levels_follow_thresholds() {
        assert_eq!(RiskScore::new(85).unwrap().level(), RiskLevel::Excellent);
        assert_eq!(RiskScore::new(84).unwrap().level(), RiskLevel::Moderate);
        assert_eq!(RiskScore::new(60).unwrap().level(), RiskLevel::Moderate);
        assert_eq!(RiskScore::new(59).unwrap().level(), RiskLevel::High);
    }

    #[test]
    fn set_completed_validates_index() {
        let mut result = ScoreResult::new(
            RiskScore::new(50).unwrap(),
            vec![Recommendation::new("Enable MFA")],
            vec![],
        );

        result.set_completed(0, true).unwrap();
        assert!(result.recommendations()[0].completed);

        let err = result.set_completed(3, true).unwrap_err();
        assert!(matches!(err, ScoreError::RecommendationIndex { index: 3 }));
    }
}
