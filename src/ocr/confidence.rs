/// Confidence bucketing
///
/// Maps raw OCR confidence scores onto three levels using configurable,
/// strictly ascending thresholds.
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Categorical confidence level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

/// Threshold configuration for [`ConfidenceThresholds::classify`].
///
/// `high` is the nominal top of the engine's scale. It only takes part in
/// validation; scores above it are still `High`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    pub low: f32,
    pub medium: f32,
    pub high: f32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            low: 0.75,
            medium: 0.85,
            high: 1.0,
        }
    }
}

impl ConfidenceThresholds {
    /// Create validated thresholds
    pub fn new(low: f32, medium: f32, high: f32) -> Result<Self, ConfigError> {
        let thresholds = Self { low, medium, high };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Thresholds must be finite, non-negative and strictly ascending
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all_finite = [self.low, self.medium, self.high]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ConfigError::Invalid(format!(
                "confidence thresholds must be finite: {:?}",
                self
            )));
        }
        if self.low < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "low confidence threshold must be non-negative, got {}",
                self.low
            )));
        }
        if !(self.low < self.medium && self.medium < self.high) {
            return Err(ConfigError::Invalid(format!(
                "confidence thresholds must be ascending (low < medium < high): {} / {} / {}",
                self.low, self.medium, self.high
            )));
        }
        Ok(())
    }

    /// `< low` → Low, `< medium` → Medium, otherwise High. NaN is Low.
    pub fn classify(&self, confidence: f32) -> ConfidenceLevel {
        if confidence.is_nan() || confidence < self.low {
            ConfidenceLevel::Low
        } else if confidence < self.medium {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_boundaries() {
        let t = ConfidenceThresholds::default();
        assert_eq!(t.classify(0.74), ConfidenceLevel::Low);
        assert_eq!(t.classify(0.75), ConfidenceLevel::Medium);
        assert_eq!(t.classify(0.84), ConfidenceLevel::Medium);
        assert_eq!(t.classify(0.85), ConfidenceLevel::High);
        assert_eq!(t.classify(1.0), ConfidenceLevel::High);
    }

    #[test]
    fn test_out_of_range_scores() {
        let t = ConfidenceThresholds::default();
        assert_eq!(t.classify(0.0), ConfidenceLevel::Low);
        assert_eq!(t.classify(-1.0), ConfidenceLevel::Low);
        assert_eq!(t.classify(1.7), ConfidenceLevel::High);
        assert_eq!(t.classify(f32::NAN), ConfidenceLevel::Low);
    }

    #[test]
    fn test_non_ascending_rejected() {
        assert!(ConfidenceThresholds::new(0.85, 0.75, 1.0).is_err());
        assert!(ConfidenceThresholds::new(0.75, 0.75, 1.0).is_err());
        assert!(ConfidenceThresholds::new(0.75, 1.0, 0.85).is_err());
        assert!(ConfidenceThresholds::new(-0.1, 0.5, 1.0).is_err());
        assert!(ConfidenceThresholds::new(0.5, f32::NAN, 1.0).is_err());
        assert!(ConfidenceThresholds::new(0.6, 0.8, 1.0).is_ok());
    }

    #[test]
    fn test_level_ordering_and_serde() {
        assert!(ConfidenceLevel::Low < ConfidenceLevel::Medium);
        assert!(ConfidenceLevel::Medium < ConfidenceLevel::High);
        assert_eq!(
            serde_json::to_string(&ConfidenceLevel::Medium).unwrap(),
            "\"medium\""
        );
    }
}
