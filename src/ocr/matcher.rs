/// Detection-to-field matching
///
/// A detection belongs to a field when the mean of its four corners falls
/// inside the field rectangle grown by a fixed pixel tolerance. Which of
/// several candidates wins is decided by a [`MatchPolicy`]; the pipeline
/// uses [`FirstMatch`] (engine order).
use std::sync::Arc;

use super::Detection;
use crate::error::GeometryError;
use crate::geometry::Bounds;

/// Default tolerance in canonical pixels
pub const DEFAULT_TOLERANCE: f32 = 10.0;

/// Selection rule among detections whose centroid is in bounds
pub trait MatchPolicy: Send + Sync {
    fn select<'a>(
        &self,
        detections: &'a [Detection],
        bounds: &Bounds,
        tolerance: f32,
    ) -> Option<&'a Detection>;

    /// Get policy name (for logging)
    fn name(&self) -> &'static str;
}

/// First in-bounds detection in the order the engine emitted them.
/// Overlapping boxes are not re-ranked.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl MatchPolicy for FirstMatch {
    fn select<'a>(
        &self,
        detections: &'a [Detection],
        bounds: &Bounds,
        tolerance: f32,
    ) -> Option<&'a Detection> {
        detections
            .iter()
            .find(|d| d.lies_within(bounds, tolerance))
    }

    fn name(&self) -> &'static str {
        "FirstMatch"
    }
}

/// Highest-confidence in-bounds detection; ties keep engine order
#[derive(Debug, Clone, Copy, Default)]
pub struct BestConfidence;

impl MatchPolicy for BestConfidence {
    fn select<'a>(
        &self,
        detections: &'a [Detection],
        bounds: &Bounds,
        tolerance: f32,
    ) -> Option<&'a Detection> {
        detections
            .iter()
            .filter(|d| d.lies_within(bounds, tolerance))
            .fold(None, |best: Option<&'a Detection>, d| match best {
                Some(b) if b.confidence >= d.confidence => Some(b),
                _ => Some(d),
            })
    }

    fn name(&self) -> &'static str {
        "BestConfidence"
    }
}

/// Matcher shared by the metadata and player resolvers
#[derive(Clone)]
pub struct FieldMatcher {
    tolerance: f32,
    policy: Arc<dyn MatchPolicy>,
}

impl std::fmt::Debug for FieldMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMatcher")
            .field("tolerance", &self.tolerance)
            .field("policy", &self.policy.name())
            .finish()
    }
}

impl Default for FieldMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl FieldMatcher {
    /// First-match matcher with the given tolerance
    pub fn new(tolerance: f32) -> Self {
        Self::with_policy(tolerance, Arc::new(FirstMatch))
    }

    pub fn with_policy(tolerance: f32, policy: Arc<dyn MatchPolicy>) -> Self {
        Self { tolerance, policy }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Find the detection for `bounds`.
    ///
    /// `Ok(None)` means nothing landed on the field, which callers resolve
    /// with a default. Degenerate bounds are an `InvalidBounds` error.
    pub fn find<'a>(
        &self,
        detections: &'a [Detection],
        bounds: &Bounds,
    ) -> Result<Option<&'a Detection>, GeometryError> {
        bounds.validate()?;
        Ok(self.policy.select(detections, bounds, self.tolerance))
    }
}
