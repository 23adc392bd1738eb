/// OCR module for scoreboard screenshots
///
/// This module defines what the extraction pipeline needs from an OCR
/// engine and the small amount of logic that sits directly on top of raw
/// engine output.
///
/// # Architecture
///
/// The module is split into focused submodules:
/// - `confidence`: raw score → low/medium/high bucketing
/// - `matcher`: which detection belongs to which field rectangle
/// - `recorded`: engine that replays detections saved as JSON
/// - `tesseract`: Tesseract-backed engine (`tesseract` feature)
///
/// # Engine boundary
///
/// Engines return whatever error type they like. [`recognize_region`] is the
/// one place that turns an engine error or an empty detection list into
/// [`OcrError`], so resolution code only ever sees a non-empty list.
pub mod confidence;
pub mod matcher;
pub mod recorded;
#[cfg(feature = "tesseract")]
pub mod tesseract;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::geometry::{Bounds, Quad};

pub use confidence::{ConfidenceLevel, ConfidenceThresholds};
pub use matcher::{BestConfidence, FieldMatcher, FirstMatch, MatchPolicy};
pub use recorded::RecordedEngine;
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;

/// One text fragment reported by the OCR engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Region the text was read from, in screenshot pixel space
    pub polygon: Quad,
    /// Recognized text, as emitted by the engine
    pub text: String,
    /// Engine confidence, nominally 0.0-1.0
    pub confidence: f32,
}

impl Detection {
    pub fn new(polygon: Quad, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }

    /// Whether the polygon's corner-mean centroid falls inside `bounds`
    /// grown by `tolerance` (inclusive)
    pub fn lies_within(&self, bounds: &Bounds, tolerance: f32) -> bool {
        bounds.contains_with_tolerance(self.polygon.centroid(), tolerance)
    }
}

/// Which masked buffer an OCR call is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrRegion {
    Metadata,
    PlayerTable,
}

impl OcrRegion {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrRegion::Metadata => "metadata",
            OcrRegion::PlayerTable => "player_table",
        }
    }
}

/// OCR engine interface
///
/// Implement this trait to plug a recognizer into the pipeline. Engines
/// receive one masked grayscale buffer per call, the same size as the
/// source screenshot.
pub trait OcrEngine: Send {
    /// Recognize all text fragments in `image`
    fn recognize(
        &mut self,
        region: OcrRegion,
        image: &GrayImage,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>>;

    /// Get engine name (for logging)
    fn name(&self) -> &'static str;
}

/// Run `engine` on one region, normalizing both failure shapes into
/// [`OcrError`].
pub fn recognize_region(
    engine: &mut dyn OcrEngine,
    region: OcrRegion,
    image: &GrayImage,
) -> Result<Vec<Detection>, OcrError> {
    let detections = engine
        .recognize(region, image)
        .map_err(|source| OcrError::EngineFailed {
            region: region.as_str(),
            source,
        })?;

    if detections.is_empty() {
        return Err(OcrError::NoDetections {
            region: region.as_str(),
        });
    }

    tracing::debug!(
        engine = engine.name(),
        region = region.as_str(),
        count = detections.len(),
        "OCR detections received"
    );

    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEngine(Option<Vec<Detection>>);

    impl OcrEngine for FixedEngine {
        fn recognize(
            &mut self,
            _region: OcrRegion,
            _image: &GrayImage,
        ) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>> {
            self.0.clone().ok_or_else(|| "engine crashed".into())
        }

        fn name(&self) -> &'static str {
            "FixedEngine"
        }
    }

    #[test]
    fn test_engine_error_becomes_ocr_failure() {
        let mut engine = FixedEngine(None);
        let image = GrayImage::new(4, 4);
        let err = recognize_region(&mut engine, OcrRegion::Metadata, &image).unwrap_err();
        assert!(matches!(err, OcrError::EngineFailed { region: "metadata", .. }));
    }

    #[test]
    fn test_empty_result_becomes_ocr_failure() {
        let mut engine = FixedEngine(Some(Vec::new()));
        let image = GrayImage::new(4, 4);
        let err = recognize_region(&mut engine, OcrRegion::PlayerTable, &image).unwrap_err();
        assert!(matches!(err, OcrError::NoDetections { region: "player_table" }));
    }

    #[test]
    fn test_detections_pass_through() {
        let detection = Detection::new(Quad::from_box(0.0, 0.0, 2.0, 2.0), "x", 0.9);
        let mut engine = FixedEngine(Some(vec![detection.clone()]));
        let image = GrayImage::new(4, 4);
        let detections = recognize_region(&mut engine, OcrRegion::Metadata, &image).unwrap();
        assert_eq!(detections, vec![detection]);
    }
}
