/// Recorded OCR engine
///
/// Replays detections saved as JSON, one file per region. Used to calibrate
/// layouts against a known capture and to run the pipeline without a
/// recognizer installed.
use image::GrayImage;
use std::path::Path;

use super::{Detection, OcrEngine, OcrRegion};

#[derive(Debug, Clone, Default)]
pub struct RecordedEngine {
    metadata: Vec<Detection>,
    players: Vec<Detection>,
}

impl RecordedEngine {
    pub fn new(metadata: Vec<Detection>, players: Vec<Detection>) -> Self {
        Self { metadata, players }
    }

    /// Load two JSON arrays of detections
    pub fn from_files(
        metadata_path: &Path,
        players_path: &Path,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let metadata = Self::read(metadata_path)?;
        let players = Self::read(players_path)?;

        tracing::info!(
            "Loaded recorded detections: {} metadata, {} player",
            metadata.len(),
            players.len()
        );

        Ok(Self { metadata, players })
    }

    fn read(path: &Path) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        let detections = serde_json::from_str(&content)
            .map_err(|e| format!("failed to parse {}: {}", path.display(), e))?;
        Ok(detections)
    }
}

impl OcrEngine for RecordedEngine {
    fn recognize(
        &mut self,
        region: OcrRegion,
        _image: &GrayImage,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match region {
            OcrRegion::Metadata => self.metadata.clone(),
            OcrRegion::PlayerTable => self.players.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "RecordedEngine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Quad;

    #[test]
    fn test_replays_per_region() {
        let meta = Detection::new(Quad::from_box(0.0, 0.0, 10.0, 10.0), "hardpoint", 0.9);
        let player = Detection::new(Quad::from_box(0.0, 0.0, 10.0, 10.0), "shotzzy", 0.8);
        let mut engine = RecordedEngine::new(vec![meta.clone()], vec![player.clone()]);
        let image = GrayImage::new(1, 1);

        assert_eq!(
            engine.recognize(OcrRegion::Metadata, &image).unwrap(),
            vec![meta]
        );
        assert_eq!(
            engine.recognize(OcrRegion::PlayerTable, &image).unwrap(),
            vec![player]
        );
    }

    #[test]
    fn test_from_files() {
        let dir = std::env::temp_dir().join("scoreboard_ocr_recorded_test");
        std::fs::create_dir_all(&dir).unwrap();
        let meta_path = dir.join("metadata.json");
        let players_path = dir.join("players.json");

        let json = r#"[{
            "polygon": [{"x":80,"y":40},{"x":200,"y":40},{"x":200,"y":80},{"x":80,"y":80}],
            "text": "HARDPOINT",
            "confidence": 0.97
        }]"#;
        std::fs::write(&meta_path, json).unwrap();
        std::fs::write(&players_path, "[]").unwrap();

        let mut engine = RecordedEngine::from_files(&meta_path, &players_path).unwrap();
        let image = GrayImage::new(1, 1);
        let detections = engine.recognize(OcrRegion::Metadata, &image).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].text, "HARDPOINT");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_error() {
        let missing = Path::new("/definitely/not/here.json");
        assert!(RecordedEngine::from_files(missing, missing).is_err());
    }
}
