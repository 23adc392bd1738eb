/// Field resolution
///
/// Turns raw detections into the structured scoreboard record. Every
/// metadata field is always present; a player row is present only when its
/// name was read.
pub mod metadata;
pub mod players;
pub mod text;

use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Serialize, Serializer};

use crate::geometry::{MetadataField, PlayerField};
use crate::modes::GameMode;
use crate::ocr::{ConfidenceLevel, ConfidenceThresholds, Detection};

pub use metadata::resolve_metadata;
pub use players::resolve_players;
pub use text::normalize;

/// Resolved value of one field
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub text: String,
    pub confidence: f32,
    pub level: ConfidenceLevel,
    /// False when `text` is a default standing in for a missing detection
    pub matched: bool,
}

impl ResolvedField {
    pub fn from_detection(detection: &Detection, thresholds: &ConfidenceThresholds) -> Self {
        Self {
            text: normalize(&detection.text),
            confidence: detection.confidence,
            level: thresholds.classify(detection.confidence),
            matched: true,
        }
    }

    /// Fallback value at the lowest confidence
    pub fn defaulted(text: &str) -> Self {
        Self {
            text: text.to_string(),
            confidence: 0.0,
            level: ConfidenceLevel::Low,
            matched: false,
        }
    }
}

/// Serialized as `[text, level]`
impl Serialize for ResolvedField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.text)?;
        tuple.serialize_element(&self.level)?;
        tuple.end()
    }
}

/// Every metadata field, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataResult {
    fields: Vec<ResolvedField>,
}

impl MetadataResult {
    pub(crate) fn new(fields: Vec<ResolvedField>) -> Self {
        debug_assert_eq!(fields.len(), MetadataField::ALL.len());
        Self { fields }
    }

    pub fn get(&self, field: MetadataField) -> &ResolvedField {
        &self.fields[field as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetadataField, &ResolvedField)> {
        MetadataField::ALL.iter().copied().zip(self.fields.iter())
    }

    pub fn game_mode(&self) -> GameMode {
        GameMode::from_text(&self.get(MetadataField::GameMode).text)
    }

    /// Fields that fell back to their default
    pub fn defaulted(&self) -> Vec<MetadataField> {
        self.iter()
            .filter(|(_, value)| !value.matched)
            .map(|(field, _)| field)
            .collect()
    }
}

impl Serialize for MetadataResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

/// One scoreboard row with a recognized player name
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerResult {
    /// Row index, 0-based from the top of the first team block
    pub row: usize,
    fields: Vec<ResolvedField>,
}

impl PlayerResult {
    pub(crate) fn new(row: usize, fields: Vec<ResolvedField>) -> Self {
        debug_assert_eq!(fields.len(), PlayerField::ALL.len());
        Self { row, fields }
    }

    pub fn get(&self, field: PlayerField) -> &ResolvedField {
        &self.fields[field as usize]
    }

    pub fn name(&self) -> &str {
        &self.get(PlayerField::Name).text
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerField, &ResolvedField)> {
        PlayerField::ALL.iter().copied().zip(self.fields.iter())
    }
}

/// Player row rendered with the mode's stat names
struct PlayerView<'a> {
    player: &'a PlayerResult,
    mode: GameMode,
}

impl Serialize for PlayerView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.player.fields.len()))?;
        for (field, value) in self.player.iter() {
            map.serialize_entry(self.mode.stat_key(field), value)?;
        }
        map.end()
    }
}

/// Complete output of one run
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub metadata: MetadataResult,
    /// Ascending by row
    pub players: Vec<PlayerResult>,
    pub game_mode: GameMode,
}

impl ExtractionResult {
    pub fn new(metadata: MetadataResult, players: Vec<PlayerResult>) -> Self {
        let game_mode = metadata.game_mode();
        Self {
            metadata,
            players,
            game_mode,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let players: Vec<PlayerView<'_>> = self
            .players
            .iter()
            .map(|player| PlayerView {
                player,
                mode: self.game_mode,
            })
            .collect();

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("metadata", &self.metadata)?;
        map.serialize_entry("players", &players)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Quad;

    fn metadata_with_mode(mode: &str) -> MetadataResult {
        let fields = MetadataField::ALL
            .iter()
            .map(|field| match field {
                MetadataField::GameMode => ResolvedField {
                    text: mode.to_string(),
                    confidence: 0.95,
                    level: ConfidenceLevel::High,
                    matched: true,
                },
                other => ResolvedField::defaulted(other.default_text()),
            })
            .collect();
        MetadataResult::new(fields)
    }

    fn player(row: usize, name: &str) -> PlayerResult {
        let fields = PlayerField::ALL
            .iter()
            .map(|field| match field {
                PlayerField::Name => ResolvedField::defaulted(name),
                _ => ResolvedField::defaulted("7"),
            })
            .collect();
        PlayerResult::new(row, fields)
    }

    #[test]
    fn test_field_serializes_as_pair() {
        let detection = Detection::new(Quad::from_box(0.0, 0.0, 1.0, 1.0), " ShotZZy ", 0.8);
        let field = ResolvedField::from_detection(&detection, &ConfidenceThresholds::default());
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            serde_json::json!(["shotzzy", "medium"])
        );
    }

    #[test]
    fn test_defaulted_is_lowest_confidence() {
        let field = ResolvedField::defaulted("0:00");
        assert_eq!(field.level, ConfidenceLevel::Low);
        assert!(!field.matched);
    }

    #[test]
    fn test_result_json_shape_uses_mode_aliases() {
        let result = ExtractionResult::new(metadata_with_mode("hardpoint"), vec![player(0, "simp")]);
        assert_eq!(result.game_mode, GameMode::Hardpoint);

        let json = result.to_json().unwrap();
        assert_eq!(json["metadata"]["game_mode"], serde_json::json!(["hardpoint", "high"]));
        assert_eq!(json["metadata"]["elapsed_time"], serde_json::json!(["0:00", "low"]));
        assert_eq!(json["players"][0]["name"], serde_json::json!(["simp", "low"]));
        assert!(json["players"][0].get("hill_time").is_some());
        assert!(json["players"][0].get("mode_stat_one").is_none());
    }

    #[test]
    fn test_unknown_mode_keeps_canonical_keys() {
        let result = ExtractionResult::new(metadata_with_mode("gunfight"), vec![player(2, "cellium")]);
        let json = result.to_json().unwrap();
        assert!(json["players"][0].get("mode_stat_one").is_some());
    }

    #[test]
    fn test_defaulted_metadata_listing() {
        let metadata = metadata_with_mode("control");
        assert_eq!(metadata.defaulted().len(), MetadataField::ALL.len() - 1);
        assert!(!metadata.defaulted().contains(&MetadataField::GameMode));
    }
}
