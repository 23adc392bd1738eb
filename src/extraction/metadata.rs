use super::{MetadataResult, ResolvedField};
use crate::error::GeometryError;
use crate::geometry::{FieldRegistry, MetadataField};
use crate::ocr::{ConfidenceThresholds, Detection, FieldMatcher};

/// Resolve every metadata field against the metadata-region detections.
///
/// A field without a detection takes its catalog default at the lowest
/// confidence; only invalid geometry is an error.
pub fn resolve_metadata(
    registry: &FieldRegistry,
    matcher: &FieldMatcher,
    thresholds: &ConfidenceThresholds,
    detections: &[Detection],
) -> Result<MetadataResult, GeometryError> {
    let mut fields = Vec::with_capacity(MetadataField::ALL.len());

    for field in MetadataField::ALL {
        let bounds = registry.metadata_bounds(field);
        let resolved = match matcher.find(detections, &bounds)? {
            Some(detection) => {
                let value = ResolvedField::from_detection(detection, thresholds);
                tracing::debug!(
                    field = field.key(),
                    text = %value.text,
                    confidence = value.confidence,
                    "metadata field matched"
                );
                value
            }
            None => {
                tracing::warn!(
                    field = field.key(),
                    default = field.default_text(),
                    "No detection for metadata field, using default"
                );
                ResolvedField::defaulted(field.default_text())
            }
        };
        fields.push(resolved);
    }

    Ok(MetadataResult::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Quad;
    use crate::ocr::ConfidenceLevel;

    /// Detection centered in `field`'s box
    fn detection_for(
        registry: &FieldRegistry,
        field: MetadataField,
        text: &str,
        confidence: f32,
    ) -> Detection {
        let bounds = registry.metadata_bounds(field);
        let tl = bounds.top_left();
        Detection::new(
            Quad::from_box(tl.x + 4.0, tl.y + 4.0, bounds.width() - 8.0, bounds.height() - 8.0),
            text,
            confidence,
        )
    }

    #[test]
    fn test_all_fields_matched() {
        let registry = FieldRegistry::standard();
        let detections: Vec<Detection> = MetadataField::ALL
            .iter()
            .map(|&field| detection_for(&registry, field, "X", 0.9))
            .collect();

        let result = resolve_metadata(
            &registry,
            &FieldMatcher::default(),
            &ConfidenceThresholds::default(),
            &detections,
        )
        .unwrap();

        assert!(result.defaulted().is_empty());
        for (_, value) in result.iter() {
            assert_eq!(value.text, "x");
            assert_eq!(value.level, ConfidenceLevel::High);
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let registry = FieldRegistry::standard();
        let detections = vec![detection_for(&registry, MetadataField::GameMode, "Hardpoint", 0.8)];

        let result = resolve_metadata(
            &registry,
            &FieldMatcher::default(),
            &ConfidenceThresholds::default(),
            &detections,
        )
        .unwrap();

        let mode = result.get(MetadataField::GameMode);
        assert_eq!(mode.text, "hardpoint");
        assert_eq!(mode.level, ConfidenceLevel::Medium);

        let elapsed = result.get(MetadataField::ElapsedTime);
        assert_eq!(elapsed.text, "0:00");
        assert_eq!(elapsed.level, ConfidenceLevel::Low);
        assert_eq!(result.get(MetadataField::TeamTwoScore).text, "0");
        assert_eq!(result.get(MetadataField::MapName).text, "");
    }

    #[test]
    fn test_no_detections_is_not_an_error() {
        let registry = FieldRegistry::standard();
        let result = resolve_metadata(
            &registry,
            &FieldMatcher::default(),
            &ConfidenceThresholds::default(),
            &[],
        )
        .unwrap();
        assert_eq!(result.defaulted().len(), MetadataField::ALL.len());
    }
}
