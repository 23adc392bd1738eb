use rayon::prelude::*;

use super::{PlayerResult, ResolvedField};
use crate::error::GeometryError;
use crate::geometry::{FieldRegistry, PlayerField, RowLayout};
use crate::modes::GameMode;
use crate::ocr::{ConfidenceThresholds, Detection, FieldMatcher};

/// Shared inputs for resolving one row
struct RowContext<'a> {
    registry: &'a FieldRegistry,
    layout: &'a RowLayout,
    matcher: &'a FieldMatcher,
    thresholds: &'a ConfidenceThresholds,
    mode: GameMode,
    detections: &'a [Detection],
}

/// Resolve every scoreboard row against the player-region detections.
///
/// Rows are resolved in parallel and returned in ascending row order. A row
/// whose name field has no detection is skipped; any other missing field
/// takes the mode's placeholder at the lowest confidence.
pub fn resolve_players(
    registry: &FieldRegistry,
    layout: &RowLayout,
    matcher: &FieldMatcher,
    thresholds: &ConfidenceThresholds,
    mode: GameMode,
    detections: &[Detection],
) -> Result<Vec<PlayerResult>, GeometryError> {
    let ctx = RowContext {
        registry,
        layout,
        matcher,
        thresholds,
        mode,
        detections,
    };

    let rows: Vec<Option<PlayerResult>> = (0..layout.row_count())
        .into_par_iter()
        .map(|row| resolve_row(&ctx, row))
        .collect::<Result<_, _>>()?;

    Ok(rows.into_iter().flatten().collect())
}

fn resolve_row(ctx: &RowContext<'_>, row: usize) -> Result<Option<PlayerResult>, GeometryError> {
    let name_bounds = ctx
        .layout
        .adjust(&ctx.registry.player_bounds(PlayerField::Name), row)?;

    let name = match ctx.matcher.find(ctx.detections, &name_bounds)? {
        Some(detection) => detection,
        None => {
            tracing::debug!(row, "No player name detected, skipping row");
            return Ok(None);
        }
    };

    let mut fields = Vec::with_capacity(PlayerField::ALL.len());
    for field in PlayerField::ALL {
        if field == PlayerField::Name {
            fields.push(ResolvedField::from_detection(name, ctx.thresholds));
            continue;
        }

        let bounds = ctx
            .layout
            .adjust(&ctx.registry.player_bounds(field), row)?;
        let resolved = match ctx.matcher.find(ctx.detections, &bounds)? {
            Some(detection) => ResolvedField::from_detection(detection, ctx.thresholds),
            None => {
                tracing::debug!(row, field = ctx.mode.stat_key(field), "player field defaulted");
                ResolvedField::defaulted(ctx.mode.placeholder(field))
            }
        };
        fields.push(resolved);
    }

    Ok(Some(PlayerResult::new(row, fields)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Quad;
    use crate::ocr::ConfidenceLevel;

    fn cell(
        registry: &FieldRegistry,
        layout: &RowLayout,
        field: PlayerField,
        row: usize,
        text: &str,
    ) -> Detection {
        let bounds = layout.adjust(&registry.player_bounds(field), row).unwrap();
        let tl = bounds.top_left();
        Detection::new(
            Quad::from_box(tl.x + 5.0, tl.y + 5.0, bounds.width() - 10.0, bounds.height() - 10.0),
            text,
            0.9,
        )
    }

    fn resolve(detections: &[Detection], mode: GameMode) -> Vec<PlayerResult> {
        resolve_players(
            &FieldRegistry::standard(),
            &RowLayout::default(),
            &FieldMatcher::default(),
            &ConfidenceThresholds::default(),
            mode,
            detections,
        )
        .unwrap()
    }

    #[test]
    fn test_rows_in_order_and_nameless_rows_dropped() {
        let registry = FieldRegistry::standard();
        let layout = RowLayout::default();
        // Emit in reverse so order cannot come from the input
        let detections: Vec<Detection> = [6usize, 4, 1]
            .iter()
            .map(|&row| cell(&registry, &layout, PlayerField::Name, row, &format!("P{}", row)))
            .collect();

        let players = resolve(&detections, GameMode::Unknown);
        let rows: Vec<usize> = players.iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![1, 4, 6]);
        assert_eq!(players[0].name(), "p1");
    }

    #[test]
    fn test_missing_stats_use_mode_placeholders() {
        let registry = FieldRegistry::standard();
        let layout = RowLayout::default();
        let detections = vec![
            cell(&registry, &layout, PlayerField::Name, 5, "Simp"),
            cell(&registry, &layout, PlayerField::Damage, 5, "4120"),
        ];

        let players = resolve(&detections, GameMode::Hardpoint);
        assert_eq!(players.len(), 1);
        let player = &players[0];
        assert_eq!(player.get(PlayerField::Damage).text, "4120");
        assert_eq!(player.get(PlayerField::Damage).level, ConfidenceLevel::High);

        let hill_time = player.get(PlayerField::ModeStatOne);
        assert_eq!(hill_time.text, "0:00");
        assert_eq!(hill_time.level, ConfidenceLevel::Low);
        assert_eq!(player.get(PlayerField::Kd).text, "0/0");
        assert_eq!(player.get(PlayerField::Assists).text, "0");
    }

    #[test]
    fn test_stats_without_name_are_ignored() {
        let registry = FieldRegistry::standard();
        let layout = RowLayout::default();
        let detections = vec![cell(&registry, &layout, PlayerField::Kd, 2, "10/5")];
        assert!(resolve(&detections, GameMode::Control).is_empty());
    }

    #[test]
    fn test_jittered_name_claims_one_row() {
        let registry = FieldRegistry::standard();
        let name = registry.player_bounds(PlayerField::Name);
        // centroid 8px below row 0's box, inside its tolerance
        let cy = name.bottom_right().y + 8.0;
        let detection = Detection::new(
            Quad::from_box(name.top_left().x + 20.0, cy - 5.0, 100.0, 10.0),
            "Shotzzy",
            0.9,
        );

        let players = resolve(&[detection], GameMode::Unknown);
        let rows: Vec<usize> = players.iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![0]);
    }

    #[test]
    fn test_jittered_cell_fills_one_field() {
        let registry = FieldRegistry::standard();
        let layout = RowLayout::default();
        let kd = registry.player_bounds(PlayerField::Kd);
        // centroid 10px right of the Kd box, in the gap before Assists
        let cx = kd.bottom_right().x + 10.0;
        let detections = vec![
            cell(&registry, &layout, PlayerField::Name, 0, "Shotzzy"),
            Detection::new(
                Quad::from_box(cx - 15.0, kd.top_left().y + 5.0, 30.0, 20.0),
                "29/19",
                0.9,
            ),
        ];

        let players = resolve(&detections, GameMode::Unknown);
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].get(PlayerField::Kd).text, "29/19");
        assert_eq!(players[0].get(PlayerField::Assists).text, "0");
        assert!(!players[0].get(PlayerField::Assists).matched);
    }

    #[test]
    fn test_second_team_uses_gap() {
        let registry = FieldRegistry::standard();
        let layout = RowLayout::default();
        // A name placed at row 4 without the gap lands between rows 3 and 4
        // and must not be claimed by either.
        let name_bounds = registry.player_bounds(PlayerField::Name);
        let no_gap_y = name_bounds.top_left().y + 4.0 * layout.row_height;
        let misplaced = Detection::new(
            Quad::from_box(name_bounds.top_left().x + 5.0, no_gap_y + 25.0, 100.0, 10.0),
            "ghost",
            0.9,
        );
        assert!(resolve(&[misplaced], GameMode::Unknown).is_empty());

        let placed = cell(&registry, &layout, PlayerField::Name, 4, "Real");
        let players = resolve(&[placed], GameMode::Unknown);
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].row, 4);
    }
}
