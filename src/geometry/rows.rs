/// Row geometry
///
/// The player table is two blocks of four rows. Rows inside a block are a
/// fixed `row_height` apart; the second block starts after an extra
/// `team_gap` of whitespace.
use serde::{Deserialize, Serialize};

use super::Bounds;
use crate::error::GeometryError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowLayout {
    /// Vertical distance between consecutive rows of one team block
    pub row_height: f32,
    /// Extra whitespace between the last row of team one and the first row of team two
    pub team_gap: f32,
    /// Rows in each team block
    pub rows_per_team: usize,
}

impl Default for RowLayout {
    fn default() -> Self {
        Self {
            row_height: 56.0,
            team_gap: 64.0,
            rows_per_team: 4,
        }
    }
}

impl RowLayout {
    /// Total rows on the scoreboard (two team blocks)
    pub fn row_count(&self) -> usize {
        self.rows_per_team * 2
    }

    /// Vertical offset of `row` relative to row 0
    pub fn offset(&self, row: usize) -> Result<f32, GeometryError> {
        let count = self.row_count();
        if row >= count {
            return Err(GeometryError::InvalidRow {
                row,
                max: count.saturating_sub(1),
            });
        }

        let gap = if row >= self.rows_per_team {
            self.team_gap
        } else {
            0.0
        };
        Ok(row as f32 * self.row_height + gap)
    }

    /// Move row-0 bounds of a player field to `row`. Horizontal extent is
    /// unchanged.
    pub fn adjust(&self, bounds: &Bounds, row: usize) -> Result<Bounds, GeometryError> {
        Ok(bounds.translate_y(self.offset(row)?))
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(format!("row_height must be positive, got {}", self.row_height));
        }
        if !(self.team_gap.is_finite() && self.team_gap >= 0.0) {
            return Err(format!("team_gap must be non-negative, got {}", self.team_gap));
        }
        if self.rows_per_team == 0 {
            return Err("rows_per_team must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_bounds() -> Bounds {
        Bounds::from_coords(120.0, 300.0, 420.0, 340.0).unwrap()
    }

    #[test]
    fn test_row_zero_is_identity() {
        let layout = RowLayout::default();
        assert_eq!(layout.adjust(&name_bounds(), 0).unwrap(), name_bounds());
    }

    #[test]
    fn test_rows_are_strictly_ordered() {
        let layout = RowLayout::default();
        let bounds = name_bounds();

        for r1 in 0..8 {
            for r2 in (r1 + 1)..8 {
                let a = layout.adjust(&bounds, r1).unwrap();
                let b = layout.adjust(&bounds, r2).unwrap();
                assert!(a.top_left().y < b.top_left().y);
                assert!(a.bottom_right().y < b.bottom_right().y);
            }
        }
    }

    #[test]
    fn test_team_gap_only_between_blocks() {
        let layout = RowLayout::default();
        let bounds = name_bounds();

        for row in 1..8 {
            let prev = layout.adjust(&bounds, row - 1).unwrap().top_left().y;
            let curr = layout.adjust(&bounds, row).unwrap().top_left().y;
            let expected = if row == 4 {
                layout.row_height + layout.team_gap
            } else {
                layout.row_height
            };
            assert_eq!(curr - prev, expected, "row {}", row);
        }
    }

    #[test]
    fn test_horizontal_bounds_unchanged() {
        let layout = RowLayout::default();
        let adjusted = layout.adjust(&name_bounds(), 6).unwrap();
        assert_eq!(adjusted.top_left().x, 120.0);
        assert_eq!(adjusted.bottom_right().x, 420.0);
    }

    #[test]
    fn test_out_of_range_row() {
        let layout = RowLayout::default();
        assert_eq!(
            layout.adjust(&name_bounds(), 8),
            Err(GeometryError::InvalidRow { row: 8, max: 7 })
        );
    }

    #[test]
    fn test_validate() {
        assert!(RowLayout::default().validate().is_ok());
        let bad = RowLayout {
            row_height: 0.0,
            ..RowLayout::default()
        };
        assert!(bad.validate().is_err());
        let bad = RowLayout {
            rows_per_team: 0,
            ..RowLayout::default()
        };
        assert!(bad.validate().is_err());
    }
}
