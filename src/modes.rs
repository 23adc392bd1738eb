/// Game modes and mode-specific stat naming
///
/// The player table always has six mode-dependent stat columns. They are
/// resolved under canonical names (`mode_stat_one` ... `mode_stat_six`) and
/// only renamed when the result is presented.
use serde::{Deserialize, Serialize};

use crate::geometry::PlayerField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Hardpoint,
    SearchAndDestroy,
    Control,
    #[default]
    Unknown,
}

const HARDPOINT_STATS: [&str; 6] = [
    "hill_time",
    "average_hill_time",
    "objective_kills",
    "contested_hill_time",
    "kills_per_hill",
    "damage_per_hill",
];

const SEARCH_AND_DESTROY_STATS: [&str; 6] = [
    "bombs_planted",
    "bombs_defused",
    "first_bloods",
    "first_deaths",
    "kills_per_round",
    "damage_per_round",
];

const CONTROL_STATS: [&str; 6] = [
    "tiers_captured",
    "objective_kills",
    "offense_kills",
    "defense_kills",
    "kills_per_round",
    "damage_per_round",
];

impl GameMode {
    /// Parse the resolved `game_mode` text. Unrecognized text is `Unknown`.
    pub fn from_text(text: &str) -> Self {
        let folded = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        match folded.as_str() {
            "hardpoint" | "hp" => GameMode::Hardpoint,
            "search and destroy" | "search & destroy" | "snd" | "s&d" => {
                GameMode::SearchAndDestroy
            }
            "control" | "ctl" | "cntrl" => GameMode::Control,
            _ => GameMode::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Hardpoint => "hardpoint",
            GameMode::SearchAndDestroy => "search_and_destroy",
            GameMode::Control => "control",
            GameMode::Unknown => "unknown",
        }
    }

    fn stat_names(&self) -> Option<&'static [&'static str; 6]> {
        match self {
            GameMode::Hardpoint => Some(&HARDPOINT_STATS),
            GameMode::SearchAndDestroy => Some(&SEARCH_AND_DESTROY_STATS),
            GameMode::Control => Some(&CONTROL_STATS),
            GameMode::Unknown => None,
        }
    }

    /// Output key for `field` under this mode
    pub fn stat_key(&self, field: PlayerField) -> &'static str {
        match (field.mode_stat_slot(), self.stat_names()) {
            (Some(slot), Some(names)) => names[slot],
            _ => field.key(),
        }
    }

    /// Text used when `field` has no matching detection
    pub fn placeholder(&self, field: PlayerField) -> &'static str {
        match field {
            PlayerField::Name => "",
            PlayerField::Kd => "0/0",
            _ => match self.stat_key(field) {
                "hill_time" | "average_hill_time" | "contested_hill_time" => "0:00",
                _ => "0",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        assert_eq!(GameMode::from_text("hardpoint"), GameMode::Hardpoint);
        assert_eq!(GameMode::from_text("  HP "), GameMode::Hardpoint);
        assert_eq!(
            GameMode::from_text("Search  and Destroy"),
            GameMode::SearchAndDestroy
        );
        assert_eq!(GameMode::from_text("snd"), GameMode::SearchAndDestroy);
        assert_eq!(GameMode::from_text("CONTROL"), GameMode::Control);
        assert_eq!(GameMode::from_text(""), GameMode::Unknown);
        assert_eq!(GameMode::from_text("domination"), GameMode::Unknown);
    }

    #[test]
    fn test_stat_keys() {
        assert_eq!(
            GameMode::Hardpoint.stat_key(PlayerField::ModeStatOne),
            "hill_time"
        );
        assert_eq!(
            GameMode::SearchAndDestroy.stat_key(PlayerField::ModeStatThree),
            "first_bloods"
        );
        assert_eq!(
            GameMode::Control.stat_key(PlayerField::ModeStatSix),
            "damage_per_round"
        );
        assert_eq!(
            GameMode::Unknown.stat_key(PlayerField::ModeStatTwo),
            "mode_stat_two"
        );
        assert_eq!(GameMode::Hardpoint.stat_key(PlayerField::Kd), "kd");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(GameMode::Hardpoint.placeholder(PlayerField::ModeStatOne), "0:00");
        assert_eq!(GameMode::Hardpoint.placeholder(PlayerField::ModeStatFour), "0:00");
        assert_eq!(GameMode::Hardpoint.placeholder(PlayerField::ModeStatThree), "0");
        assert_eq!(GameMode::Control.placeholder(PlayerField::ModeStatOne), "0");
        assert_eq!(GameMode::Unknown.placeholder(PlayerField::Kd), "0/0");
        assert_eq!(GameMode::Unknown.placeholder(PlayerField::Damage), "0");
    }
}
