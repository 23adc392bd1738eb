use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::geometry::{FieldRegistry, RowLayout};
use crate::masking::{MaskPaths, MaskSet};
use crate::ocr::matcher::DEFAULT_TOLERANCE;
use crate::ocr::ConfidenceThresholds;

fn default_tolerance() -> f32 {
    DEFAULT_TOLERANCE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Confidence bucket thresholds (strictly ascending)
    #[serde(default)]
    pub confidence: ConfidenceThresholds,

    /// Pixels a detection centroid may sit outside a field box and still match
    #[serde(default = "default_tolerance")]
    pub match_tolerance: f32,

    /// Player table row spacing
    #[serde(default)]
    pub row_layout: RowLayout,

    /// Mask images for the two OCR regions
    #[serde(default)]
    pub masks: MaskPaths,

    /// Alternate field layout (JSON); the built-in 1920x1080 layout when unset
    #[serde(default)]
    pub layout_path: Option<PathBuf>,

    /// Log file directory; the user config folder when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Directory relative paths are resolved against (the config file's folder)
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confidence: ConfidenceThresholds::default(),
            match_tolerance: DEFAULT_TOLERANCE,
            row_layout: RowLayout::default(),
            masks: MaskPaths::default(),
            layout_path: None,
            log_dir: None,
            base_dir: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        };

        let content = fs::read_to_string(path).map_err(|e| load_failed(e.into()))?;
        let mut config: Config = serde_json::from_str(&content).map_err(|e| load_failed(e.into()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        config.validate()?;

        tracing::info!("✓ Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Load from the platform config directory.
    /// Creates a default config if the file doesn't exist.
    pub fn load_or_create() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;

        if path.exists() {
            Self::load(&path)
        } else {
            let mut config = Config::default();
            config.save(&path)?;
            config.base_dir = path.parent().map(Path::to_path_buf);
            tracing::info!("✓ Created default config at: {}", path.display());
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source,
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| save_failed(e.into()))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(e.into()))?;
        fs::write(path, json).map_err(|e| save_failed(e.into()))?;

        Ok(())
    }

    /// `<config dir>/ScoreboardOcr/config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("ScoreboardOcr").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.confidence.validate()?;

        if !self.match_tolerance.is_finite() || self.match_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "match_tolerance must be a non-negative number, got {}",
                self.match_tolerance
            )));
        }

        self.row_layout.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Resolve a configured path against the config file's directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Field layout in effect: the alternate layout file or the standard one
    pub fn field_registry(&self) -> Result<FieldRegistry, ConfigError> {
        let Some(layout_path) = &self.layout_path else {
            return Ok(FieldRegistry::standard());
        };

        let path = self.resolve_path(layout_path);
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: e.into(),
        })?;

        let registry = FieldRegistry::from_json(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: e.into(),
        })?;

        tracing::info!("Using field layout from {}", path.display());
        Ok(registry)
    }

    /// Load the configured masks
    pub fn mask_set(&self) -> Result<MaskSet, crate::error::InputError> {
        MaskSet::load(
            &self.resolve_path(&self.masks.player_table),
            &self.resolve_path(&self.masks.metadata),
        )
    }

    /// Log directory in effect
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .as_ref()
            .map(|dir| self.resolve_path(dir))
            .unwrap_or_else(crate::logging::default_log_dir)
    }
}
