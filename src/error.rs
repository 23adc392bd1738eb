use thiserror::Error;

/// Library errors using thiserror for structured error handling.
///
/// Field-level gaps (an unmatched field) are never errors; these types only
/// describe structural failures of a run or programmer mistakes in layouts.

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid bounds: ({min_x}, {min_y}) -> ({max_x}, {max_y})")]
    InvalidBounds {
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    },

    #[error("Invalid row index {row} (expected 0..={max})")]
    InvalidRow { row: usize, max: usize },

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Mask asset missing: {path}")]
    MaskAssetMissing { path: String },

    #[error("Failed to decode mask asset: {path}")]
    MaskDecodeFailed {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to decode screenshot")]
    ImageDecodeFailure(#[source] image::ImageError),

    #[error("Mask is {mask_width}x{mask_height} but screenshot is {width}x{height}")]
    DimensionMismatch {
        mask_width: u32,
        mask_height: u32,
        width: u32,
        height: u32,
    },
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine failed on the {region} region")]
    EngineFailed {
        region: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("OCR engine returned no detections for the {region} region")]
    NoDetections { region: &'static str },
}

/// Run-level failure returned by the extraction pipeline.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("No player data recovered from any scoreboard row")]
    NoPlayersRecovered,
}

impl ExtractionError {
    /// Stable code for callers that classify failures.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::Geometry(GeometryError::InvalidBounds { .. }) => "invalid_bounds",
            ExtractionError::Geometry(GeometryError::InvalidRow { .. }) => "invalid_row",
            ExtractionError::Geometry(GeometryError::InvalidLayout(_)) => "invalid_layout",
            ExtractionError::Input(InputError::MaskAssetMissing { .. })
            | ExtractionError::Input(InputError::MaskDecodeFailed { .. }) => "mask_asset_missing",
            ExtractionError::Input(InputError::DimensionMismatch { .. }) => "mask_dimension_mismatch",
            ExtractionError::Input(InputError::ImageDecodeFailure(_)) => "image_decode_failure",
            ExtractionError::Ocr(_) => "ocr_failure",
            ExtractionError::NoPlayersRecovered => "no_players_recovered",
        }
    }
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
