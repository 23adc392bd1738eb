//! Scoreboard OCR extraction.
//!
//! Recovers match metadata and per-player statistics from a scoreboard
//! screenshot. The OCR engine and the masking step are injected; the crate
//! owns the field geometry, matching, confidence bucketing and the run
//! state machine with its progress reporting.

pub mod config;
pub mod error;
pub mod extraction;
pub mod geometry;
pub mod logging;
pub mod masking;
pub mod modes;
pub mod ocr;
pub mod pipeline;
pub mod progress;

pub use config::Config;
pub use error::{AppResult, ExtractionError};
pub use extraction::{ExtractionResult, MetadataResult, PlayerResult, ResolvedField};
pub use geometry::{Bounds, FieldRegistry, MetadataField, PlayerField, Point, Quad, RowLayout};
pub use masking::{MaskSet, Masker};
pub use modes::GameMode;
pub use ocr::{ConfidenceLevel, ConfidenceThresholds, Detection, FieldMatcher, OcrEngine, OcrRegion};
pub use pipeline::{Pipeline, PipelineConfig, RunState};
pub use progress::{ProgressBus, ProgressSink, ProgressStore, ProgressUpdate, RunId};
