/// Extraction pipeline
///
/// Coordinates masking, OCR and field resolution for one screenshot.
///
/// A run goes through these stages in order, reporting progress on each:
/// 1. Mask the screenshot into the metadata and player-table regions
/// 2. OCR the metadata region
/// 3. OCR the player-table region
/// 4. Resolve metadata (this also decides the game mode)
/// 5. Resolve player rows
///
/// Any error moves the run to `Failed`; nothing is retried.
pub mod state;

use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ConfigError, ExtractionError};
use crate::extraction::{resolve_metadata, resolve_players, ExtractionResult};
use crate::geometry::{FieldRegistry, RowLayout};
use crate::masking::Masker;
use crate::ocr::{recognize_region, ConfidenceThresholds, FieldMatcher, OcrEngine, OcrRegion};
use crate::progress::{ProgressSink, ProgressUpdate, RunId};

pub use state::{RunState, RunStateMachine, TransitionError};

/// Immutable inputs shared by every run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub registry: Arc<FieldRegistry>,
    pub row_layout: RowLayout,
    pub matcher: FieldMatcher,
    pub thresholds: ConfidenceThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            registry: Arc::new(FieldRegistry::standard()),
            row_layout: RowLayout::default(),
            matcher: FieldMatcher::default(),
            thresholds: ConfidenceThresholds::default(),
        }
    }
}

impl PipelineConfig {
    /// Build from validated settings, loading an alternate layout if one is configured
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: Arc::new(config.field_registry()?),
            row_layout: config.row_layout,
            matcher: FieldMatcher::new(config.match_tolerance),
            thresholds: config.confidence,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        self.row_layout.validate().map_err(ConfigError::Invalid)?;
        let tolerance = self.matcher.tolerance();
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "match tolerance must be a non-negative number, got {}",
                tolerance
            )));
        }
        Ok(())
    }
}

/// Extraction pipeline
pub struct Pipeline {
    config: PipelineConfig,
    masker: Box<dyn Masker>,
    engine: Mutex<Box<dyn OcrEngine>>,
}

impl Pipeline {
    /// Create a new pipeline; fails on invalid thresholds or row layout
    pub fn new(
        config: PipelineConfig,
        masker: Box<dyn Masker>,
        engine: Box<dyn OcrEngine>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        tracing::info!(
            engine = engine.name(),
            tolerance = config.matcher.tolerance(),
            "Extraction pipeline ready"
        );

        Ok(Self {
            config,
            masker,
            engine: Mutex::new(engine),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get engine name
    pub fn engine_name(&self) -> &'static str {
        self.engine.lock().name()
    }

    /// Run with the configured layout
    pub fn run(
        &self,
        run_id: &RunId,
        image_bytes: &[u8],
        sink: &dyn ProgressSink,
    ) -> Result<ExtractionResult, ExtractionError> {
        let registry = Arc::clone(&self.config.registry);
        self.run_with_registry(run_id, image_bytes, &registry, sink)
    }

    /// Run with an alternate field layout for this screenshot only
    pub fn run_with_registry(
        &self,
        run_id: &RunId,
        image_bytes: &[u8],
        registry: &FieldRegistry,
        sink: &dyn ProgressSink,
    ) -> Result<ExtractionResult, ExtractionError> {
        let span = tracing::info_span!("extraction", run_id = %run_id);
        let _enter = span.enter();

        let mut reporter = Reporter::new(run_id.clone(), sink);
        reporter.start();

        match self.execute(image_bytes, registry, &mut reporter) {
            Ok(result) => {
                tracing::info!(
                    players = result.players.len(),
                    mode = result.game_mode.as_str(),
                    "Extraction finished"
                );
                Ok(result)
            }
            Err(err) => {
                tracing::error!(kind = err.kind(), "Extraction failed: {}", err);
                reporter.fail(&err);
                Err(err)
            }
        }
    }

    fn execute(
        &self,
        image_bytes: &[u8],
        registry: &FieldRegistry,
        reporter: &mut Reporter<'_>,
    ) -> Result<ExtractionResult, ExtractionError> {
        // 1. Mask
        let regions = self.masker.apply(image_bytes)?;
        let actual = regions.players.dimensions();
        if actual != registry.canonical_size() {
            tracing::warn!(
                "Screenshot is {}x{} but the layout expects {}x{}",
                actual.0,
                actual.1,
                registry.canonical_size().0,
                registry.canonical_size().1
            );
        }
        reporter.advance(RunState::Masked, None);

        // 2-3. OCR both regions
        let (metadata_detections, player_detections) = {
            let mut engine = self.engine.lock();
            let metadata =
                recognize_region(&mut **engine, OcrRegion::Metadata, &regions.metadata)?;
            reporter.advance(RunState::MetadataOcrDone, None);

            let players =
                recognize_region(&mut **engine, OcrRegion::PlayerTable, &regions.players)?;
            reporter.advance(RunState::PlayerOcrDone, None);

            (metadata, players)
        };

        // 4. Metadata
        let metadata = resolve_metadata(
            registry,
            &self.config.matcher,
            &self.config.thresholds,
            &metadata_detections,
        )?;
        reporter.advance(
            RunState::MetadataResolved,
            serde_json::to_value(&metadata).ok(),
        );

        // 5. Players
        let game_mode = metadata.game_mode();
        let players = resolve_players(
            registry,
            &self.config.row_layout,
            &self.config.matcher,
            &self.config.thresholds,
            game_mode,
            &player_detections,
        )?;
        if players.is_empty() {
            return Err(ExtractionError::NoPlayersRecovered);
        }

        let result = ExtractionResult::new(metadata, players);
        reporter.advance(RunState::PlayersResolved, result.to_json().ok());

        Ok(result)
    }
}

/// Reports each stage change of one run to the sink
struct Reporter<'a> {
    run_id: RunId,
    sink: &'a dyn ProgressSink,
    machine: RunStateMachine,
}

impl<'a> Reporter<'a> {
    fn new(run_id: RunId, sink: &'a dyn ProgressSink) -> Self {
        Self {
            run_id,
            sink,
            machine: RunStateMachine::new(),
        }
    }

    fn start(&self) {
        self.sink.report(ProgressUpdate::new(
            self.run_id.clone(),
            self.machine.state(),
            self.machine.percentage(),
        ));
    }

    fn advance(&mut self, stage: RunState, partial: Option<serde_json::Value>) {
        let percentage = match self.machine.advance(stage) {
            Ok(percentage) => percentage,
            Err(e) => {
                tracing::error!("Progress not reported: {}", e);
                return;
            }
        };

        tracing::info!(stage = stage.as_str(), percentage, "stage complete");

        let mut update = ProgressUpdate::new(self.run_id.clone(), stage, percentage);
        update.partial = partial;
        self.sink.report(update);
    }

    fn fail(&mut self, err: &ExtractionError) {
        let percentage = match self.machine.fail() {
            Ok(percentage) => percentage,
            Err(e) => {
                tracing::error!("Failure not reported: {}", e);
                return;
            }
        };

        let update = ProgressUpdate::new(self.run_id.clone(), RunState::Failed, percentage)
            .with_partial(serde_json::json!({
                "error": err.to_string(),
                "kind": err.kind(),
            }))
            .with_error(err.to_string());
        self.sink.report(update);
    }
}
