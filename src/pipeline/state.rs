/// Run state machine
///
/// A run moves strictly forward through its stages, or drops to `Failed`
/// from any non-terminal stage. Each stage maps to a fixed progress
/// percentage.
use serde::{Deserialize, Serialize};

/// Stage of an extraction run
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    #[default]
    Start,
    Masked,
    MetadataOcrDone,
    PlayerOcrDone,
    MetadataResolved,
    PlayersResolved,
    Failed,
}

impl RunState {
    /// Progress percentage reported on entering this stage.
    /// `Failed` has none; a failed run repeats its last percentage.
    pub fn percentage(&self) -> Option<u8> {
        match self {
            RunState::Start => Some(0),
            RunState::Masked => Some(15),
            RunState::MetadataOcrDone => Some(45),
            RunState::PlayerOcrDone => Some(75),
            RunState::MetadataResolved => Some(85),
            RunState::PlayersResolved => Some(100),
            RunState::Failed => None,
        }
    }

    /// The stage that follows this one on success
    pub fn next(&self) -> Option<RunState> {
        match self {
            RunState::Start => Some(RunState::Masked),
            RunState::Masked => Some(RunState::MetadataOcrDone),
            RunState::MetadataOcrDone => Some(RunState::PlayerOcrDone),
            RunState::PlayerOcrDone => Some(RunState::MetadataResolved),
            RunState::MetadataResolved => Some(RunState::PlayersResolved),
            RunState::PlayersResolved | RunState::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::PlayersResolved | RunState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Start => "START",
            RunState::Masked => "MASKED",
            RunState::MetadataOcrDone => "METADATA_OCR_DONE",
            RunState::PlayerOcrDone => "PLAYER_OCR_DONE",
            RunState::MetadataResolved => "METADATA_RESOLVED",
            RunState::PlayersResolved => "PLAYERS_RESOLVED",
            RunState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State transition results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// Run already finished (success or failure)
    Finished(RunState),

    /// Target is not the next stage
    OutOfOrder { from: RunState, to: RunState },
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::Finished(state) => write!(f, "Run already finished in {}", state),
            TransitionError::OutOfOrder { from, to } => {
                write!(f, "Cannot move from {} to {}", from, to)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// State machine for run transitions
#[derive(Debug, Default)]
pub struct RunStateMachine {
    state: RunState,
    /// Highest percentage reached so far
    reached: u8,
}

impl RunStateMachine {
    /// Create a new state machine in the Start state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Percentage of the last successful stage
    pub fn percentage(&self) -> u8 {
        self.reached
    }

    /// Move to `to`, which must be the next linear stage
    pub fn advance(&mut self, to: RunState) -> Result<u8, TransitionError> {
        if self.state.is_terminal() {
            return Err(TransitionError::Finished(self.state));
        }
        if self.state.next() != Some(to) {
            return Err(TransitionError::OutOfOrder {
                from: self.state,
                to,
            });
        }

        self.state = to;
        if let Some(percentage) = to.percentage() {
            self.reached = percentage;
        }
        Ok(self.reached)
    }

    /// Move to `Failed`; returns the percentage the run stopped at
    pub fn fail(&mut self) -> Result<u8, TransitionError> {
        if self.state.is_terminal() {
            return Err(TransitionError::Finished(self.state));
        }
        self.state = RunState::Failed;
        Ok(self.reached)
    }
}
