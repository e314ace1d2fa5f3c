//! Script engine port — interface to the embedded interpreter.
//!
//! The bridge drives the engine exclusively through this trait so that:
//! - The application layer never depends on a concrete interpreter
//! - Engines are created fresh per job through [`ScriptEngineFactory`]
//! - Tests can substitute a scripted fake for the real VM
//!
//! The infrastructure layer provides the mlua-backed implementation.

use gangway_domain::ExecutionJob;
use thiserror::Error;

/// Error from a script run, carrying the engine's error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub message: String,
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "script error: {}", self.message)
    }
}

impl std::error::Error for ScriptError {}

/// Failure while setting an engine up, before any script has run.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("engine setup failed: {0}")]
    Setup(String),

    #[error("callback registration failed for '{name}': {reason}")]
    Registration { name: String, reason: String },
}

/// Result of one engine run.
///
/// `error_code` zero means success and `value` is the run's return value;
/// any other code means `value` carries the engine's error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutcome {
    pub error_code: i32,
    pub value: String,
}

impl EngineOutcome {
    pub fn success(value: impl Into<String>) -> Self {
        Self {
            error_code: 0,
            value: value.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error_code: 1,
            value: message.into(),
        }
    }

    pub fn has_error(&self) -> bool {
        self.error_code != 0
    }

    /// Split the outcome at the engine boundary: `Err` iff the error code
    /// is non-zero, carrying the engine's text either way.
    pub fn into_result(self) -> Result<String, ScriptError> {
        if self.has_error() {
            Err(ScriptError {
                message: self.value,
            })
        } else {
            Ok(self.value)
        }
    }
}

/// Callback installed into the engine for one api entry.
///
/// Invoked by the engine on whichever thread runs the script. An `Err`
/// must surface as a script-level error at the invocation site — this is
/// how a torn-down or timed-out bridge unwinds the run instead of leaving
/// the worker stuck.
pub type EngineCallback = Box<dyn Fn(String) -> Result<String, ScriptError> + Send>;

/// Port for the embedded script engine.
///
/// Callbacks are registered once per api entry, before [`run`] is called;
/// `run` executes `entry_point(parameters)` against the script source and
/// never panics — engine-level failures come back in the outcome.
///
/// [`run`]: ScriptEnginePort::run
pub trait ScriptEnginePort: Send {
    fn register_callback(&mut self, name: &str, callback: EngineCallback)
    -> Result<(), EngineError>;

    fn run(&mut self, job: &ExecutionJob) -> EngineOutcome;
}

/// Creates one fresh engine per job.
///
/// A job must never observe globals leaked by a previous run, so engines
/// are not pooled or reused.
pub trait ScriptEngineFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn ScriptEnginePort>, EngineError>;
}
