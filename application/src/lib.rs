//! Application layer for gangway
//!
//! The cross-thread execution and callback-bridging subsystem: engine
//! ports, the validated callback registry, the per-job request/reply
//! channel, and the two execution use cases (worker-thread with
//! owning-side completion, and inline). Depends only on the domain layer.

pub mod channel;
pub mod ports;
pub mod registry;
pub mod use_cases;

// Re-export commonly used types
pub use ports::script_engine::{
    EngineCallback, EngineError, EngineOutcome, ScriptEngineFactory, ScriptEnginePort, ScriptError,
};
pub use registry::{CallbackBinding, CallbackRegistry, HostFn, ScriptApi};
pub use use_cases::run_script::{
    CompletionNotifier, JobHandle, RunScriptError, RunScriptInput, RunScriptUseCase,
};
pub use use_cases::run_script_sync::{RunScriptSyncError, RunScriptSyncUseCase};
