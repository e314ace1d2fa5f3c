//! Run Script Sync use case — inline execution on the calling thread.
//!
//! Same validation and registry construction as the async path, but the
//! calling thread already owns both the script run and the host state, so
//! callbacks are invoked directly: no channel, no thread hop, no blocking
//! wait. The outcome is returned to the caller instead of going through a
//! completion notifier.

use crate::ports::script_engine::{EngineError, ScriptEngineFactory, ScriptError};
use crate::registry::CallbackRegistry;
use crate::use_cases::run_script::RunScriptInput;
use gangway_domain::{ArgumentError, ExecutionJob};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors from the inline execution path.
#[derive(Error, Debug)]
pub enum RunScriptSyncError {
    #[error("invalid run request: {0}")]
    Argument(#[from] ArgumentError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Use case for running a script inline, blocking the caller.
pub struct RunScriptSyncUseCase {
    engines: Arc<dyn ScriptEngineFactory>,
}

impl RunScriptSyncUseCase {
    pub fn new(engines: Arc<dyn ScriptEngineFactory>) -> Self {
        Self { engines }
    }

    /// Run the script to completion on the calling thread.
    ///
    /// Script failure surfaces as [`RunScriptSyncError::Script`] carrying
    /// the engine's error text; `input.reply_timeout` is irrelevant here
    /// because no cross-thread wait ever happens.
    pub fn execute(&self, input: RunScriptInput) -> Result<String, RunScriptSyncError> {
        let job = ExecutionJob::new(input.entry_point, input.parameters, input.script)?;
        let registry = CallbackRegistry::build(&input.api)?;
        let mut engine = self.engines.create()?;

        for binding in registry.bindings() {
            let bound = Arc::clone(binding);
            engine.register_callback(
                binding.name(),
                Box::new(move |parameter| Ok(bound.invoke(&parameter))),
            )?;
        }

        debug!(
            entry_point = job.entry_point(),
            callbacks = registry.len(),
            "running script inline"
        );

        let result = engine.run(&job).into_result();
        result.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::script_engine::{EngineCallback, EngineOutcome, ScriptEnginePort};
    use crate::registry::HostFn;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Inline counterpart of the async test engine: `value:`, `fail:` and
    /// `chain:<name>:<times>` scripts, driven without any runtime.
    struct ScriptedEngine {
        callbacks: HashMap<String, EngineCallback>,
    }

    impl ScriptEnginePort for ScriptedEngine {
        fn register_callback(
            &mut self,
            name: &str,
            callback: EngineCallback,
        ) -> Result<(), EngineError> {
            self.callbacks.insert(name.to_string(), callback);
            Ok(())
        }

        fn run(&mut self, job: &ExecutionJob) -> EngineOutcome {
            let script = job.script();
            if let Some(text) = script.strip_prefix("value:") {
                EngineOutcome::success(text)
            } else if let Some(text) = script.strip_prefix("fail:") {
                EngineOutcome::failure(text)
            } else if let Some(spec) = script.strip_prefix("chain:") {
                let (name, times) = spec.rsplit_once(':').unwrap();
                let callback = &self.callbacks[name];
                let mut value = job.parameters().to_string();
                for _ in 0..times.parse::<usize>().unwrap() {
                    match callback(value) {
                        Ok(reply) => value = reply,
                        Err(e) => return EngineOutcome::failure(e.message),
                    }
                }
                EngineOutcome::success(value)
            } else {
                EngineOutcome::failure(format!("unrecognized script: {}", script))
            }
        }
    }

    struct ScriptedFactory {
        created: AtomicUsize,
    }

    impl ScriptedFactory {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                created: AtomicUsize::new(0),
            })
        }
    }

    impl ScriptEngineFactory for ScriptedFactory {
        fn create(&self) -> Result<Box<dyn ScriptEnginePort>, EngineError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(ScriptedEngine {
                callbacks: HashMap::new(),
            }))
        }
    }

    #[test]
    fn test_literal_value_returns_unchanged() {
        let use_case = RunScriptSyncUseCase::new(ScriptedFactory::new());
        let input = RunScriptInput::new("main", "{}", "value:plain literal");
        assert_eq!(use_case.execute(input).unwrap(), "plain literal");
    }

    #[test]
    fn test_callbacks_run_inline() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let step: HostFn = Arc::new(move |p: &str| {
            record.lock().unwrap().push(p.to_string());
            format!("{}!", p)
        });

        let use_case = RunScriptSyncUseCase::new(ScriptedFactory::new());
        let input = RunScriptInput::new("main", "go", "chain:step:2").with_callback("step", step);

        assert_eq!(use_case.execute(input).unwrap(), "go!!");
        assert_eq!(*seen.lock().unwrap(), ["go", "go!"]);
    }

    #[test]
    fn test_script_failure_is_an_error() {
        let use_case = RunScriptSyncUseCase::new(ScriptedFactory::new());
        let input = RunScriptInput::new("main", "{}", "fail:kaboom");

        let error = use_case.execute(input).unwrap_err();
        match error {
            RunScriptSyncError::Script(e) => assert_eq!(e.message, "kaboom"),
            other => panic!("expected script error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_api_fails_before_engine_creation() {
        let factory = ScriptedFactory::new();
        let use_case = RunScriptSyncUseCase::new(factory.clone());

        let input = RunScriptInput::new("main", "{}", "value:ok")
            .with_callback("", Arc::new(|_: &str| String::new()) as HostFn);
        let error = use_case.execute(input).unwrap_err();

        assert!(matches!(
            error,
            RunScriptSyncError::Argument(ArgumentError::EmptyCallbackName)
        ));
        assert_eq!(factory.created.load(Ordering::SeqCst), 0);
    }
}
