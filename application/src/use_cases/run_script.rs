//! Run Script use case — asynchronous execution with owning-side completion.
//!
//! [`RunScriptUseCase::submit`] validates a run request, prepares a fresh
//! engine with bridged callbacks and hands the actual run to a blocking
//! worker thread. An owning-side driver task services the job's callback
//! channel while the worker runs, then joins the worker and delivers the
//! outcome through the completion notifier exactly once.
//!
//! The caller never observes job state from the worker thread: bound host
//! functions and the notifier both execute on the driver.

use crate::channel::{CallbackEnvelope, callback_channel};
use crate::ports::script_engine::{
    EngineError, ScriptEngineFactory, ScriptEnginePort, ScriptError,
};
use crate::registry::{CallbackRegistry, HostFn, ScriptApi};
use gangway_domain::{ArgumentError, ExecutionJob};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info};

/// Errors reported synchronously by [`RunScriptUseCase::submit`], before
/// any worker thread or channel resource exists.
#[derive(Error, Debug)]
pub enum RunScriptError {
    #[error("invalid run request: {0}")]
    Argument(#[from] ArgumentError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Invoked on the owning driver exactly once per submitted job:
/// `Ok` with the run's return value, or `Err` carrying the engine's
/// error text.
pub type CompletionNotifier = Box<dyn FnOnce(Result<String, ScriptError>) + Send + 'static>;

/// Input for both execution paths.
#[derive(Clone)]
pub struct RunScriptInput {
    /// Name of the function the engine calls.
    pub entry_point: String,
    /// Opaque parameter bundle handed to the entry point.
    pub parameters: String,
    /// Script source text.
    pub script: String,
    /// Host functions exposed to the script, by name.
    pub api: ScriptApi,
    /// Bound on a worker's wait for one host callback reply.
    /// `None` waits indefinitely. Ignored by the sync path, which has
    /// no waits at all.
    pub reply_timeout: Option<Duration>,
}

impl RunScriptInput {
    pub fn new(
        entry_point: impl Into<String>,
        parameters: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            entry_point: entry_point.into(),
            parameters: parameters.into(),
            script: script.into(),
            api: ScriptApi::new(),
            reply_timeout: None,
        }
    }

    pub fn with_api(mut self, api: ScriptApi) -> Self {
        self.api = api;
        self
    }

    /// Add a single api entry.
    pub fn with_callback(mut self, name: impl Into<String>, function: HostFn) -> Self {
        self.api.insert(name.into(), function);
        self
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = Some(timeout);
        self
    }
}

/// Handle to an in-flight job.
///
/// Dropping the handle does not cancel the job — submitted jobs always run
/// to completion. [`join`](JobHandle::join) waits until the completion
/// notifier has returned; a panic raised by host code inside the driver
/// (a bound callback or the notifier itself) is resumed here rather than
/// swallowed — it is a bug in host code, not a recoverable runtime error.
pub struct JobHandle {
    driver: JoinHandle<()>,
}

impl JobHandle {
    pub async fn join(self) {
        if let Err(e) = self.driver.await {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
            // Not a panic: the runtime is shutting down and the host is
            // going away with it; there is nothing left to deliver to.
        }
    }
}

/// Use case for running a script on a worker thread.
///
/// Holds only the engine factory; every submission gets its own engine,
/// its own callback channel and its own driver task.
pub struct RunScriptUseCase {
    engines: Arc<dyn ScriptEngineFactory>,
}

impl RunScriptUseCase {
    pub fn new(engines: Arc<dyn ScriptEngineFactory>) -> Self {
        Self { engines }
    }

    /// Validate, prepare and schedule one run.
    ///
    /// Returns without blocking once the driver task is spawned. All
    /// argument and engine-setup failures are reported here, before any
    /// worker thread or channel resource has been created.
    pub fn submit(
        &self,
        input: RunScriptInput,
        on_done: CompletionNotifier,
    ) -> Result<JobHandle, RunScriptError> {
        let job = ExecutionJob::new(input.entry_point, input.parameters, input.script)?;
        let registry = Arc::new(CallbackRegistry::build(&input.api)?);
        let mut engine = self.engines.create()?;

        let (bridge, request_rx) = callback_channel(input.reply_timeout);
        for binding in registry.bindings() {
            let bridge = bridge.clone();
            let bound = Arc::clone(binding);
            engine.register_callback(
                binding.name(),
                Box::new(move |parameter| bridge.call(&bound, parameter)),
            )?;
        }
        // Only the engine's callbacks may keep the request channel open;
        // the driver's service loop ends when the finished run drops them.
        drop(bridge);

        info!(
            entry_point = job.entry_point(),
            callbacks = registry.len(),
            "submitting script job"
        );

        let driver = tokio::spawn(drive(engine, job, registry, request_rx, on_done));
        Ok(JobHandle { driver })
    }
}

/// Owning-side driver for one job: offloads the run to a worker thread,
/// services its callback envelopes, joins it and delivers completion.
async fn drive(
    mut engine: Box<dyn ScriptEnginePort>,
    job: ExecutionJob,
    registry: Arc<CallbackRegistry>,
    mut request_rx: UnboundedReceiver<CallbackEnvelope>,
    on_done: CompletionNotifier,
) {
    let entry_point = job.entry_point().to_string();
    let worker = task::spawn_blocking(move || engine.run(&job));

    // Wake on each worker-side callback call. `answer` runs the bound
    // host function here, never on the worker thread, one at a time.
    let mut serviced = 0usize;
    while let Some(envelope) = request_rx.recv().await {
        debug!(callback = envelope.callback_name(), "servicing host callback");
        envelope.answer();
        serviced += 1;
    }

    let outcome = match worker.await {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        // spawn_blocking closures are never aborted once started; reaching
        // this means the runtime itself is tearing down.
        Err(_) => return,
    };

    debug!(
        entry_point = %entry_point,
        serviced,
        has_error = outcome.has_error(),
        "script job finished"
    );

    on_done(outcome.into_result());
    // Bindings stay alive until the notifier has returned.
    drop(registry);
}
