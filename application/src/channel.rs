//! Per-job callback channel — one-shot request/reply between the worker
//! thread and the owning driver.
//!
//! The worker side wraps each cross-thread call in a [`CallbackEnvelope`]
//! with a fresh rendezvous reply channel, sends it on the job's request
//! channel and blocks until the owning side has executed the bound
//! function and written the reply. Every envelope and reply channel lives
//! for exactly one call; the request channel lives for exactly one job.
//! Nothing here is shared across jobs, so concurrently submitted jobs
//! cannot corrupt each other's in-flight calls.

use crate::ports::script_engine::ScriptError;
use crate::registry::CallbackBinding;
use std::sync::Arc;
use std::sync::mpsc::{RecvTimeoutError, SyncSender, sync_channel};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Single-use request/response record for one cross-thread callback call.
pub struct CallbackEnvelope {
    binding: Arc<CallbackBinding>,
    parameter: String,
    reply_tx: SyncSender<String>,
}

impl CallbackEnvelope {
    /// Owning side: run the bound function, then wake the waiting worker.
    ///
    /// The reply is sent only after `invoke` has returned, so the worker
    /// can never observe a partially produced value. If the worker has
    /// already given up (bounded wait expired), the send result is
    /// discarded and the envelope simply drops.
    pub fn answer(self) {
        let value = self.binding.invoke(&self.parameter);
        let _ = self.reply_tx.send(value);
    }

    pub fn callback_name(&self) -> &str {
        self.binding.name()
    }
}

/// Worker-side sender half of a job's callback channel.
///
/// Clones live inside the engine's registered callbacks; when the run
/// finishes and the engine drops them, the channel disconnects and the
/// owning driver's service loop ends.
#[derive(Clone)]
pub struct CallbackBridge {
    request_tx: UnboundedSender<CallbackEnvelope>,
    reply_timeout: Option<Duration>,
}

/// Create the channel pair for one job.
///
/// `reply_timeout` bounds how long a worker-side call waits for the
/// owning side; `None` waits indefinitely.
pub fn callback_channel(
    reply_timeout: Option<Duration>,
) -> (CallbackBridge, UnboundedReceiver<CallbackEnvelope>) {
    let (request_tx, request_rx) = unbounded_channel();
    (
        CallbackBridge {
            request_tx,
            reply_timeout,
        },
        request_rx,
    )
}

impl CallbackBridge {
    /// Hand `parameter` to the owning side and block until it has executed
    /// the bound function and written the reply.
    ///
    /// Worker thread only — this parks the current thread. Errors mean the
    /// reply can no longer arrive (owning side gone, or the bounded wait
    /// expired); the engine is expected to fail the run with them.
    pub fn call(
        &self,
        binding: &Arc<CallbackBinding>,
        parameter: String,
    ) -> Result<String, ScriptError> {
        let (reply_tx, reply_rx) = sync_channel(1);
        let envelope = CallbackEnvelope {
            binding: Arc::clone(binding),
            parameter,
            reply_tx,
        };

        self.request_tx
            .send(envelope)
            .map_err(|_| gone(binding.name()))?;

        match self.reply_timeout {
            None => reply_rx.recv().map_err(|_| gone(binding.name())),
            Some(timeout) => reply_rx.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => ScriptError {
                    message: format!(
                        "host callback '{}': no reply within {}ms",
                        binding.name(),
                        timeout.as_millis()
                    ),
                },
                RecvTimeoutError::Disconnected => gone(binding.name()),
            }),
        }
    }
}

fn gone(name: &str) -> ScriptError {
    ScriptError {
        message: format!("host callback '{}': owning side is gone", name),
    }
}
