//! Script execution job
//!
//! The immutable inputs of one script run. A job is created by the caller,
//! moved into whichever execution path runs it, and dropped when the run's
//! outcome has been delivered. The outcome itself travels back by move, so
//! the worker writes it once and the owning side reads it once — there is
//! no shared mutable state between the two.

use crate::error::ArgumentError;

/// One script run: which function to call, with what parameter bundle,
/// against which source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionJob {
    entry_point: String,
    parameters: String,
    script: String,
}

impl ExecutionJob {
    /// Create a job. The entry point must be non-empty; `parameters` and
    /// `script` are opaque to the bridge and passed to the engine verbatim.
    pub fn new(
        entry_point: impl Into<String>,
        parameters: impl Into<String>,
        script: impl Into<String>,
    ) -> Result<Self, ArgumentError> {
        let entry_point = entry_point.into();
        if entry_point.is_empty() {
            return Err(ArgumentError::EmptyEntryPoint);
        }
        Ok(Self {
            entry_point,
            parameters: parameters.into(),
            script: script.into(),
        })
    }

    /// Name of the function the engine calls.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Parameter bundle handed to the entry point, verbatim.
    pub fn parameters(&self) -> &str {
        &self.parameters
    }

    /// Script source text.
    pub fn script(&self) -> &str {
        &self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_holds_inputs_verbatim() {
        let job = ExecutionJob::new("main", "{\"a\":1}", "function main(p) return p end").unwrap();
        assert_eq!(job.entry_point(), "main");
        assert_eq!(job.parameters(), "{\"a\":1}");
        assert_eq!(job.script(), "function main(p) return p end");
    }

    #[test]
    fn test_empty_entry_point_is_rejected() {
        let result = ExecutionJob::new("", "{}", "function main(p) end");
        assert_eq!(result.unwrap_err(), ArgumentError::EmptyEntryPoint);
    }

    #[test]
    fn test_empty_parameters_and_script_are_allowed() {
        // Only the entry point is constrained; the engine decides whether
        // an empty script is meaningful.
        assert!(ExecutionJob::new("main", "", "").is_ok());
    }
}
