//! Callback registry — validated host api bindings.
//!
//! Built once per run by copying and validating the caller-supplied api
//! mapping; read-only afterwards. Bindings are shared as `Arc`s so that
//! worker-side engine closures can reference them for the job's full
//! lifetime while the bound functions themselves only ever execute on the
//! owning side (async path) or the calling thread (sync path).

use gangway_domain::ArgumentError;
use std::collections::HashMap;
use std::sync::Arc;

/// Host-side function bound to one api name: one string in, one string out.
///
/// `Send + Sync` because the binding is referenced (not executed) from the
/// worker thread while a job is in flight.
pub type HostFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Caller-supplied api mapping, as handed to the run entry points.
pub type ScriptApi = HashMap<String, HostFn>;

/// One validated name → host function binding.
#[derive(Clone)]
pub struct CallbackBinding {
    name: String,
    function: HostFn,
}

impl CallbackBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the bound host function.
    pub fn invoke(&self, parameter: &str) -> String {
        (self.function)(parameter)
    }
}

impl std::fmt::Debug for CallbackBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackBinding")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immutable, validated set of bindings for one run.
pub struct CallbackRegistry {
    bindings: Vec<Arc<CallbackBinding>>,
}

impl CallbackRegistry {
    /// Validate and copy `api` into a registry.
    ///
    /// Every name must be non-empty; the first invalid entry aborts the
    /// whole build and nothing is registered. Value callability is already
    /// guaranteed by the [`HostFn`] type.
    pub fn build(api: &ScriptApi) -> Result<Self, ArgumentError> {
        let mut bindings = Vec::with_capacity(api.len());
        for (name, function) in api {
            if name.is_empty() {
                return Err(ArgumentError::EmptyCallbackName);
            }
            bindings.push(Arc::new(CallbackBinding {
                name: name.clone(),
                function: Arc::clone(function),
            }));
        }
        // The source mapping has no stable order; registration order does.
        bindings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { bindings })
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<CallbackBinding>> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// All bindings, sorted by name.
    pub fn bindings(&self) -> &[Arc<CallbackBinding>] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
