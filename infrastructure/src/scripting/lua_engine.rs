//! Lua script engine — `ScriptEnginePort` backed by mlua (Lua 5.4).
//!
//! One `Lua` VM per engine, one engine per job, so runs never observe each
//! other's globals. Registered host callbacks appear to scripts as
//! `api.<name>(param)`; `run` loads the script source and then calls the
//! global entry point with the parameter bundle, coercing the return value
//! through [`ScriptValue`] into the string the bridge transports.

use gangway_application::{
    EngineCallback, EngineError, EngineOutcome, ScriptEngineFactory, ScriptEnginePort,
};
use gangway_domain::{ExecutionJob, ScriptValue};
use mlua::prelude::*;
use tracing::debug;

use super::sandbox::harden;

/// Lua 5.4 engine implementing `ScriptEnginePort`.
pub struct LuaScriptEngine {
    lua: Lua,
}

impl LuaScriptEngine {
    /// Create a hardened VM with an empty `api` table.
    pub fn new() -> Result<Self, EngineError> {
        let lua = Lua::new();
        harden(&lua).map_err(|e| EngineError::Setup(e.to_string()))?;

        let api = lua
            .create_table()
            .map_err(|e| EngineError::Setup(e.to_string()))?;
        lua.globals()
            .set("api", api)
            .map_err(|e| EngineError::Setup(e.to_string()))?;

        Ok(Self { lua })
    }

    fn run_inner(&self, job: &ExecutionJob) -> LuaResult<String> {
        self.lua.load(job.script()).set_name("job").exec()?;

        let entry = match self.lua.globals().get::<LuaValue>(job.entry_point())? {
            LuaValue::Function(function) => function,
            LuaValue::Nil => {
                return Err(LuaError::RuntimeError(format!(
                    "entry point '{}' is not defined",
                    job.entry_point()
                )));
            }
            other => {
                return Err(LuaError::RuntimeError(format!(
                    "entry point '{}' is a {}, not a function",
                    job.entry_point(),
                    other.type_name()
                )));
            }
        };

        let value = entry.call::<LuaValue>(job.parameters().to_string())?;
        Ok(coerce_return(value)?.to_string())
    }
}

/// Map a Lua return value onto the transportable value set.
fn coerce_return(value: LuaValue) -> LuaResult<ScriptValue> {
    match value {
        LuaValue::Nil => Ok(ScriptValue::Nil),
        LuaValue::Boolean(b) => Ok(ScriptValue::Boolean(b)),
        LuaValue::Integer(n) => Ok(ScriptValue::Integer(n)),
        LuaValue::Number(n) => Ok(ScriptValue::Float(n)),
        LuaValue::String(s) => Ok(ScriptValue::String(s.to_string_lossy().to_string())),
        other => Err(LuaError::RuntimeError(format!(
            "entry point returned an unsupported {} value",
            other.type_name()
        ))),
    }
}

impl ScriptEnginePort for LuaScriptEngine {
    fn register_callback(
        &mut self,
        name: &str,
        callback: EngineCallback,
    ) -> Result<(), EngineError> {
        let registration = |e: LuaError| EngineError::Registration {
            name: name.to_string(),
            reason: e.to_string(),
        };
        // Closure invoked from whichever thread runs the script; an Err
        // from the bridge becomes a Lua error at the call site.
        let function = self
            .lua
            .create_function(move |_, parameter: String| {
                callback(parameter).map_err(LuaError::external)
            })
            .map_err(registration)?;

        self.lua
            .globals()
            .get::<LuaTable>("api")
            .and_then(|api| api.set(name, function))
            .map_err(registration)?;

        Ok(())
    }

    fn run(&mut self, job: &ExecutionJob) -> EngineOutcome {
        debug!(entry_point = job.entry_point(), "running lua script job");
        match self.run_inner(job) {
            Ok(value) => EngineOutcome::success(value),
            Err(e) => EngineOutcome::failure(e.to_string()),
        }
    }
}

/// Creates one fresh hardened VM per job.
#[derive(Debug, Default, Clone, Copy)]
pub struct LuaEngineFactory;

impl ScriptEngineFactory for LuaEngineFactory {
    fn create(&self) -> Result<Box<dyn ScriptEnginePort>, EngineError> {
        Ok(Box::new(LuaScriptEngine::new()?))
    }
}
