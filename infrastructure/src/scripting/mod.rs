//! Lua engine adapter (mlua, Lua 5.4)
//!
//! - `lua_engine` — `ScriptEnginePort`/`ScriptEngineFactory` implementations
//! - `sandbox` — VM hardening applied before any job script runs

mod lua_engine;
mod sandbox;

pub use lua_engine::{LuaEngineFactory, LuaScriptEngine};
