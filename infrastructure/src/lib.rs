//! Infrastructure layer for gangway
//!
//! Concrete adapters behind the application-layer ports: the mlua-backed
//! script engine and the file/environment configuration loader.

pub mod config;
pub mod scripting;

pub use config::{ConfigValidationError, RunnerConfig};
pub use scripting::{LuaEngineFactory, LuaScriptEngine};
