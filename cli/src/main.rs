//! CLI entrypoint for gangway
//!
//! Runs a script file through the embedded engine, exposing a small host
//! api (`api.env`, `api.print`) whose functions always execute on the
//! owning side. The worker-thread path is the default; `--sync` runs the
//! script inline on the calling thread instead.

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use gangway_application::{
    HostFn, RunScriptInput, RunScriptSyncError, RunScriptSyncUseCase, RunScriptUseCase, ScriptApi,
    ScriptError,
};
use gangway_infrastructure::{LuaEngineFactory, RunnerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gangway", about = "Run scripts on a worker thread with host callbacks")]
struct Cli {
    /// Script file to execute
    script: PathBuf,

    /// Entry point to call (defaults to the configured one)
    #[arg(long)]
    entry: Option<String>,

    /// Parameter string handed to the entry point
    #[arg(long, default_value = "")]
    params: String,

    /// Run inline on the calling thread instead of a worker thread
    #[arg(long)]
    sync: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    output: Output,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, ValueEnum)]
enum Output {
    Text,
    Json,
}

/// Host functions exposed to scripts. These run on the owning side even
/// when the script itself is off on a worker thread.
fn host_api() -> ScriptApi {
    let mut api = ScriptApi::new();
    let env: HostFn = Arc::new(|name: &str| std::env::var(name).unwrap_or_default());
    let print: HostFn = Arc::new(|line: &str| {
        println!("{line}");
        String::new()
    });
    api.insert("env".to_string(), env);
    api.insert("print".to_string(), print);
    api
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RunnerConfig::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
    config.validate().context("invalid configuration")?;

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new(config.log_filter.clone()),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let script = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("failed to read {}", cli.script.display()))?;
    let entry = cli.entry.unwrap_or_else(|| config.entry_point.clone());

    let mut input = RunScriptInput::new(entry, cli.params.clone(), script).with_api(host_api());
    if let Some(timeout) = config.callback_timeout() {
        input = input.with_reply_timeout(timeout);
    }

    let engines = Arc::new(LuaEngineFactory);

    let outcome: Result<String, ScriptError> = if cli.sync {
        info!("running script inline");
        match RunScriptSyncUseCase::new(engines).execute(input) {
            Ok(value) => Ok(value),
            Err(RunScriptSyncError::Script(e)) => Err(e),
            Err(other) => bail!(other),
        }
    } else {
        info!("running script on a worker thread");
        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = RunScriptUseCase::new(engines).submit(
            input,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )?;
        handle.join().await;
        rx.await.context("completion notifier was not invoked")?
    };

    match cli.output {
        Output::Json => {
            let (has_error, value) = match &outcome {
                Ok(value) => (false, value.clone()),
                Err(e) => (true, e.message.clone()),
            };
            println!(
                "{}",
                serde_json::json!({ "hasError": has_error, "value": value })
            );
            if has_error {
                std::process::exit(1);
            }
        }
        Output::Text => match outcome {
            Ok(value) => println!("{value}"),
            Err(e) => bail!(e),
        },
    }

    Ok(())
}
