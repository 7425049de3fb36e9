//! HookHub demo pipeline.
//!
//! Wires a [`HookManager`] from configuration, registers the sample
//! plugin callbacks, and pushes one record through all three dispatch
//! modes: an audit action, input/output filters, and a wrapped render
//! call.

use std::sync::Arc;

use clap::Parser;
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt};

use hookhub_core::config::AppConfig;
use hookhub_core::error::AppError;
use hookhub_registry::interceptor::InterceptStage;
use hookhub_registry::{ClosureCallback, DEFAULT_PRIORITY, HookManager};

/// Demo driver for the HookHub registry.
#[derive(Debug, Parser)]
#[command(name = "hookhub-demo", about = "Runs a sample record through the hook pipeline")]
struct Cli {
    /// Record text fed into the pipeline.
    #[arg(long, default_value = "my record")]
    input: String,

    /// Configuration environment overlay (config/{env}.toml).
    #[arg(long, default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(&config, &cli.input).await {
        tracing::error!("Pipeline error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: &AppConfig, input: &str) -> Result<(), AppError> {
    tracing::info!("Starting HookHub demo v{}", env!("CARGO_PKG_VERSION"));

    let manager = HookManager::open(&config.registry).await?;
    register_plugins(&manager).await?;

    for (hook, binding) in manager.unresolved_bindings().await {
        tracing::warn!(
            hook = %hook,
            function = %binding.function,
            "Binding has no callback and will be skipped"
        );
    }

    let processed = process_record(&manager, input).await?;
    println!("{processed}");

    let rendered = render_banner(&manager, input).await?;
    println!("{rendered}");

    Ok(())
}

/// Registers the demo plugin callbacks and their bindings.
async fn register_plugins(manager: &HookManager) -> Result<(), AppError> {
    manager
        .register_callback(
            "audit_log",
            Arc::new(ClosureCallback::from_fn(|args| {
                let record = args.first().and_then(Value::as_str).unwrap_or("<non-text>");
                tracing::info!(record = %record, "Audit: record received");
                Ok(Value::Null)
            })),
        )
        .await?;

    manager
        .register_callback(
            "uppercase_input",
            Arc::new(ClosureCallback::from_fn(|args| {
                let text = args.first().and_then(Value::as_str).unwrap_or("");
                Ok(json!(text.to_uppercase()))
            })),
        )
        .await?;

    manager
        .register_callback(
            "annotate_result",
            Arc::new(ClosureCallback::from_fn(|args| {
                let text = args.first().and_then(Value::as_str).unwrap_or("");
                Ok(json!(format!("{text} [reviewed]")))
            })),
        )
        .await?;

    manager
        .register_callback(
            "trim_args",
            Arc::new(ClosureCallback::from_fn(|args| {
                let text = args.first().and_then(Value::as_str).unwrap_or("");
                Ok(json!([text.trim()]))
            })),
        )
        .await?;

    manager
        .register_callback(
            "stamp_result",
            Arc::new(ClosureCallback::from_fn(|args| {
                let text = args.first().and_then(Value::as_str).unwrap_or("");
                Ok(json!(format!("{text} [done]")))
            })),
        )
        .await?;

    ensure_binding(manager, "record_received", "audit_log", DEFAULT_PRIORITY).await?;
    ensure_binding(manager, "before_process", "uppercase_input", 5).await?;
    ensure_binding(manager, "after_process", "annotate_result", DEFAULT_PRIORITY).await?;
    ensure_intercept(manager, "render", InterceptStage::Before, "trim_args", 5).await?;
    ensure_intercept(manager, "render", InterceptStage::After, "stamp_result", DEFAULT_PRIORITY)
        .await?;

    Ok(())
}

/// Binds `function` to `hook` unless an earlier run already persisted
/// the binding.
async fn ensure_binding(
    manager: &HookManager,
    hook: &str,
    function: &str,
    priority: i32,
) -> Result<(), AppError> {
    let already_bound = manager
        .hook_registry()
        .chain(hook)
        .await
        .iter()
        .any(|b| b.function == function);
    if already_bound {
        return Ok(());
    }
    manager.register(hook, function, priority).await
}

/// Interception-table counterpart of [`ensure_binding`].
async fn ensure_intercept(
    manager: &HookManager,
    hook: &str,
    stage: InterceptStage,
    function: &str,
    priority: i32,
) -> Result<(), AppError> {
    let chains = manager.intercept_registry().chains(hook).await;
    let chain = match stage {
        InterceptStage::Before => &chains.before,
        InterceptStage::After => &chains.after,
    };
    if chain.iter().any(|b| b.function == function) {
        return Ok(());
    }
    manager.register_intercept(hook, stage, function, priority).await
}

/// The host "system" operation: an audit action, an input filter, the
/// operation itself, then an output filter.
async fn process_record(manager: &HookManager, input: &str) -> Result<String, AppError> {
    tracing::info!(input = %input, "Processing record");
    manager.notify("record_received", &[json!(input)]).await?;

    let data = manager.transform("before_process", json!(input), &[]).await?;
    let result = format!("Processed record with data: {}", as_text(&data));
    let result = manager.transform("after_process", json!(result), &[]).await?;

    Ok(as_text(&result).to_string())
}

/// A second host operation dispatched through the wrap mode.
async fn render_banner(manager: &HookManager, input: &str) -> Result<String, AppError> {
    let target = ClosureCallback::from_fn(|args| {
        let text = args.first().and_then(Value::as_str).unwrap_or("");
        Ok(json!(format!("Banner: {text}")))
    });

    let rendered = manager
        .wrap("render", &target, vec![json!(format!("  {input}  "))])
        .await?;

    Ok(as_text(&rendered).to_string())
}

fn as_text(value: &Value) -> &str {
    value.as_str().unwrap_or("")
}
