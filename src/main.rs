//! Resilient fetch demo.
//!
//! Drives a [`FetchController`] against a simulated producer that fails a
//! configurable number of times before yielding a value, printing every
//! published state as a JSON line.
//!
//! ```text
//! resilient-fetch --fail-times 2 --max-retries 2 --value 42
//!     {"data":null,"is_loading":true,"error":null}
//!     {"data":42,"is_loading":false,"error":null}
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use resilient_fetch::config::{load_config, validation::validate_config, ConfigError};
use resilient_fetch::lifecycle::signals::wait_for_interrupt;
use resilient_fetch::observability::{logging::init_logging, metrics::init_metrics};
use resilient_fetch::{FetchConfig, FetchController, FetchPhase, FetchState, Teardown};

#[derive(Parser)]
#[command(name = "resilient-fetch")]
#[command(about = "Run a resilient fetch against a simulated flaky producer", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How many invocations fail before the producer succeeds.
    #[arg(long, default_value_t = 0)]
    fail_times: u32,

    /// Value returned once the producer succeeds.
    #[arg(long, default_value = "42")]
    value: String,

    /// Override `retries.max_retries`.
    #[arg(long)]
    max_retries: Option<u32>,

    /// Override `retries.base_delay_ms`.
    #[arg(long)]
    base_delay_ms: Option<u64>,

    /// Extra refetches to run after the first settle.
    #[arg(long, default_value_t = 0)]
    refetches: u32,
}

#[derive(Serialize)]
struct Summary {
    controller: String,
    phase: FetchPhase,
    attempts: u64,
    final_state: Option<FetchState<String>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    init_logging(&config.observability)?;
    tracing::info!("resilient-fetch v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::info!(
        max_retries = config.retries.max_retries,
        base_delay_ms = config.retries.base_delay_ms,
        strategy = ?config.retries.strategy,
        fail_times = cli.fail_times,
        "Configuration loaded"
    );

    let teardown = Teardown::new();
    let controller = FetchController::builder(simulated_producer(cli.fail_times, cli.value.clone()))
        .options((&config).into())
        .on_success(|value| tracing::info!(%value, "Producer delivered a value"))
        .on_error(|error| tracing::error!(%error, "Producer gave up"))
        .start();
    controller.dispose_on(teardown.signal());

    let mut states = controller.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            let line = serde_json::to_string(&*states.borrow_and_update());
            match line {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "Failed to encode state"),
            }
            if states.changed().await.is_err() {
                break;
            }
        }
    });

    let mut final_state = None;
    for round in 0..=cli.refetches {
        if round > 0 && controller.refetch().is_err() {
            break;
        }
        final_state = tokio::select! {
            settled = controller.settled() => settled,
            _ = wait_for_interrupt() => {
                teardown.trigger();
                None
            }
        };
        if final_state.is_none() {
            break;
        }
    }

    let summary = Summary {
        controller: controller.id().to_string(),
        phase: controller.phase(),
        attempts: controller.attempts(),
        final_state,
    };
    controller.dispose();
    drop(controller);
    if let Err(e) = printer.await {
        tracing::error!(error = %e, "State printer task failed");
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_config(cli: &Cli) -> Result<FetchConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FetchConfig::default(),
    };

    if let Some(max_retries) = cli.max_retries {
        config.retries.max_retries = max_retries;
    }
    if let Some(base_delay_ms) = cli.base_delay_ms {
        config.retries.base_delay_ms = base_delay_ms;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn simulated_producer(
    fail_times: u32,
    value: String,
) -> impl Fn() -> std::future::Ready<Result<String, String>> + Send + Sync + 'static {
    let calls = Arc::new(AtomicU32::new(0));
    move || {
        let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= fail_times {
            std::future::ready(Err(format!("simulated failure {call} of {fail_times}")))
        } else {
            std::future::ready(Ok(value.clone()))
        }
    }
}
