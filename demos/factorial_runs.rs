//! # Example: factorial_runs
//!
//! Console stand-in for the presentation shell: it starts runs, prints each
//! progress event as a progress bar, and supersedes a slow sequential run with
//! a parallel one.
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► start(20, Sequential { 500ms })
//!   ├─► after ~1.2s: start(20, Parallel)   (first run is cancelled)
//!   ├─► wait for both outcomes
//!   └─► start(20, Sequential { 50ms }) and cancel it after ~300ms
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=runvisor=debug cargo run --example factorial_runs
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use runvisor::{
    Config, Factorial, JobOutcome, LogWriter, ProgressEvent, ReportSink, RunController, RunPolicy,
    SinkError, Subscribe,
};
use tracing_subscriber::EnvFilter;

/// Prints each event as a label plus a text progress bar.
struct ConsoleSink;

#[async_trait]
impl ReportSink for ConsoleSink {
    async fn on_progress(&self, ev: &ProgressEvent) -> Result<(), SinkError> {
        let filled = (ev.fraction * 20.0).round() as usize;
        let bar = format!("{}{}", "#".repeat(filled), ".".repeat(20 - filled));
        match &ev.outcome {
            JobOutcome::Completed(r) => {
                println!("[{}] [{bar}] factorial {:>2}: {}", ev.run, r.index, r.value)
            }
            JobOutcome::Failed { index, error } => {
                println!("[{}] [{bar}] factorial {index:>2} failed: {error}", ev.run)
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cfg = Config::default();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let controller = RunController::builder(Arc::new(Factorial), Arc::new(ConsoleSink))
        .with_config(cfg.clone())
        .with_subscribers(subs)
        .build();

    println!("=== sequential run, superseded by a parallel one ===");
    let slow = controller.start(20, RunPolicy::sequential_default(&cfg))?;
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let fast = controller.start(20, RunPolicy::Parallel)?;
    println!("first: {}", slow.outcome().await.as_label());
    println!("second: {}", fast.outcome().await.as_label());

    println!("\n=== explicit cancel ===");
    let run = controller.start(20, RunPolicy::sequential(Duration::from_millis(50)))?;
    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.cancel_active();
    controller.cancel_active();
    println!("outcome: {}", run.outcome().await.as_label());

    controller.shutdown();
    Ok(())
}
