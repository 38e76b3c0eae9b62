use anyhow::Context;
use folio_core::models::OperationStatus;
use serde::Serialize;

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// One-line rendering of an operation status
pub fn status_line(label: &str, status: &OperationStatus) -> String {
    match status {
        OperationStatus::Idle => format!("{}: idle", label),
        OperationStatus::InProgress => format!("{}: in progress", label),
        OperationStatus::Succeeded(message) => format!("{}: {}", label, message),
        OperationStatus::Failed(reason) => format!("{} failed: {}", label, reason),
    }
}

/// Turn a failed status into an error for the process exit code
pub fn ensure_succeeded(label: &str, status: &OperationStatus) -> anyhow::Result<()> {
    match status {
        OperationStatus::Failed(_) => Err(anyhow::anyhow!(status_line(label, status))),
        _ => Ok(()),
    }
}
