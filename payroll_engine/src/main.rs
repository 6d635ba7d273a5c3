//! Entry point for the Payroll Engine binary.
//!
//! Running this binary starts an HTTP server that exposes the payroll
//! computation API.  The directory containing payroll JSON files is
//! taken from `PAYROLL_DATA_DIR` (default `payrolls`) and the bind
//! address from `PAYROLL_BIND_ADDR` (default `127.0.0.1:3000`).  Log
//! verbosity follows `RUST_LOG`.

use payroll_engine::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payroll_engine=info".into()),
        )
        .init();

    let config = Config::from_env();
    if let Err(err) = payroll_engine::api::serve(&config).await {
        tracing::error!(error = %err, "server stopped");
        return Err(err);
    }
    Ok(())
}
