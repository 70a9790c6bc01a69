//utils shared by the CLI entrypoints: logging setup and graceful shutdown
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global tracing subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let tc = token.clone();
    //spawn once to listen for ctrl-c
    tokio::spawn(async move {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl+C handler");
        tc.cancel();
    });
    token
}
