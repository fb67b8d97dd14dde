//! Logging setup.
//!
//! Logs go to stderr so the CLI's tabular stdout stays clean. The level
//! is controlled via the `CAPMIT1003_LOG` environment variable:
//! - `CAPMIT1003_LOG=debug` for verbose output
//! - `CAPMIT1003_LOG=info` for standard output (default)
//! - `CAPMIT1003_LOG=warn` for warnings and errors only

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    let env_filter =
        EnvFilter::try_from_env("CAPMIT1003_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .init();
}
