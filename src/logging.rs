// 📜 Logging - tracing subscriber for the CLI
// RUST_LOG wins over the --verbose default

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes console logging. `RUST_LOG` overrides the default level.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "bankdata_loader=debug"
    } else {
        "bankdata_loader=info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
