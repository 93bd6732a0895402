//! Chat Gateway Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p chat-gateway
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use chat_common::{try_init_tracing, try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration first so the log format can follow APP_ENV
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(e) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {e}");
            }
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        port = config.gateway.port,
        "Configuration loaded"
    );

    // Run the gateway server
    if let Err(e) = chat_gateway::run(config).await {
        error!(error = %e, code = e.error_code(), "Gateway failed");
        std::process::exit(1);
    }

    info!("Gateway stopped");
}
