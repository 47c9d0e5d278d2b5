use subscriber::logger::initialize as LoggerInitialize;
use subscriber::runner::run;

use subscriber_core::config::SubscriberConfig;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use log::{error, info};

const LOG_DIR_VAR: &str = "LOG_DIR";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let log_dir = env::var_os(LOG_DIR_VAR).map(PathBuf::from);

    // Initialize logger FIRST
    if let Err(e) = LoggerInitialize(log_dir.as_deref()) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    info!("===== Starting pending transactions subscriber =====");

    let config = match SubscriberConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Target node {}:{} (topic '{}')",
        config.host, config.ws_port, config.topic
    );

    match run(config).await {
        Ok(summary) => {
            info!("Subscriber finished: {summary:?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
