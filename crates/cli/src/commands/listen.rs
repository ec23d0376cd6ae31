use coffre_core::config::{AppConfig, LoadOptions};
use coffre_discord::runner_from_config;
use tracing::{error, info};

use crate::commands::CommandResult;
use crate::logging;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("listen", "config_validation", error.to_string(), 2);
        }
    };
    if let Err(error) = config.validate_listener() {
        return CommandResult::failure("listen", "config_validation", error.to_string(), 2);
    }

    logging::init(&config);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "listen",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    info!(
        event_name = "system.listener.starting",
        forward_url = %config.discord.forward_url,
        warehouses = config.warehouses.allowed.len(),
        "starting chat-log listener"
    );

    let outcome = runtime.block_on(async {
        let runner = runner_from_config(&config);
        tokio::select! {
            result = runner.start() => result.map(|()| false),
            signal = tokio::signal::ctrl_c() => signal.map(|()| true).map_err(anyhow::Error::from),
        }
    });

    match outcome {
        Ok(true) => {
            info!(event_name = "system.listener.stopped", "listener stopped by signal");
            CommandResult::success("listen", "listener stopped")
        }
        Ok(false) => CommandResult::success("listen", "listener session ended"),
        Err(failure) => {
            error!(
                event_name = "system.listener.failed",
                error = %failure,
                "listener gave up"
            );
            CommandResult::failure("listen", "listener_failure", failure.to_string(), 4)
        }
    }
}
