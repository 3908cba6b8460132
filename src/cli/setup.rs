//! Handler for the `setup` command.

use tokio::signal;
use tracing::info;

use crate::cli::{load_config, Cli, SetupArgs};
use crate::error::Result;
use crate::setup::{Provisioner, SetupOptions};

/// Execute the setup command.
pub async fn execute(cli: &Cli, args: &SetupArgs) -> Result<()> {
    let mut config = load_config(&cli.config, cli.log_level.as_deref())?;
    if let Some(core_path) = &args.core_path {
        config.paths.core_path = Some(core_path.clone());
    }
    config.init_logging();

    let options = SetupOptions {
        reset: args.reset,
        faucets: args.faucets,
        spawn_node: !args.no_spawn,
        upload_contract: args.contract.clone(),
        use_gospel: args.gospel,
        verbose: args.debug,
    };
    info!(
        network_id = config.node.network_id,
        reset = options.reset,
        faucets = options.faucets,
        "augury setup starting"
    );

    let provisioner = Provisioner::new(config, options);
    tokio::select! {
        result = provisioner.run() => result?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("augury setup finished");
    Ok(())
}
