//! Handler for the `listen` command: the fixed-interval poll loop over a
//! price-event filter.

use owo_colors::OwoColorize;
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::cli::{load_config, Cli, ListenArgs};
use crate::domain::PriceTopic;
use crate::error::Result;
use crate::filters::PriceFilters;
use crate::rpc::{HttpTransport, NodeClient};

/// Execute the listen command.
pub async fn execute(cli: &Cli, args: &ListenArgs) -> Result<()> {
    let config = load_config(&cli.config, cli.log_level.as_deref())?;
    config.init_logging();

    let topic: PriceTopic = args.topic.parse()?;
    let client = NodeClient::new(
        HttpTransport::new(&config.node.rpc_url)?,
        config.numeric.format,
    );
    let filters = PriceFilters::new(client);

    let handle = filters.start_listener(topic).await?;
    println!(
        "Listening for {} events (filter {})",
        topic.green(),
        handle.cyan()
    );

    let mut ticker = interval(Duration::from_secs(args.interval.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = filters.poll(topic, |update| {
                    println!(
                        "block {} market {} outcome {} price {} from {}",
                        update.block_number.yellow(),
                        update.market_id.cyan(),
                        update.outcome,
                        update.price.green(),
                        update.origin.dimmed(),
                    );
                }).await;
                if let Err(e) = result {
                    warn!(topic = %topic, error = %e, "poll failed, will retry");
                }
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    filters.uninstall(&handle).await?;
    Ok(())
}
