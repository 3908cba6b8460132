use augury::cli::{self, Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Setup(args) => cli::setup::execute(&cli, args).await,
        Commands::Listen(args) => cli::listen::execute(&cli, args).await,
        Commands::Balances(args) => cli::balances::execute(&cli, args).await,
    };

    if let Err(e) = result {
        cli::output::error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}
