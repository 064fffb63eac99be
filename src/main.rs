use clap::Parser;
use station_aggregator::cli::{run, Cli};
use station_aggregator::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
