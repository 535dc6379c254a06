use clap::Parser;
use vmess_bench::{cli, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    logging::init_logging()?;

    match args.command {
        cli::Commands::Parse(a) => cli::parse::run(a).await,
        cli::Commands::Ping(a) => cli::ping::run(a).await,
        cli::Commands::Download(a) => cli::download::run(a).await,
    }
}
