pub mod download;
pub mod output;
pub mod parse;
pub mod ping;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "vmess-bench", version)]
#[command(about = "Decode VMess subscriptions and rank endpoints by latency", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a vmess subscription into a JSON endpoint list
    Parse(parse::ParseArgs),
    /// Measure latency to a URL through every endpoint
    Ping(ping::PingArgs),
    /// Download resources such as geoip.dat and geosite.dat
    Download(download::DownloadArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Human,
    Json,
}
