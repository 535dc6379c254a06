use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use vb_subscribe::{http, store, VmessEndpoint};

#[derive(ClapArgs, Debug)]
pub struct ParseArgs {
    /// Subscription file (base64 document)
    #[arg(long, default_value = "v2ray.share", conflicts_with = "from_url")]
    pub from_file: PathBuf,
    /// Subscription URL
    #[arg(long)]
    pub from_url: Option<String>,
    /// Keep only entries whose label contains one of these keywords, e.g. k1,k2
    #[arg(long, value_delimiter = ',')]
    pub filter: Vec<String>,
    /// Write the JSON list here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: ParseArgs) -> Result<()> {
    let endpoints = load(&args).await?;
    tracing::info!(count = endpoints.len(), "subscription parsed");

    match &args.output {
        Some(path) => store::save(path, &endpoints)
            .with_context(|| format!("export vmess to {}", path.display()))?,
        None => store::write_json(std::io::stdout().lock(), &endpoints).context("export vmess")?,
    }
    Ok(())
}

async fn load(args: &ParseArgs) -> Result<Vec<VmessEndpoint>> {
    if let Some(url) = &args.from_url {
        return http::decode_url(url, &args.filter)
            .await
            .with_context(|| format!("parse vmess from {url}"));
    }
    let file = File::open(&args.from_file)
        .with_context(|| format!("open {}", args.from_file.display()))?;
    vb_subscribe::decode(BufReader::new(file), &args.filter)
        .with_context(|| format!("parse vmess from {}", args.from_file.display()))
}
