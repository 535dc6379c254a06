use anyhow::{anyhow, bail, Context, Result};
use clap::Args as ClapArgs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

pub const GEOIP_URL: &str =
    "https://github.com/Loyalsoldier/v2ray-rules-dat/releases/latest/download/geoip.dat";
pub const GEOSITE_URL: &str =
    "https://github.com/Loyalsoldier/v2ray-rules-dat/releases/latest/download/geosite.dat";

#[derive(ClapArgs, Debug)]
pub struct DownloadArgs {
    /// URLs to fetch; the file name is the last path segment
    pub urls: Vec<String>,
    /// Also fetch geoip.dat and geosite.dat
    #[arg(long)]
    pub all: bool,
    /// HTTP proxy for the downloads
    #[arg(long, env = "VB_DOWNLOAD_PROXY")]
    pub proxy: Option<String>,
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

pub async fn run(args: DownloadArgs) -> Result<()> {
    let mut urls = args.urls.clone();
    if args.all {
        urls.push(GEOIP_URL.to_string());
        urls.push(GEOSITE_URL.to_string());
    }
    if urls.is_empty() {
        bail!("requires at least 1 url (or --all)");
    }

    let mut builder = reqwest::Client::builder().timeout(args.timeout);
    if let Some(proxy) = &args.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy).context("invalid --proxy")?);
    }
    let client = builder.build().context("build http client")?;

    let mut failed = 0usize;
    for url in &urls {
        match download(&client, url, &args.output).await {
            Ok(path) => tracing::info!(url = %url, path = %path.display(), "downloaded"),
            Err(e) => {
                failed += 1;
                eprintln!("download {url} err: {e:#}");
            }
        }
    }
    tracing::debug!(total = urls.len(), failed, "downloads finished");
    Ok(())
}

async fn download(client: &reqwest::Client, url: &str, dir: &Path) -> Result<PathBuf> {
    let name = file_name(url)?;
    let mut resp = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())?;

    let path = dir.join(name);
    let mut file = tokio::fs::File::create(&path)
        .await
        .with_context(|| format!("create {}", path.display()))?;
    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk).await?;
    }
    file.sync_all().await?;
    Ok(path)
}

fn file_name(url: &str) -> Result<String> {
    let parsed = reqwest::Url::parse(url).with_context(|| format!("invalid url {url:?}"))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no file name in {url}"))
}
