use crate::cli::{output, Format};
use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use vb_bench::{commit_fastest, BenchReport, CommitOutcome};
use vb_engine::{
    BootstrapConfig, EmbeddedClient, ProbeMethod, ProbeOptions, ProcessEngine, ProxyEngineClient,
    RemoteClient, RemoteOptions,
};
use vb_subscribe::{store, VmessEndpoint};

#[derive(ClapArgs, Debug)]
pub struct PingArgs {
    /// URL every endpoint is probed against
    pub target: String,
    /// Endpoint list written by `parse`
    #[arg(long, env = "VB_VMESS_FILE", default_value = "vmess.txt")]
    pub vmess_file: PathBuf,
    /// Drive an already-running v2ray instead of spawning one
    #[arg(long, env = "VB_EXTERNAL_V2RAY")]
    pub external_v2ray: bool,
    /// HTTP inbound host of the external v2ray
    #[arg(long, env = "VB_INBOUND_HOST", default_value = "http://127.0.0.1")]
    pub inbound_host: String,
    /// HTTP inbound port
    #[arg(long, env = "VB_INBOUND_PORT", default_value_t = 7891)]
    pub inbound_port: u16,
    /// Address of the HandlerService api (dokodemo-door inbound)
    #[arg(short = 'A', long, env = "VB_DOKODEMO_DOOR_ADDR", default_value = "127.0.0.1:10085")]
    pub dokodemo_door_addr: String,
    /// Routing tag of the probed outbound
    #[arg(long, env = "VB_OUTBOUND_TAG", default_value = "proxy")]
    pub outbound_tag: String,
    /// Routing tag of the spawned engine's HTTP inbound
    #[arg(long, env = "VB_INBOUND_TAG", default_value = "http")]
    pub inbound_tag: String,
    /// Leave the fastest endpoint active (external v2ray only)
    #[arg(long)]
    pub set_fastest: bool,
    /// v2ray binary used when no external instance is given
    #[arg(long, env = "VB_V2RAY_BIN", default_value = "v2ray")]
    pub v2ray_bin: PathBuf,
    /// How long to wait for the spawned engine's api port
    #[arg(long, env = "VB_STARTUP_TIMEOUT", default_value = "5s", value_parser = humantime::parse_duration)]
    pub startup_timeout: Duration,
    /// Per-probe timeout
    #[arg(long, env = "VB_TIMEOUT", default_value = "10s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
    /// Probe method: head or get
    #[arg(long, env = "VB_METHOD", default_value = "head")]
    pub method: ProbeMethod,
    #[arg(long, value_enum, default_value_t = Format::Human)]
    pub format: Format,
}

impl PingArgs {
    fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            timeout: Some(self.timeout),
            method: self.method,
        }
    }
}

pub async fn run(args: PingArgs) -> Result<()> {
    let endpoints = store::load(&args.vmess_file)
        .with_context(|| format!("get vmess from {}", args.vmess_file.display()))?;
    tracing::info!(count = endpoints.len(), url = %args.target, "starting benchmark");

    if args.external_v2ray {
        run_external(&args, endpoints).await
    } else {
        run_embedded(&args, endpoints).await
    }
}

async fn run_external(args: &PingArgs, endpoints: Vec<VmessEndpoint>) -> Result<()> {
    let options = RemoteOptions {
        control_addr: args.dokodemo_door_addr.clone(),
        inbound_host: args.inbound_host.clone(),
        inbound_port: args.inbound_port,
        outbound_tag: args.outbound_tag.clone(),
        probe: args.probe_options(),
    };
    let mut client = RemoteClient::connect(options)
        .await
        .context("get v2ray")?;

    let report = vb_bench::run(&mut client, endpoints, &args.target).await?;
    output::emit_report(args.format, &report)?;
    if args.set_fastest {
        set_fastest(&mut client, &report).await?;
    }
    client.close().await?;
    Ok(())
}

async fn run_embedded(args: &PingArgs, endpoints: Vec<VmessEndpoint>) -> Result<()> {
    let control: SocketAddr = args
        .dokodemo_door_addr
        .parse()
        .with_context(|| format!("invalid dokodemo-door addr {:?}", args.dokodemo_door_addr))?;
    let engine =
        ProcessEngine::new(&args.v2ray_bin, control).with_startup_timeout(args.startup_timeout);
    let config = BootstrapConfig {
        inbound_port: args.inbound_port,
        inbound_tag: args.inbound_tag.clone(),
        outbound_tag: args.outbound_tag.clone(),
    };
    let mut client = EmbeddedClient::start(engine, config, &args.probe_options())
        .await
        .context("start v2ray")?;

    let result = vb_bench::run(&mut client, endpoints, &args.target).await;
    if let Err(e) = client.close().await {
        tracing::warn!(error = %e, "stop v2ray failed");
    }
    let report = result?;

    output::emit_report(args.format, &report)?;
    if args.set_fastest {
        eprintln!("can not set internal v2ray");
    }
    Ok(())
}

async fn set_fastest<C>(client: &mut C, report: &BenchReport) -> Result<()>
where
    C: ProxyEngineClient + ?Sized,
{
    match commit_fastest(client, report).await.context("set fastest")? {
        CommitOutcome::Committed(endpoint) => {
            println!("set fastest {} success", endpoint.label());
        }
        CommitOutcome::NoCandidate => eprintln!("no available vmess"),
    }
    Ok(())
}
