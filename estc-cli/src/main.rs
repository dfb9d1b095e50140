//! # estc-probe
//!
//! Open a cluster client from an options file and/or flags, report whether
//! any node is reachable, then close it. Exits 0 when the client is open.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use estc_client::build_client;
use estc_common::{parse_server_list, ElasticSearchOptions};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "estc-probe", about = "Check connectivity to a search cluster")]
struct Args {
    /// JSON options file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Cluster name, overrides the file.
    #[arg(long)]
    cluster: Option<String>,
    /// Whitespace-separated server list, overrides the file.
    #[arg(short, long)]
    server: Option<String>,
    /// Transport port shared by all servers, overrides the file.
    #[arg(short, long)]
    port: Option<u16>,
    /// Per-endpoint connect timeout in milliseconds.
    #[arg(long)]
    connect_timeout_ms: Option<u64>,
}

impl Args {
    fn into_options(self) -> anyhow::Result<ElasticSearchOptions> {
        let base = match &self.config {
            Some(path) => ElasticSearchOptions::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ElasticSearchOptions::default(),
        };

        let servers = match &self.server {
            Some(raw) => parse_server_list(raw),
            None => base.server_list().to_vec(),
        };
        let mut options = ElasticSearchOptions::new(
            self.cluster.unwrap_or_else(|| base.cluster().to_string()),
            servers,
            self.port.unwrap_or(base.port()),
        )
        .with_client_mode(base.client_mode());

        let timeout = self
            .connect_timeout_ms
            .map(Duration::from_millis)
            .or(base.connect_timeout());
        if let Some(timeout) = timeout {
            options = options.with_connect_timeout(timeout);
        }
        Ok(options)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = Args::parse().into_options()?;
    if options.server_list().is_empty() {
        warn!("no servers configured; the client will have no endpoints");
    }

    let mut client = build_client(options);
    client.open();

    let nodes = client.connected_nodes();
    let opened = client.is_opened();
    info!(
        cluster = client.options().cluster(),
        mode = %client.mode(),
        connected = nodes.len(),
        "probe finished"
    );
    for node in &nodes {
        println!("connected: {}", node);
    }
    println!("open: {}", opened);

    client.close();
    client.deinit();

    Ok(if opened { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
