//! v8debug - scripted driver for the eventing V8 debug bridge
//!
//! Fires a fixed sequence of debugger commands at the bridge and prints every
//! reply verbatim, while a background task writes documents so the handler
//! actually hits its breakpoints.

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use docseed::debugger::client::{DEFAULT_APP_NAME, DEFAULT_ENDPOINT};
use docseed::debugger::script::{self, Scenario, ScenarioConfig, DEFAULT_SHORT_PAUSE};
use docseed::debugger::{DebugClient, DebugEndpoint};
use docseed::store::rest::DEFAULT_REST_PORT;
use docseed::store::{DocumentStore, LocalStore, RestStore, StoreConfig};

#[derive(Parser)]
#[command(name = "v8debug")]
#[command(version = docseed::VERSION)]
#[command(about = "Drive the eventing debug bridge through a scripted session", long_about = None)]
struct Cli {
    /// Debug bridge URL
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Name of the deployed handler being debugged
    #[arg(short, long, default_value = DEFAULT_APP_NAME)]
    app: String,

    /// breakpoint-cycle, evaluate-cycle or probe
    #[arg(short, long, default_value = "breakpoint-cycle")]
    scenario: Scenario,

    /// Seconds between debugger commands
    #[arg(long, default_value_t = 3)]
    interval_secs: u64,

    /// Base sequence number (random in 100..=1000 if omitted)
    #[arg(long)]
    seq: Option<u64>,

    /// Cluster host documents are seeded into
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Bucket documents are seeded into
    #[arg(long, default_value = "default")]
    bucket: String,

    /// Cluster REST port
    #[arg(long, default_value_t = DEFAULT_REST_PORT)]
    port: u16,

    /// REST username
    #[arg(short, long)]
    username: Option<String>,

    /// REST password
    #[arg(short, long)]
    password: Option<String>,

    /// Seed into a local RocksDB database instead of the cluster
    #[arg(long, conflicts_with = "no_seed")]
    local: Option<PathBuf>,

    /// Do not write any documents during the session
    #[arg(long)]
    no_seed: bool,
}

impl Cli {
    fn store(&self) -> Result<Option<Arc<dyn DocumentStore>>> {
        if self.no_seed {
            return Ok(None);
        }
        if let Some(path) = &self.local {
            return Ok(Some(Arc::new(LocalStore::open(path, &self.bucket)?)));
        }

        let mut config = StoreConfig::new(&self.host, &self.bucket);
        config.port = self.port;
        config.username = self.username.clone();
        config.password = self.password.clone();
        Ok(Some(Arc::new(RestStore::new(config)?)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut rng = StdRng::from_os_rng();

    let endpoint = DebugEndpoint::new(&cli.endpoint, cli.app.clone())?;
    let client = DebugClient::new(endpoint);
    let config = ScenarioConfig {
        interval: Duration::from_secs(cli.interval_secs),
        short_pause: DEFAULT_SHORT_PAUSE,
        base_seq: cli.seq.unwrap_or_else(|| rng.random_range(100..=1000)),
    };

    let report = script::run(&client, cli.store()?, cli.scenario, &config, rng).await?;

    println!(
        "✓ Session finished: {} commands fired, {} of {} documents seeded",
        report.fired, report.seeding.written, report.seeding.attempted
    );
    Ok(())
}
