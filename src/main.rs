use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docseed::commands::{self, FailurePolicy, StoreTarget};
use docseed::store::rest::DEFAULT_REST_PORT;
use docseed::store::StoreConfig;

/// docseed - synthetic document generators for eventing tests
#[derive(Parser)]
#[command(name = "docseed")]
#[command(version = docseed::VERSION)]
#[command(about = "Seed buckets and event files with synthetic test documents", long_about = None)]
struct Cli {
    /// Seed the random generator for a reproducible run
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Bucket address, document count and key prefix shared by the store generators
#[derive(Args)]
struct SeedArgs {
    /// Cluster host
    host: String,

    /// Bucket name
    bucket: String,

    /// Number of documents to write
    count: usize,

    /// Key prefix
    prefix: String,

    /// Cluster REST port
    #[arg(long, default_value_t = DEFAULT_REST_PORT)]
    port: u16,

    /// REST username
    #[arg(short, long)]
    username: Option<String>,

    /// REST password
    #[arg(short, long)]
    password: Option<String>,

    /// Write into a local RocksDB database at this path instead of the cluster
    #[arg(long, conflicts_with = "dry_run")]
    local: Option<PathBuf>,

    /// Generate documents without storing them anywhere
    #[arg(long)]
    dry_run: bool,

    /// Stop at the first non-transient store error
    #[arg(long)]
    stop_on_fatal: bool,
}

impl SeedArgs {
    fn target(&self) -> StoreTarget {
        if self.dry_run {
            return StoreTarget::DryRun;
        }
        if let Some(path) = &self.local {
            return StoreTarget::Local {
                path: path.clone(),
                bucket: self.bucket.clone(),
            };
        }

        let mut config = StoreConfig::new(&self.host, &self.bucket);
        config.port = self.port;
        config.username = self.username.clone();
        config.password = self.password.clone();
        StoreTarget::Rest(config)
    }

    fn policy(&self) -> FailurePolicy {
        if self.stop_on_fatal {
            FailurePolicy::StopOnFatal
        } else {
            FailurePolicy::Continue
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Append random SET/DELETE/EXPIRATION events to a newline-delimited JSON file
    TimeSeries {
        /// Number of events to append
        count: usize,

        /// Output file
        #[arg(short, long, default_value = commands::time_series::DEFAULT_OUTFILE)]
        out: PathBuf,
    },

    /// Upsert credit profile documents
    CreditScores(SeedArgs),

    /// Upsert empty user/payment blobs
    PaymentBlobs(SeedArgs),

    /// Upsert travel itineraries with booking ids
    TravelItineraries(SeedArgs),

    /// Upsert numbered key/value documents
    Populate(SeedArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match cli.command {
        Commands::TimeSeries { count, out } => {
            commands::time_series::time_series(&out, count, &mut rng)?;
            println!("✓ Appended {} events to {}", count, out.display());
        }
        Commands::CreditScores(args) => {
            let store = commands::open_store(&args.target())?;
            let report = commands::credit_scores::credit_scores(
                &*store,
                &mut rng,
                args.count,
                &args.prefix,
                args.policy(),
            )
            .await?;
            report.print_summary("credit score documents");
        }
        Commands::PaymentBlobs(args) => {
            let store = commands::open_store(&args.target())?;
            let report = commands::payment_blobs::payment_blobs(
                &*store,
                &mut rng,
                args.count,
                &args.prefix,
                args.policy(),
            )
            .await?;
            report.print_summary("payment blobs");
        }
        Commands::TravelItineraries(args) => {
            let store = commands::open_store(&args.target())?;
            let report = commands::travel_itineraries::travel_itineraries(
                &*store,
                &mut rng,
                args.count,
                &args.prefix,
                args.policy(),
            )
            .await?;
            report.print_summary("travel itineraries");
        }
        Commands::Populate(args) => {
            let store = commands::open_store(&args.target())?;
            let report =
                commands::populate::populate(&*store, args.count, &args.prefix, args.policy())
                    .await?;
            report.print_summary("documents");
        }
    }

    Ok(())
}
