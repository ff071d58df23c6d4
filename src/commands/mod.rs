pub mod credit_scores;
pub mod payment_blobs;
pub mod populate;
pub mod time_series;
pub mod travel_itineraries;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::keys::{KeyError, UniqueKeys};
use crate::store::{DocumentStore, LocalStore, MemoryStore, RestStore, StoreConfig, StoreError, UpsertOptions};

/// Where generated documents go
#[derive(Debug, Clone)]
pub enum StoreTarget {
    /// Remote bucket over REST
    Rest(StoreConfig),
    /// Local RocksDB database
    Local { path: PathBuf, bucket: String },
    /// Generate and discard
    DryRun,
}

/// Open the store a target describes
pub fn open_store(target: &StoreTarget) -> Result<Box<dyn DocumentStore>> {
    let store: Box<dyn DocumentStore> = match target {
        StoreTarget::Rest(config) => Box::new(
            RestStore::new(config.clone())
                .with_context(|| format!("Failed to configure store at {}", config.host))?,
        ),
        StoreTarget::Local { path, bucket } => Box::new(
            LocalStore::open(path, bucket)
                .with_context(|| format!("Failed to open local store at {}", path.display()))?,
        ),
        StoreTarget::DryRun => Box::new(MemoryStore::new()),
    };
    Ok(store)
}

/// What to do when a write fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure and move on to the next document
    #[default]
    Continue,
    /// Keep going past transient failures, stop at the first fatal one
    StopOnFatal,
}

/// A single document that could not be written
#[derive(Debug)]
pub struct SeedFailure {
    pub key: String,
    pub error: StoreError,
}

/// Outcome of one seeding run
#[derive(Debug, Default)]
pub struct SeedReport {
    pub attempted: usize,
    pub written: usize,
    pub failures: Vec<SeedFailure>,
    /// Set when the run stopped before reaching the requested count
    pub halted: bool,
}

impl SeedReport {
    pub fn transient_failures(&self) -> usize {
        self.failures.iter().filter(|f| f.error.is_transient()).count()
    }

    pub fn fatal_failures(&self) -> usize {
        self.failures.len() - self.transient_failures()
    }

    pub fn print_summary(&self, what: &str) {
        println!("✓ Wrote {} of {} {}", self.written, self.attempted, what);
        if !self.failures.is_empty() {
            println!(
                "  {} failed ({} transient, {} fatal)",
                self.failures.len(),
                self.transient_failures(),
                self.fatal_failures()
            );
        }
        if self.halted {
            println!("  Stopped early on a fatal store error");
        }
    }
}

/// Upsert `count` freshly drawn documents into `store`.
///
/// Keys are unique within the run. A failed upsert is logged and recorded,
/// then the loop moves on; only `FailurePolicy::StopOnFatal` ends it early.
pub async fn seed_documents<S, T, F>(
    store: &S,
    count: usize,
    options: UpsertOptions,
    policy: FailurePolicy,
    mut draw: F,
) -> Result<SeedReport, KeyError>
where
    S: DocumentStore + ?Sized,
    T: Serialize,
    F: FnMut() -> (String, T),
{
    let mut keys = UniqueKeys::new();
    let mut report = SeedReport::default();

    for _ in 0..count {
        let (key, record) = keys.draw(&mut draw)?;
        report.attempted += 1;

        let result = match serde_json::to_value(&record) {
            Ok(value) => store.upsert(&key, &value, options).await,
            Err(e) => Err(StoreError::from(e)),
        };

        match result {
            Ok(()) => report.written += 1,
            Err(error) => {
                tracing::warn!(key = %key, transient = error.is_transient(), "Upsert failed: {}", error);
                let fatal = !error.is_transient();
                report.failures.push(SeedFailure { key, error });
                if fatal && policy == FailurePolicy::StopOnFatal {
                    report.halted = true;
                    break;
                }
            }
        }
    }

    tracing::info!(
        attempted = report.attempted,
        written = report.written,
        failed = report.failures.len(),
        "seeding finished"
    );
    Ok(report)
}
