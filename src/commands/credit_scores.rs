use anyhow::{Context, Result};
use rand::Rng;

use super::{seed_documents, FailurePolicy, SeedReport};
use crate::records::CreditScore;
use crate::store::{DocumentStore, UpsertOptions};

/// Seed `count` credit profiles keyed by `prefix + ssn`, never expiring
pub async fn credit_scores<S, R>(
    store: &S,
    rng: &mut R,
    count: usize,
    prefix: &str,
    policy: FailurePolicy,
) -> Result<SeedReport>
where
    S: DocumentStore + ?Sized,
    R: Rng + ?Sized,
{
    let options = UpsertOptions::json().with_ttl(0);
    seed_documents(store, count, options, policy, || CreditScore::random(rng, prefix))
        .await
        .context("Failed to generate credit score documents")
}
