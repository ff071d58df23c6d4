use anyhow::{Context, Result};
use rand::Rng;

use super::{seed_documents, FailurePolicy, SeedReport};
use crate::records::UserBlob;
use crate::store::{DocumentStore, UpsertOptions};

/// Seed `count` empty user/payment blobs keyed by `prefix_<id>`
pub async fn payment_blobs<S, R>(
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
    seed_documents(store, count, options, policy, || UserBlob::random(rng, prefix))
        .await
        .context("Failed to generate payment blobs (at most 9900 distinct ids per prefix)")
}
