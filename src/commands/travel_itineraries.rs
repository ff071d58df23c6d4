use anyhow::{Context, Result};
use rand::Rng;

use super::{seed_documents, FailurePolicy, SeedReport};
use crate::records::TravelItinerary;
use crate::store::{DocumentStore, UpsertOptions};

/// Seed `count` itineraries, each with up to three booking ids
pub async fn travel_itineraries<S, R>(
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
    seed_documents(store, count, UpsertOptions::json(), policy, || {
        TravelItinerary::random(rng, prefix)
    })
    .await
    .context("Failed to generate travel itineraries")
}
