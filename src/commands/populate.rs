use anyhow::{Context, Result};

use super::{seed_documents, FailurePolicy, SeedReport};
use crate::records::KeyValue;
use crate::store::{DocumentStore, UpsertOptions};

/// Fill a bucket with `prefix0..prefix<count-1>` key/value documents
pub async fn populate<S>(
    store: &S,
    count: usize,
    prefix: &str,
    policy: FailurePolicy,
) -> Result<SeedReport>
where
    S: DocumentStore + ?Sized,
{
    let mut index = 0;
    seed_documents(store, count, UpsertOptions::json(), policy, || {
        let doc = KeyValue::numbered(prefix, index);
        index += 1;
        doc
    })
    .await
    .context("Failed to populate bucket")
}
