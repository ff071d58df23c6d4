use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{DocumentStore, StoreError, UpsertOptions};

/// In-process store for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, (serde_json::Value, UpsertOptions)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.lock().get(key).map(|(value, _)| value.clone())
    }

    pub fn options(&self, key: &str) -> Option<UpsertOptions> {
        self.lock().get(key).map(|(_, opts)| *opts)
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, (serde_json::Value, UpsertOptions)>> {
        // insert never leaves a partial entry, so poisoning is ignored
        self.docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upsert(
        &self,
        key: &str,
        value: &serde_json::Value,
        options: UpsertOptions,
    ) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), (value.clone(), options));
        Ok(())
    }
}
