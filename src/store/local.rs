use async_trait::async_trait;
use rocksdb::{Options, DB};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{DocumentFormat, DocumentStore, StoreError, UpsertOptions};

/// A document as kept in the local store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub value: serde_json::Value,
    pub format: DocumentFormat,
    pub ttl: Option<u32>,
}

/// RocksDB-backed bucket emulation for offline seeding
pub struct LocalStore {
    db: DB,
    bucket: String,
}

/// Bucket names become a `doc:<bucket>:` key prefix, so they cannot hold `:`
fn check_bucket(bucket: &str) -> Result<(), StoreError> {
    if bucket.is_empty() || bucket.contains(':') {
        return Err(StoreError::Config(format!(
            "bucket name '{}' must be non-empty and must not contain ':'",
            bucket
        )));
    }
    Ok(())
}

impl LocalStore {
    /// Open or create a local store at the given path
    pub fn open<P: AsRef<Path>>(path: P, bucket: &str) -> Result<Self, StoreError> {
        check_bucket(bucket)?;
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path)?;
        Ok(Self {
            db,
            bucket: bucket.to_string(),
        })
    }

    /// Open an existing local store without write access
    pub fn open_readonly<P: AsRef<Path>>(path: P, bucket: &str) -> Result<Self, StoreError> {
        check_bucket(bucket)?;
        let opts = Options::default();
        let db = DB::open_for_read_only(&opts, path, false)?;
        Ok(Self {
            db,
            bucket: bucket.to_string(),
        })
    }

    fn prefix(&self) -> String {
        format!("doc:{}:", self.bucket)
    }

    fn doc_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }

    pub fn put(&self, key: &str, doc: &StoredDocument) -> Result<(), StoreError> {
        let value = serde_json::to_vec(doc)?;
        self.db.put(self.doc_key(key).as_bytes(), value)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<StoredDocument>, StoreError> {
        match self.db.get(self.doc_key(key).as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All document keys in this bucket
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let prefix = self.prefix();
        let mut keys = Vec::new();

        for item in self.db.prefix_iterator(prefix.as_bytes()) {
            let (key, _) = item?;
            let key_str = String::from_utf8_lossy(&key);
            // prefix_iterator seeks, it does not stop at the prefix boundary
            match key_str.strip_prefix(prefix.as_str()) {
                Some(doc_key) => keys.push(doc_key.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.keys()?.len())
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn upsert(
        &self,
        key: &str,
        value: &serde_json::Value,
        options: UpsertOptions,
    ) -> Result<(), StoreError> {
        let doc = StoredDocument {
            value: value.clone(),
            format: options.format,
            ttl: options.ttl,
        };
        self.put(key, &doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path().join("docs.db"), "default").unwrap();

        let opts = UpsertOptions::json().with_ttl(0);
        store.upsert("k1", &serde_json::json!({"v": 1}), opts).await.unwrap();
        store.upsert("k1", &serde_json::json!({"v": 2}), opts).await.unwrap();

        let doc = store.get("k1").unwrap().unwrap();
        assert_eq!(doc.value["v"], 2);
        assert_eq!(doc.ttl, Some(0));
        assert_eq!(doc.format, DocumentFormat::Json);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_bucket_names_with_separator_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs.db");

        assert!(matches!(LocalStore::open(&path, "a:b"), Err(StoreError::Config(_))));
        assert!(matches!(LocalStore::open(&path, ""), Err(StoreError::Config(_))));
        assert!(LocalStore::open(&path, "a_b").is_ok());
    }

    #[tokio::test]
    async fn test_buckets_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docs.db");

        {
            let travel = LocalStore::open(&path, "travel").unwrap();
            travel
                .upsert("a", &serde_json::json!({}), UpsertOptions::json())
                .await
                .unwrap();
        }

        let default = LocalStore::open(&path, "default").unwrap();
        default
            .upsert("b", &serde_json::json!({}), UpsertOptions::json())
            .await
            .unwrap();
        default
            .upsert("c", &serde_json::json!({}), UpsertOptions::json())
            .await
            .unwrap();

        assert_eq!(default.keys().unwrap(), vec!["b".to_string(), "c".to_string()]);
        assert!(default.get("a").unwrap().is_none());
    }
}
