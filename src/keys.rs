//! Per-run document key bookkeeping.
//!
//! Generators draw keys from small random ranges (a payment blob id is one of
//! 9900 values), so collisions inside a single run are expected. `UniqueKeys`
//! re-draws until it finds a key it has not handed out yet.

use std::collections::HashSet;

/// How many draws are attempted before giving up on a fresh key
pub const MAX_DRAW_ATTEMPTS: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("no unused key found after {attempts} draws ({issued} keys already issued)")]
    KeyspaceExhausted { attempts: usize, issued: usize },
}

/// Keys issued during one seeding run
#[derive(Debug, Default)]
pub struct UniqueKeys {
    issued: HashSet<String>,
}

impl UniqueKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys handed out so far
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.issued.contains(key)
    }

    /// Draw `(key, record)` pairs until the key is new, then claim it.
    pub fn draw<T>(
        &mut self,
        mut draw: impl FnMut() -> (String, T),
    ) -> Result<(String, T), KeyError> {
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let (key, record) = draw();
            if self.issued.insert(key.clone()) {
                return Ok((key, record));
            }
        }

        Err(KeyError::KeyspaceExhausted {
            attempts: MAX_DRAW_ATTEMPTS,
            issued: self.issued.len(),
        })
    }
}
