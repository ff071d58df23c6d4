//! Synthetic record shapes and their random generators.
//!
//! Every generator takes the RNG explicitly so a run can be replayed with
//! `--seed` and tests can pin the output.

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Credit profile document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditScore {
    pub ssn: String,
    pub credit_score: u32,
    pub credit_card_count: u32,
    pub total_credit_limit: u64,
    pub credit_limit_used: u64,
    pub missed_emi_payments: u32,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

pub const CREDIT_SCORE_TYPE: &str = "credit_score";

impl CreditScore {
    /// Random credit profile keyed by `prefix + ssn`
    pub fn random<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> (String, Self) {
        let ssn = format!(
            "{}_{}_{}",
            rng.random_range(100..=999),
            rng.random_range(10..=99),
            rng.random_range(1000..=9999)
        );
        let total_credit_limit = rng.random_range(10_000..=100_000u64);
        let used_tenths = rng.random_range(0..=9u64);

        let record = Self {
            credit_score: rng.random_range(600..=800),
            credit_card_count: rng.random_range(1..=5),
            total_credit_limit,
            credit_limit_used: total_credit_limit * used_tenths / 10,
            missed_emi_payments: rng.random_range(0..=12),
            doc_type: Some(CREDIT_SCORE_TYPE.to_string()),
            ssn,
        };

        (format!("{}{}", prefix, record.ssn), record)
    }

    /// Same profile without the `type` tag, as seeded alongside debug sessions
    pub fn untyped(mut self) -> Self {
        self.doc_type = None;
        self
    }
}

/// User/payment blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBlob {
    pub user_id: String,
    pub payment_ids: Vec<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
}

pub const USER_BLOB_TYPE: &str = "user_blob";

impl UserBlob {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> (String, Self) {
        let key = format!("{}_{}", prefix, rng.random_range(100..=9999));
        let record = Self {
            user_id: key.clone(),
            payment_ids: Vec::new(),
            doc_type: USER_BLOB_TYPE.to_string(),
        };
        (key, record)
    }
}

/// Travel itinerary keyed by its user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelItinerary {
    pub user_id: String,
    pub booking_ids: Vec<String>,
}

/// Upper bound on bookings attached to one itinerary
pub const MAX_BOOKINGS: usize = 3;

impl TravelItinerary {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> (String, Self) {
        let user_id = format!("{}{}", prefix, rng.random_range(10_000..=100_000));
        let bookings = rng.random_range(0..=MAX_BOOKINGS);
        let booking_ids = (0..bookings)
            .map(|_| format!("bid_{}", rng.random_range(10..=10_000)))
            .collect();

        (user_id.clone(), Self { user_id, booking_ids })
    }
}

/// Generic key/value document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub uuid: String,
    pub foo: String,
}

impl KeyValue {
    /// Deterministic document number `index` under `prefix`
    pub fn numbered(prefix: &str, index: usize) -> (String, Self) {
        let key = format!("{}{}", prefix, index);
        let record = Self {
            uuid: key.clone(),
            foo: "bar".to_string(),
        };
        (key, record)
    }
}

/// Mutation kinds emitted into the time-series event file
pub const EVENT_TYPES: &[&str] = &["SET", "DELETE", "EXPIRATION"];

pub const EVENT_ID_LEN: usize = 10;

/// One line of the time-series event file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub ts: u32,
}

impl TimeSeriesEvent {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = (0..EVENT_ID_LEN)
            .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
            .collect();
        let event_type = EVENT_TYPES.choose(rng).unwrap_or(&"SET").to_string();

        Self {
            id,
            event_type,
            ts: rng.random_range(0..=9999),
        }
    }
}
