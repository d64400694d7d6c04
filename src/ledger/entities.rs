use std::collections::BTreeMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Persisted per-day aggregate: total tracked seconds plus per-order
/// breakdown. `elapsed` and the sum of `orders` are tracked by independent
/// paths and are allowed to disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: String,
    pub elapsed: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub orders: BTreeMap<String, f64>,
}

impl DayRecord {
    pub fn new(day: String, elapsed: Duration) -> Self {
        Self {
            day,
            elapsed: duration_to_seconds(elapsed),
            orders: BTreeMap::new(),
        }
    }
}

/// On-disk layout of the document store: collection name to record id to
/// record. Record ids are stringified integers assigned on insert, matching
/// the store files written by the original tool.
pub type StoreDocument = BTreeMap<String, BTreeMap<String, DayRecord>>;

pub fn duration_to_seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}
