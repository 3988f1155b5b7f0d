//! Translation from wire records to complete display records.
//!
//! Records coming back from the backend may omit fields. Before a record
//! enters an in-memory collection it is normalized: every required display
//! field is filled so that consumers never observe a partially populated
//! record.

use chrono::Utc;

use crate::codes::DEFAULT_COUNTRY;
use crate::types::Timestamp;

/// Fallback values applied during normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeDefaults {
    /// Country code applied when a record carries none.
    pub default_country: String,
    /// Commit time, used for missing audit timestamps.
    pub now: Timestamp,
}

impl NormalizeDefaults {
    pub fn new(default_country: impl Into<String>) -> Self {
        Self {
            default_country: default_country.into(),
            now: Utc::now(),
        }
    }

    /// Same defaults, stamped with a fresh commit time.
    pub fn at_now(&self) -> Self {
        Self {
            default_country: self.default_country.clone(),
            now: Utc::now(),
        }
    }
}

impl Default for NormalizeDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY)
    }
}

/// A record type that can live in an entity list.
///
/// `Record` is the wire shape returned by the backend; `normalize` turns it
/// into the complete display shape held by the list.
pub trait ListEntity: Clone + Send + Sync + 'static {
    type Record: Send + 'static;

    /// Entity name used in errors and logs.
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    fn record_id(record: &Self::Record) -> &str;

    fn normalize(record: Self::Record, defaults: &NormalizeDefaults) -> Self;

    /// Combine the locally held entry with an authoritative incoming one.
    ///
    /// The default keeps only the incoming record. Types carrying
    /// client-only fields override this to carry them across.
    fn reconcile(&self, incoming: Self) -> Self {
        incoming
    }
}

/// Trim a free-text value, mapping missing or blank input to an empty string.
pub(crate) fn text_or_empty(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}
