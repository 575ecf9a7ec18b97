//! Read-only subscription entitlements consulted before an editor opens.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("failed to read entitlements {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse entitlements {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type EntitlementResult<T> = std::result::Result<T, EntitlementError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(deserialize_with = "deserialize_end_date")]
    pub end_date: NaiveDate,
}

/// Accepts plain dates as well as full RFC 3339 timestamps.
fn deserialize_end_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
        .map_err(serde::de::Error::custom)
}

pub trait EntitlementProvider {
    fn subscriptions(&self) -> &[Subscription];

    /// True when any subscription ends strictly after `today`.
    fn has_active(&self, today: NaiveDate) -> bool {
        self.subscriptions()
            .iter()
            .any(|subscription| subscription.end_date > today)
    }
}

/// Entitlements loaded once from a JSON array of `{ "endDate": ... }` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEntitlements {
    subscriptions: Vec<Subscription>,
}

impl StaticEntitlements {
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self { subscriptions }
    }

    pub fn from_json(contents: &str, path: &Path) -> EntitlementResult<Self> {
        serde_json::from_str(contents)
            .map(Self::new)
            .map_err(|source| EntitlementError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn load(path: &Path) -> EntitlementResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| EntitlementError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents, path)
    }
}

impl EntitlementProvider for StaticEntitlements {
    fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }
}
