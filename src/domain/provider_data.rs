use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys the transition engine writes into provider data.
pub const FAILURE_REASON: &str = "failureReason";
pub const FAILED_BY: &str = "failedBy";
pub const CANCELLATION_REASON: &str = "cancellationReason";
pub const CANCELLED_BY: &str = "cancelledBy";

/// A single provider-supplied value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Map(ProviderData),
}

impl From<&str> for ProviderValue {
    fn from(value: &str) -> Self {
        ProviderValue::Text(value.to_string())
    }
}

impl From<String> for ProviderValue {
    fn from(value: String) -> Self {
        ProviderValue::Text(value)
    }
}

impl From<bool> for ProviderValue {
    fn from(value: bool) -> Self {
        ProviderValue::Bool(value)
    }
}

impl From<i64> for ProviderValue {
    fn from(value: i64) -> Self {
        ProviderValue::Integer(value)
    }
}

impl From<f64> for ProviderValue {
    fn from(value: f64) -> Self {
        ProviderValue::Float(value)
    }
}

/// Opaque provider metadata attached to a transaction.
///
/// Updates are merged key by key (last write wins per key, nested maps merged
/// recursively) so that concurrent writers touching different keys never lose
/// each other's data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderData(BTreeMap<String, ProviderValue>);

impl ProviderData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ProviderValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ProviderValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ProviderValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ProviderValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn merge(&mut self, other: ProviderData) {
        for (key, incoming) in other.0 {
            if let ProviderValue::Map(nested) = incoming {
                if let Some(ProviderValue::Map(existing)) = self.0.get_mut(&key) {
                    existing.merge(nested);
                    continue;
                }
                self.0.insert(key, ProviderValue::Map(nested));
            } else {
                self.0.insert(key, incoming);
            }
        }
    }
}

impl<K: Into<String>, V: Into<ProviderValue>> FromIterator<(K, V)> for ProviderData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
