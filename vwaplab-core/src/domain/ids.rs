use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument identifier (ticker, stock code, ...).
///
/// Ordering is lexicographic; panels keyed by `InstrumentId` in a `BTreeMap`
/// therefore produce a stable column order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for InstrumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_ids_order_lexicographically() {
        let mut ids = vec![InstrumentId::from("0700"), InstrumentId::from("0005")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "0005");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&InstrumentId::from("0388")).unwrap();
        assert_eq!(json, "\"0388\"");
    }
}
