//! Card record and lookup status types
//!
//! `CardRecord` is the value stored in the cache: either a resolved card or a
//! negative result for a name the upstream service could not resolve.

use serde::{Deserialize, Serialize};

// == Card Record ==
/// Resolved (or definitively unresolved) data for one card name.
///
/// Fields are private so a not-found record can never carry descriptive data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRecord {
    name: String,
    oracle_text: String,
    mana_cost: String,
    type_line: String,
    set_name: String,
    found: bool,
}

impl CardRecord {
    /// Builds a resolved record.
    pub fn found(
        name: impl Into<String>,
        oracle_text: impl Into<String>,
        mana_cost: impl Into<String>,
        type_line: impl Into<String>,
        set_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            oracle_text: oracle_text.into(),
            mana_cost: mana_cost.into(),
            type_line: type_line.into(),
            set_name: set_name.into(),
            found: true,
        }
    }

    /// Builds a negative record carrying only the name as submitted.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            oracle_text: String::new(),
            mana_cost: String::new(),
            type_line: String::new(),
            set_name: String::new(),
            found: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn oracle_text(&self) -> &str {
        &self.oracle_text
    }

    pub fn mana_cost(&self) -> &str {
        &self.mana_cost
    }

    pub fn type_line(&self) -> &str {
        &self.type_line
    }

    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    pub fn is_found(&self) -> bool {
        self.found
    }

    /// Status reported to clients for this record.
    pub fn status(&self) -> CardStatus {
        if self.found {
            CardStatus::Found
        } else {
            CardStatus::NotFound
        }
    }
}

// == Card Status ==
/// Outcome of a lookup as reported across the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardStatus {
    #[serde(rename = "found")]
    Found,
    #[serde(rename = "not found")]
    NotFound,
    #[serde(rename = "queued")]
    Queued,
    #[serde(rename = "queue full")]
    QueueFull,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Found => "found",
            CardStatus::NotFound => "not found",
            CardStatus::Queued => "queued",
            CardStatus::QueueFull => "queue full",
        }
    }
}

// == Lookup Result ==
/// One entry of a lookup response.
///
/// Cached names carry the full record; queued or rejected names only the
/// name and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    pub status: CardStatus,
}

impl LookupResult {
    /// Result for a name whose record is cached.
    pub fn cached(record: &CardRecord) -> Self {
        Self {
            name: record.name.clone(),
            oracle_text: Some(record.oracle_text.clone()),
            mana_cost: Some(record.mana_cost.clone()),
            type_line: Some(record.type_line.clone()),
            set_name: Some(record.set_name.clone()),
            status: record.status(),
        }
    }

    /// Result for a name that went to the queue (or failed to).
    pub fn pending(name: impl Into<String>, queued: bool) -> Self {
        Self {
            name: name.into(),
            oracle_text: None,
            mana_cost: None,
            type_line: None,
            set_name: None,
            status: if queued {
                CardStatus::Queued
            } else {
                CardStatus::QueueFull
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_record_has_empty_fields() {
        let record = CardRecord::not_found("Xyzzyxnonexistent");
        assert_eq!(record.name(), "Xyzzyxnonexistent");
        assert!(!record.is_found());
        assert!(record.oracle_text().is_empty());
        assert!(record.mana_cost().is_empty());
        assert!(record.type_line().is_empty());
        assert!(record.set_name().is_empty());
        assert_eq!(record.status(), CardStatus::NotFound);
    }

    #[test]
    fn test_status_serializes_with_spaces() {
        let json = serde_json::to_string(&CardStatus::QueueFull).unwrap();
        assert_eq!(json, r#""queue full""#);
        let json = serde_json::to_string(&CardStatus::NotFound).unwrap();
        assert_eq!(json, r#""not found""#);
    }

    #[test]
    fn test_cached_lookup_result_carries_fields() {
        let record = CardRecord::found("Black Lotus", "Add three mana", "{0}", "Artifact", "Alpha");
        let json = serde_json::to_value(LookupResult::cached(&record)).unwrap();
        assert_eq!(json["name"], "Black Lotus");
        assert_eq!(json["type_line"], "Artifact");
        assert_eq!(json["status"], "found");
    }

    #[test]
    fn test_pending_lookup_result_omits_fields() {
        let json = serde_json::to_value(LookupResult::pending("Opt", false)).unwrap();
        assert_eq!(json["status"], "queue full");
        assert!(json.get("oracle_text").is_none());
    }
}
