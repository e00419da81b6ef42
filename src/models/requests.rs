//! Request DTOs for the card service API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Which cards a lookup or export covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardSelection {
    /// Every card currently cached
    AllCached,
    /// Exactly these names, in order; may be empty
    Names(Vec<String>),
}

/// Request body for `POST /fetch` and `POST /export`
///
/// An absent or empty `card_names` list means "everything currently cached".
/// A list holding only blank names selects nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardNamesRequest {
    /// Card names to look up, as typed by the client
    #[serde(default)]
    pub card_names: Vec<String>,
}

impl CardNamesRequest {
    /// Decides the selection from the list as sent, then trims each name and
    /// drops blanks.
    pub fn selection(&self) -> CardSelection {
        if self.card_names.is_empty() {
            return CardSelection::AllCached;
        }

        CardSelection::Names(
            self.card_names
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}
