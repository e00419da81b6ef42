//! Upstream Module
//!
//! Everything that talks to the card lookup service: the per-request seam,
//! its HTTP implementation, and the retrying fetcher on top.

mod fetcher;
mod lookup;
mod scryfall;

pub use fetcher::Fetcher;
pub use lookup::{shared_connector, Attempt, CardLookup, Connector};
pub use scryfall::ScryfallClient;
