//! Domain records and HTTP DTOs
//!
//! `card` holds the cached record type; `requests` and `responses` define the
//! JSON bodies of the HTTP surface.

pub mod card;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use card::{CardRecord, CardStatus, LookupResult};
pub use requests::{CardNamesRequest, CardSelection};
pub use responses::{ClearResponse, HealthResponse, StatsResponse, StatusResponse};
