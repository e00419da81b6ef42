//! Lookup seam between the retry logic and the transport.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::models::CardRecord;

// == Attempt ==
/// Outcome of a single upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// The service resolved the name
    Found(CardRecord),
    /// The service definitively has no such card; never retried
    NotFound,
    /// Bad status, disconnect, redirect loop or timeout; worth retrying
    Transient(String),
    /// Anything else; ends the fetch without further attempts
    Fatal(String),
}

// == Card Lookup ==
/// Performs one fuzzy-name request against the upstream service.
#[async_trait]
pub trait CardLookup: Send + Sync {
    async fn lookup(&self, name: &str) -> Attempt;
}

/// Opens a fresh upstream session. Called once per worker run.
pub type Connector = Arc<dyn Fn() -> Result<Arc<dyn CardLookup>, UpstreamError> + Send + Sync>;

/// Wraps an existing lookup so every run shares it.
pub fn shared_connector(lookup: Arc<dyn CardLookup>) -> Connector {
    Arc::new(move || -> Result<Arc<dyn CardLookup>, UpstreamError> {
        Ok(Arc::clone(&lookup))
    })
}
