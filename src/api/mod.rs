//! API Module
//!
//! HTTP handlers and routing for the card service REST API.
//!
//! # Endpoints
//! - `POST /fetch` - Look up or queue card names
//! - `POST /export` - Download cards as CSV
//! - `GET /status` - Queue and worker status
//! - `POST /clear` - Clear the cache
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
