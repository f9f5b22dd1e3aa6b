//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Cache a payload
//! - `POST /get` - Look up a payload
//! - `POST /del` - Clear one entry
//! - `DELETE /cache/clear` - Clear all entries
//! - `POST /cache/cleanup` - Sweep invalid entries
//! - `GET /cache/stats` - Cache statistics
//! - `GET /cache/policies` - Category policies
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
