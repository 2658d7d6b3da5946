//! HTTP API for the statistics service.
//!
//! Exposes the aggregation catalog as JSON endpoints and the report
//! generator as a pair of report endpoints. Routes are nested under
//! `/api/` behind a CORS layer and a request logger.
//!
//! The router is composable: `stats_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::stats_api_router;
pub use server::{start_stats_api_server, ServerError, StatsApiServer};
pub use types::ApiContext;
