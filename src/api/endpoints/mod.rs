//! API endpoint handlers.
//!
//! Each module corresponds to one area of the HTTP surface. Database and
//! rendering work is synchronous, so handlers hand it to the blocking
//! thread pool through `run_blocking`.

pub mod health;
pub mod report;
pub mod root;
pub mod statistics;

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Run `f` against the shared state on the blocking thread pool.
pub(crate) async fn run_blocking<T, F>(ctx: &ApiContext, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&CoreState) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let core = Arc::clone(&ctx.core);
    tokio::task::spawn_blocking(move || f(&core)).await?
}
