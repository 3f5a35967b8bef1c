//! HTTP surface for the recipe question service.
//!
//! One JSON endpoint answers questions; requests are served one at a time
//! against a shared [`RagContext`](cookbook_knowledge::RagContext).

pub mod error;
pub mod server;

pub use error::ApiError;
pub use server::{app_router, run_server, AppState};
