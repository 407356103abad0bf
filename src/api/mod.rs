//! HTTP API module
//!
//! Upload form and conversion endpoint.
//! Run with `sheet2json serve`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server};
