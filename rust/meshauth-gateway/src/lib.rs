//! Axum integration for the mesh identity layer: an extractor that turns
//! every inbound request into a resolved [meshauth_core::data::Peer], and a
//! small gateway that reports who a caller was resolved to.

#[macro_use]
extern crate tracing;

mod error;
mod extractors;
mod gateway;
mod handlers;

pub use error::*;
pub use extractors::*;
pub use gateway::*;
pub use handlers::*;
