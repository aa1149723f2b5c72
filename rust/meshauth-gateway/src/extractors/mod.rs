//! Axum extractors, used to create arguments in routes from a request.

mod peer;

pub use peer::*;
