//! Client side of service-to-service calls: the process-wide client
//! configuration, routes to the logical services behind the mesh proxy and a
//! client that stamps every request with the caller's service identity.

mod client;
mod config;
mod route;

pub mod headers;

pub use client::*;
pub use config::*;
pub use headers::{SERVICE_NAME_HEADER, SERVICE_SIGNATURE_HEADER};
pub use route::*;
