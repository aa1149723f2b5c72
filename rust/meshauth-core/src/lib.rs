//! Identity and capability layer for a multi-tenant service mesh.
//!
//! Inbound bearer credentials are classified by [authority::Credential],
//! split-capability key material is checked by [authority::verify], and a
//! [resolver::PeerResolver] assembles the typed [data::Peer] of the request
//! from the external identity stores. On the way out, [api::ServiceClient]
//! stamps every call with the caller's service name and signature.

#[macro_use]
extern crate tracing as extern_tracing;

pub mod api;
pub mod authority;
pub mod data;
pub mod resolver;

pub mod error;
pub mod tracing;

#[cfg(any(test, feature = "helpers"))]
pub mod helpers;
