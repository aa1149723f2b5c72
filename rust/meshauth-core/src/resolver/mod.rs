//! Peer assembly: drives credential dispatch, the external identity stores
//! and capability verification to produce the [crate::data::Peer] of a
//! request.

mod peer_resolver;
mod store;

pub use peer_resolver::*;
pub use store::*;
