//! Core data types: issued access tokens, the resolved [Peer] of a request
//! and the identity records it is assembled from.

mod peer;
mod role;
mod service;
mod strings;
mod token;

pub use peer::*;
pub use role::*;
pub use service::*;
pub use strings::*;
pub use token::*;
