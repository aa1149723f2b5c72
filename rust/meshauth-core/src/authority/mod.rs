//! Credential classification and split-capability verification.

mod capability;
mod credential;
mod digest;

pub use capability::*;
pub use credential::*;
pub use digest::*;
