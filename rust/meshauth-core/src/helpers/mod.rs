//! In-memory stand-ins for the external identity stores, intended to be used
//! exclusively in tests and hidden setup for examples

mod memory;

pub use memory::*;
