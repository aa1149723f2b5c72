//! A collection of typed [headers::Header] implementations carried on
//! service-to-service calls.

#[cfg(doc)]
use axum_extra::headers;

mod service;

pub use self::service::*;
