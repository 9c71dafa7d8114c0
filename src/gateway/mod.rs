//! Request gateway to the console backend.
//!
//! This module provides:
//! - The HTTP [`Gateway`] with bearer-token injection and error classification
//! - The uniform response [`Envelope`]
//! - An ordered [`Interceptor`] chain for request/response middleware
//! - Typed wrappers for every backend endpoint the console consumes

mod api;
mod client;
mod envelope;
mod interceptor;

pub use client::{Gateway, REQUEST_ID_HEADER};
pub use envelope::{Ack, Envelope};
pub use interceptor::{BearerAuth, CallContext, Interceptor, IDENTITY_PROBE_PATH, LOGIN_PATH};
