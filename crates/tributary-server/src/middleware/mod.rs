//! Tower middleware applied to every request.
//!
//! - `RequestIdLayer`: generates or propagates `x-request-id`
//! - `LoggingLayer`: structured request logging
//! - `RemoteLayer`: binds the active remote to the request

mod logging;
mod remote;
mod request_id;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use remote::{RemoteLayer, RemoteMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer, RequestIdMiddleware};
