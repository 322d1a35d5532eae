//! # Tributary Server
//!
//! The HTTP surface of Tributary CI: login pages, the OAuth and password
//! login endpoints, the repository API and the build trigger that runs
//! pipeline documents through the transform chain.
//!
//! The binary selects one remote at startup and binds it to every request.
//! Sessions are issued by a separate component, which attaches the current
//! [`User`](tributary_remote::User) to request extensions.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;
pub mod token;

pub use error::AppError;
pub use server::{create_router, run_server};
pub use settings::Settings;
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
