//! # Tributary Remote
//!
//! One contract for talking to a version-control hosting provider, five
//! implementations of it, and the startup selector that picks exactly one.
//!
//! ## Example
//!
//! ```no_run
//! use tributary_remote::{RemoteSettings, select_remote};
//!
//! let mut settings = RemoteSettings::default();
//! settings.gogs.enabled = true;
//! settings.gogs.server = "https://git.example.internal".into();
//!
//! let remote = select_remote(&settings).unwrap();
//! assert_eq!(remote.name(), "self-hosted-git");
//! ```

mod client;
pub mod error;
pub mod providers;
pub mod remote;
pub mod selector;
pub mod settings;

pub use error::{RemoteError, SetupError};
pub use remote::{
    BuildStatus, CommitStatus, LoginRequest, Netrc, Permission, Remote, RemoteKind, Repo, RepoRef,
    User,
};
pub use selector::select_remote;
pub use settings::RemoteSettings;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
