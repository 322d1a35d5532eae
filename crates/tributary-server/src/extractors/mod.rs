//! Request extractors.

mod path;
mod remote;
mod session;

pub use path::RepoPath;
pub use remote::BoundRemote;
pub use session::{CurrentUser, RequireUser};
