//! Test helpers for tributary-server.

#![allow(dead_code, unused_imports)]

pub mod client;
pub mod fake_remote;

use std::sync::Arc;

use tributary_remote::{Remote, User};
use tributary_server::{AppState, Settings, create_router};

pub use client::{TestClient, TestResponse};
pub use fake_remote::FakeRemote;

/// Settings used by most tests.
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.server.public_url = "http://ci.example.com".into();
    settings
        .pipeline
        .environment
        .insert("CI".into(), "tributary".into());
    settings
        .pipeline
        .secrets
        .insert("docker_password".into(), "hunter2".into());
    settings
}

/// A signed-in user with a per-user hash.
pub fn test_user() -> User {
    let mut user = User::new("octocat", "t0ken");
    user.email = "octocat@example.com".into();
    user.hash = "per-user-hash".into();
    user
}

/// Client for a router backed by `remote`.
pub fn client_with(remote: Arc<FakeRemote>) -> TestClient {
    client_with_settings(remote, test_settings())
}

pub fn client_with_settings(remote: Arc<FakeRemote>, settings: Settings) -> TestClient {
    let remote: Arc<dyn Remote> = remote;
    TestClient::new(create_router(AppState::new(settings), remote))
}

/// Client for a router backed by a default fake remote.
pub fn client() -> TestClient {
    client_with(Arc::new(FakeRemote::new()))
}
