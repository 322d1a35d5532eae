//! Shared fixtures for remote integration tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use tributary_remote::{Repo, RemoteSettings, User};

pub const PEM: &str = include_str!("../fixtures/consumer_key.pem");

/// Settings with every provider filled in well enough to construct, but
/// none enabled.
pub fn complete_settings() -> RemoteSettings {
    let mut settings = RemoteSettings::default();
    settings.github.client_id = "gh-client".into();
    settings.github.client_secret = "gh-secret".into();
    settings.gitlab.client_id = "gl-client".into();
    settings.gitlab.client_secret = "gl-secret".into();
    settings.bitbucket.client_id = "bb-key".into();
    settings.bitbucket.client_secret = "bb-secret".into();
    settings.bitbucket_server.server = "https://stash.example.com".into();
    settings.bitbucket_server.consumer_key = "tributary".into();
    settings.bitbucket_server.consumer_rsa_string = PEM.into();
    settings.gogs.server = "https://git.example.internal".into();
    settings
}

/// Self-hosted Git settings pointing at `server`.
pub fn gogs_settings(server: &str) -> RemoteSettings {
    let mut settings = RemoteSettings::default();
    settings.gogs.enabled = true;
    settings.gogs.server = server.into();
    settings.gogs.git_username = "ci".into();
    settings.gogs.git_password = "secret".into();
    settings
}

pub fn user() -> User {
    User::new("jdoe", "t0ken")
}

pub fn repo(owner: &str, name: &str) -> Repo {
    Repo {
        owner: owner.into(),
        name: name.into(),
        full_name: format!("{}/{}", owner, name),
        avatar: String::new(),
        link: String::new(),
        clone_url: String::new(),
        default_branch: "master".into(),
        is_private: false,
    }
}

/// A repository as the Gogs and GitHub APIs return it.
pub fn repo_json(owner: &str, name: &str) -> Value {
    json!({
        "owner": { "login": owner, "username": owner, "avatar_url": "" },
        "name": name,
        "full_name": format!("{}/{}", owner, name),
        "html_url": format!("https://example.com/{}/{}", owner, name),
        "clone_url": format!("https://example.com/{}/{}.git", owner, name),
        "default_branch": "main",
        "private": false,
        "permissions": { "admin": false, "push": true, "pull": true }
    })
}
