//! HTTP handlers.

pub mod auth;
pub mod builds;
pub mod health;
pub mod pages;
pub mod repos;
