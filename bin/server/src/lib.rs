//! modlog web server.
//!
//! Serves moderation action logs to the moderators of each community, behind
//! a reddit OAuth2 login.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
#[cfg(test)]
mod testing;
pub mod views;
