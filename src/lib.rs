//! Session-authenticated backend gateway for the TutorHub Q&A platform.
//!
//! The library carries the auth core (accounts, cookie-backed sessions,
//! expiry) and the axum gateway exposing it. Q&A route crates mount their
//! routers alongside [`gateway::routes`] and gate access with the
//! [`gateway::CurrentUser`] extractor.

pub mod auth;
pub mod config;
pub mod gateway;
