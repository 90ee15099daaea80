//! Request dispatcher for the board game service
//!
//! A single POST endpoint accepts JSON requests naming an operation in their
//! `method` field. Registration, login, game creation and moves are
//! delegated to stored procedures; per-client state lives in a session
//! store keyed by a cookie.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod validation;

pub use state::AppState;
