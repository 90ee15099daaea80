//! Common library for the board game services
//!
//! This crate provides shared infrastructure used by the dispatcher service:
//! PostgreSQL connection pooling, the Redis client backing session storage,
//! and the database error taxonomy.

pub mod cache;
pub mod database;
pub mod error;

