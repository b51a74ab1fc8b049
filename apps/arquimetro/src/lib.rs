//! # Arquimetro
//!
//! Application layer around `arquimetro-core`: the HTTP API, the CLI, the
//! backend boundary (embedded redb or hosted REST), configuration and
//! user-facing notifications.

pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod notify;
