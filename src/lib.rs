//! # Waiting Room Library
//!
//! Core functionality for the waiting-room providers API: configuration,
//! database access, HTTP handlers and server setup.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub use migration;
