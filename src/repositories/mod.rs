//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations for database
//! entities, giving handlers a small typed API for data access.

pub mod provider;

pub use provider::{NewProvider, ProviderRepository};
