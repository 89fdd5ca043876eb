//! Async facade over the context database.
//!
//! [`ContextClient`] owns a lazily created connection pool and exposes one
//! method per operation. [`ClientProvider`] hands out a shared client to
//! callers that do not want to manage the lifecycle themselves.

pub mod client;
pub mod provider;

pub use client::ContextClient;
pub use context_db_core::config::DatabaseConfig;
pub use context_db_core::models;
pub use context_db_core::{ContextConfig, ContextError, Result};
pub use provider::ClientProvider;
