pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod queries;

pub use config::ContextConfig;
pub use error::{ContextError, Result};
pub use filter::FilterQuery;
pub use queries::QueryHelper;
