//! HTTP front end for the disk-usage index.
//!
//! Loads a `du` report through [`duindex`] and serves filtered summaries
//! under `/api/v1/info`.

pub mod cli;
pub mod config;
pub mod error;
pub mod server;

pub use config::{AppConfig, AuthConfig, CacheConfig, ConfigError, IndexConfig, ServerConfig};
pub use error::ApiError;
pub use server::Server;
