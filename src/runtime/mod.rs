//! Server runtime and application configuration.

mod config;
mod server;

pub use config::AppConfig;
pub use server::Server;
