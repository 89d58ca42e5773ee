//! Endpoint handlers and their registry.

pub mod handler;
pub mod registry;

pub use handler::{AppError, Handler, RequestContext};
pub use registry::HandlerRegistry;
