//! Fetching remote APIs: request descriptors, credential extraction,
//! status policy and JSON decoding.

mod client;
pub mod credentials;
pub mod decode;
mod error;
mod request;
mod response;

pub use client::{RemoteClient, CLIENT_USER_AGENT, JSON_ACCEPT};
pub use credentials::{auth_from_url, Credentials};
pub use error::FetchError;
pub use request::{RemoteBody, RemoteRequest};
pub use response::RemoteResponse;
