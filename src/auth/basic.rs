use crate::auth::{AuthError, Authenticator, Principal};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use std::collections::HashMap;
use tracing::warn;

/// Checks `Basic` credentials against a fixed user table.
#[derive(Debug, Clone, Default)]
pub struct BasicAuthenticator {
    users: HashMap<String, String>,
}

impl BasicAuthenticator {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }

    /// Decode `Basic <base64(user:password)>` into its two parts.
    pub fn decode(authorization: &str) -> Result<(String, String), AuthError> {
        let (scheme, encoded) = authorization
            .trim()
            .split_once(' ')
            .ok_or(AuthError::MalformedHeader)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::UnsupportedScheme);
        }

        let decoded = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedHeader)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedHeader)?;

        let (username, password) = decoded.split_once(':').ok_or(AuthError::MalformedHeader)?;
        Ok((username.to_string(), password.to_string()))
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    async fn authenticate(&self, authorization: &str) -> Result<Principal, AuthError> {
        let (username, password) = Self::decode(authorization)?;

        match self.users.get(&username) {
            Some(expected) if *expected == password => Ok(Principal { username }),
            _ => {
                warn!("Rejected API credentials for user {}", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
