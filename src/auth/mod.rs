//! Optional API authentication.
//!
//! Requests that carry an `Authorization` header must authenticate;
//! requests without one run anonymously. The gate runs once per request
//! and its result reaches the handler as an [`Auth`] value.

mod basic;

pub use basic::BasicAuthenticator;

use crate::http::{Request, Response, StatusCode};
use async_trait::async_trait;
use hyper::header::{HeaderValue, WWW_AUTHENTICATE};
use thiserror::Error;
use tracing::debug;

/// Challenge sent when credentials are rejected.
pub const CHALLENGE: &str = "Basic realm=\"Login Required\"";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("unsupported authorization scheme")]
    UnsupportedScheme,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("invalid credentials")]
    InvalidCredentials,
}

impl From<AuthError> for Response {
    fn from(err: AuthError) -> Self {
        Response::error(StatusCode::UNAUTHORIZED, err.to_string())
            .header(WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE))
    }
}

/// Identity established by an [`Authenticator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

/// Authentication state a handler runs under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Auth {
    #[default]
    Anonymous,
    Authenticated(Principal),
}

impl Auth {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Auth::Anonymous => None,
            Auth::Authenticated(principal) => Some(principal),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Auth::Authenticated(_))
    }
}

/// Whether a handler sits behind the optional auth gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Never checks credentials.
    Public,
    /// Checks credentials only when the client sends them.
    #[default]
    Optional,
}

/// Mandatory authentication: validates an `Authorization` header value.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, authorization: &str) -> Result<Principal, AuthError>;
}

/// Run the optional auth gate for `request`.
///
/// Presenting any credentials makes the request subject to
/// `authenticator`; omitting the header skips authentication entirely.
pub async fn optional_auth(
    authenticator: &dyn Authenticator,
    request: &Request,
) -> Result<Auth, AuthError> {
    match request.authorization() {
        None => Ok(Auth::Anonymous),
        Some(header) => {
            let principal = authenticator.authenticate(header).await?;
            debug!("Authenticated API user {}", principal.username);
            Ok(Auth::Authenticated(principal))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAuthenticator {
        calls: AtomicUsize,
        accept: bool,
    }

    #[async_trait]
    impl Authenticator for CountingAuthenticator {
        async fn authenticate(&self, _authorization: &str) -> Result<Principal, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.accept {
                Ok(Principal {
                    username: "api".to_string(),
                })
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    #[tokio::test]
    async fn missing_header_skips_authenticator() {
        let authenticator = CountingAuthenticator {
            calls: AtomicUsize::new(0),
            accept: false,
        };
        let request = Request::new(Method::Get, "/zones");

        let auth = optional_auth(&authenticator, &request).await.unwrap();
        assert_eq!(auth, Auth::Anonymous);
        assert_eq!(authenticator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn present_header_goes_through_authenticator() {
        let authenticator = CountingAuthenticator {
            calls: AtomicUsize::new(0),
            accept: true,
        };
        let request = Request::new(Method::Get, "/zones").header("Authorization", "Basic x");

        let auth = optional_auth(&authenticator, &request).await.unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(auth.principal().unwrap().username, "api");
        assert_eq!(authenticator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_credentials_are_an_error() {
        let authenticator = CountingAuthenticator {
            calls: AtomicUsize::new(0),
            accept: false,
        };
        let request = Request::new(Method::Get, "/zones").header("Authorization", "Basic x");

        let err = optional_auth(&authenticator, &request).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[test]
    fn rejection_response_asks_for_basic_auth() {
        let response: Response = AuthError::InvalidCredentials.into();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers[WWW_AUTHENTICATE], "Basic realm=\"Login Required\"");
    }
}
