//! Handler trait, per-request context and the handler error type.

use crate::auth::{Auth, AuthError, AuthPolicy};
use crate::http::{FormatError, Request, Response, StatusCode};
use crate::remote::FetchError;
use async_trait::async_trait;

/// Per-request context handed to a [`Handler`].
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Request ID for tracing.
    pub request_id: String,
    /// Outcome of the auth gate.
    pub auth: Auth,
}

impl RequestContext {
    /// Create a new anonymous request context.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            auth: Auth::Anonymous,
        }
    }

    /// Attach the auth outcome.
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }
}

/// An HTTP endpoint.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle an incoming request.
    async fn call(&self, request: Request, ctx: &RequestContext) -> Result<Response, AppError>;

    /// How the optional auth gate applies to this handler.
    fn auth_policy(&self) -> AuthPolicy {
        AuthPolicy::Optional
    }

    /// Get the handler name.
    fn name(&self) -> &str;
}

/// Error returned by handlers, rendered as a plain-text response.
#[derive(Debug, Clone)]
pub struct AppError {
    /// Error message.
    pub message: String,
    /// HTTP status code.
    pub code: u16,
}

impl AppError {
    /// Create a new internal error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 500,
        }
    }

    /// Create an AppError with a specific code.
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(404, message)
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(400, message)
    }

    /// Create a bad gateway error.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::with_code(502, message)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<AppError> for Response {
    fn from(err: AppError) -> Self {
        Response::error(
            StatusCode::from_u16(err.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            err.message,
        )
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        if err.is_timeout() {
            return AppError::with_code(StatusCode::GATEWAY_TIMEOUT.as_u16(), err.to_string());
        }
        match err {
            FetchError::InvalidHeader { .. } | FetchError::InvalidUrl(_) => {
                AppError::new(err.to_string())
            }
            _ => AppError::bad_gateway(err.to_string()),
        }
    }
}

impl From<FormatError> for AppError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::MissingKey(_) => AppError::bad_request(err.to_string()),
            FormatError::Json(_) => AppError::new(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::with_code(StatusCode::UNAUTHORIZED.as_u16(), err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::bad_request(err.to_string())
    }
}
