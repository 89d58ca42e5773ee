//! HTTP server hosting the registered handlers.

use crate::auth::{optional_auth, Auth, AuthPolicy, Authenticator, BasicAuthenticator};
use crate::endpoint::{AppError, Handler, HandlerRegistry, RequestContext};
use crate::http::{parse_query, Method, Request, Response, StatusCode, UnsupportedMethod};
use crate::runtime::AppConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// HTTP server.
///
/// Every request to a handler with [`AuthPolicy::Optional`] passes the
/// optional auth gate before the handler runs.
pub struct Server {
    /// Server configuration.
    config: AppConfig,
    /// Handler registry.
    registry: Arc<HandlerRegistry>,
    /// Authenticator used when a client sends credentials.
    authenticator: Arc<dyn Authenticator>,
}

impl Server {
    /// Create a server that authenticates against `config.api_users`.
    pub fn new(config: AppConfig) -> Self {
        let authenticator = Arc::new(BasicAuthenticator::new(config.api_users.clone()));
        Self {
            config,
            registry: Arc::new(HandlerRegistry::new()),
            authenticator,
        }
    }

    /// Create a server with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AppConfig::default())
    }

    /// Replace the authenticator.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    /// Get the server configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the handler registry.
    pub fn registry(&self) -> Arc<HandlerRegistry> {
        self.registry.clone()
    }

    /// Register a handler at `path`.
    pub async fn register(
        &self,
        path: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<(), AppError> {
        self.registry.register(path, handler).await
    }

    /// Bind the configured address and serve until an accept error.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Server listening on {}", listener.local_addr()?);

        let server = Arc::new(self);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let server = server.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move { server.handle_incoming(req, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }

    /// Dispatch a request to its handler and render the outcome.
    pub async fn handle(&self, request: Request) -> Response {
        let request_id = generate_request_id();

        if self.config.enable_health && request.path == "/_health" {
            return Response::text("OK");
        }

        let handler = match self.registry.get(&request.path).await {
            Some(handler) => handler,
            None => {
                debug!("No handler for {} [{}]", request.path, request_id);
                return Response::error(
                    StatusCode::NOT_FOUND,
                    format!("No handler for {}", request.path),
                );
            }
        };

        let auth = match handler.auth_policy() {
            AuthPolicy::Public => Auth::Anonymous,
            AuthPolicy::Optional => {
                match optional_auth(self.authenticator.as_ref(), &request).await {
                    Ok(auth) => auth,
                    Err(err) => {
                        warn!(
                            "Rejected request to '{}': {} [{}]",
                            handler.name(),
                            err,
                            request_id
                        );
                        return err.into();
                    }
                }
            }
        };

        let ctx = RequestContext::new(&request_id).with_auth(auth);
        match handler.call(request, &ctx).await {
            Ok(response) => response,
            Err(e) => {
                error!("Handler '{}' error: {} [{}]", handler.name(), e, request_id);
                e.into()
            }
        }
    }

    async fn handle_incoming(
        &self,
        req: hyper::Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Result<hyper::Response<Full<Bytes>>, hyper::Error> {
        debug!("Handling request: {} {} from {}", req.method(), req.uri(), remote_addr);

        let request = match convert_request(req, self.config.max_body_size).await {
            Ok(request) => request,
            Err(e) => {
                warn!("Failed to convert request: {}", e);
                return Ok(build_response(Response::error(e.status(), e.to_string())));
            }
        };

        Ok(build_response(self.handle(request).await))
    }
}

/// Reasons an inbound request never reaches a handler.
#[derive(Error, Debug)]
enum RequestError {
    #[error("method {0} not allowed")]
    UnsupportedMethod(String),
    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),
    #[error("failed to read request body: {0}")]
    Body(Box<dyn std::error::Error + Send + Sync>),
}

impl RequestError {
    fn status(&self) -> StatusCode {
        match self {
            RequestError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::BodyTooLarge(_) | RequestError::Body(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Convert a hyper request into a [`Request`].
///
/// The body is read through a [`Limited`] wrapper, so at most
/// `max_body_size` bytes are buffered before the request is refused.
async fn convert_request(
    req: hyper::Request<Incoming>,
    max_body_size: usize,
) -> Result<Request, RequestError> {
    let (parts, body) = req.into_parts();

    let method = Method::try_from(&parts.method)
        .map_err(|UnsupportedMethod(name)| RequestError::UnsupportedMethod(name))?;
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(parse_query).unwrap_or_default();

    let mut headers = HashMap::new();
    for (name, value) in &parts.headers {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_ascii_lowercase(), v.to_string());
        }
    }

    let body_bytes = match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(RequestError::BodyTooLarge(max_body_size));
        }
        Err(err) => return Err(RequestError::Body(err)),
    };
    let body = (!body_bytes.is_empty()).then_some(body_bytes);

    Ok(Request {
        method,
        path,
        query,
        headers,
        body,
    })
}

/// Build a hyper response from a [`Response`].
fn build_response(response: Response) -> hyper::Response<Full<Bytes>> {
    let mut built = hyper::Response::new(Full::new(response.body));
    *built.status_mut() = response.status;
    *built.headers_mut() = response.headers;
    built
}

/// Generate a unique request ID.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}", timestamp)
}
