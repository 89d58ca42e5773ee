//! Outbound HTTP calls to remote APIs.

use crate::http::Method;
use crate::remote::credentials::auth_from_url;
use crate::remote::{FetchError, RemoteRequest, RemoteResponse};
use crate::runtime::AppConfig;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, PRAGMA, USER_AGENT,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// User agent sent with every remote request.
pub const CLIENT_USER_AGENT: &str = "pdnscontrol/0";

/// Accept header used by [`RemoteClient::fetch_json`].
pub const JSON_ACCEPT: &str = "application/json; q=1";

/// Statuses handed back to the caller. 400 and 422 carry validation
/// errors from the remote API that callers want to inspect.
const ACCEPTED_STATUSES: [u16; 3] = [200, 400, 422];

/// Client for remote JSON APIs.
///
/// TLS verification and the default timeout are fixed from [`AppConfig`]
/// at construction.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    default_timeout: Duration,
}

impl RemoteClient {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        if config.ignore_ssl_errors {
            warn!("TLS certificate verification is disabled for remote requests");
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.ignore_ssl_errors)
            .build()?;

        Ok(Self {
            http,
            default_timeout: config.remote_timeout,
        })
    }

    /// Timeout applied when a request does not set its own.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Send `request` and return the buffered response.
    ///
    /// Any status other than 200, 400 or 422 is returned as
    /// [`FetchError::Status`].
    pub async fn fetch_remote(&self, request: RemoteRequest) -> Result<RemoteResponse, FetchError> {
        let RemoteRequest {
            method,
            url,
            body,
            params,
            headers,
            accept,
            timeout,
        } = request;

        let credentials = auth_from_url(&url);
        let target = strip_userinfo(&url)?;
        let timeout = timeout.unwrap_or(self.default_timeout);

        let mut builder = self
            .http
            .request(to_reqwest_method(&method), target.clone())
            .headers(build_headers(accept.as_deref(), headers.as_ref())?)
            .timeout(timeout);

        if let Some(credentials) = credentials {
            builder = builder.basic_auth(credentials.username, Some(credentials.password));
        }
        if let Some(params) = &params {
            builder = builder.query(params);
        }
        if let Some(body) = body {
            builder = builder.body(body.into_text()?);
        }

        debug!("{} {} (timeout {:?})", method, target, timeout);
        let response = builder.send().await?;

        let status = response.status().as_u16();
        if !ACCEPTED_STATUSES.contains(&status) {
            warn!("{} {} answered with status {}", method, target, status);
            return Err(FetchError::Status {
                url: target.to_string(),
                status,
            });
        }

        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RemoteResponse {
            url: final_url,
            status,
            headers,
            body,
        })
    }

    /// Fetch `request` and decode the body as JSON.
    ///
    /// The remote must label the body with a content type containing
    /// `json`, otherwise [`FetchError::ExpectedJson`] is returned.
    pub async fn fetch_json(&self, request: RemoteRequest) -> Result<serde_json::Value, FetchError> {
        let response = self.fetch_remote(request.accept(JSON_ACCEPT)).await?;

        if !response.is_json() {
            return Err(FetchError::ExpectedJson { url: response.url });
        }

        Ok(response.decode_json()?)
    }

    /// Like [`RemoteClient::fetch_json`], deserializing into `T`.
    pub async fn fetch_json_as<T: DeserializeOwned>(
        &self,
        request: RemoteRequest,
    ) -> Result<T, FetchError> {
        let value = self.fetch_json(request).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Default headers, then `accept`, then caller headers on top.
fn build_headers(
    accept: Option<&str>,
    extra: Option<&HashMap<String, String>>,
) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    if let Some(accept) = accept {
        let value = HeaderValue::from_str(accept).map_err(|_| FetchError::InvalidHeader {
            name: ACCEPT.to_string(),
        })?;
        headers.insert(ACCEPT, value);
    }

    for (name, value) in extra.into_iter().flatten() {
        let invalid = || FetchError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Parse `url` and drop its userinfo; credentials travel as a header.
fn strip_userinfo(url: &str) -> Result<Url, FetchError> {
    let mut target = Url::parse(url)?;
    if !target.username().is_empty() || target.password().is_some() {
        // Only fails for URLs without a host, which carry no userinfo.
        let _ = target.set_username("");
        let _ = target.set_password(None);
    }
    Ok(target)
}

fn to_reqwest_method(method: &Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_are_set() {
        let headers = build_headers(None, None).unwrap();
        assert_eq!(headers[USER_AGENT], "pdnscontrol/0");
        assert_eq!(headers[PRAGMA], "no-cache");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert!(headers.get(ACCEPT).is_none());
    }

    #[test]
    fn caller_headers_override_defaults_case_insensitively() {
        let mut extra = HashMap::new();
        extra.insert("User-Agent".to_string(), "custom/1".to_string());
        extra.insert("Accept".to_string(), "text/plain".to_string());
        extra.insert("X-API-Key".to_string(), "changeme".to_string());

        let headers = build_headers(Some(JSON_ACCEPT), Some(&extra)).unwrap();
        assert_eq!(headers[USER_AGENT], "custom/1");
        assert_eq!(headers[ACCEPT], "text/plain");
        assert_eq!(headers["x-api-key"], "changeme");
        assert_eq!(headers.get_all(USER_AGENT).iter().count(), 1);
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let mut extra = HashMap::new();
        extra.insert("bad header".to_string(), "x".to_string());

        let err = build_headers(None, Some(&extra)).unwrap_err();
        assert!(matches!(err, FetchError::InvalidHeader { name } if name == "bad header"));
    }

    #[test]
    fn userinfo_is_removed_from_target() {
        let target = strip_userinfo("http://admin:pw@pdns.example.net:8081/servers?x=1").unwrap();
        assert_eq!(target.as_str(), "http://pdns.example.net:8081/servers?x=1");
    }

    #[test]
    fn client_takes_timeout_from_config() {
        let config = AppConfig::new().remote_timeout(Duration::from_millis(1500));
        let client = RemoteClient::new(&config).unwrap();
        assert_eq!(client.default_timeout(), Duration::from_millis(1500));
    }
}
