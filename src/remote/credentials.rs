//! Basic-auth credentials embedded in a URL's authority component.

/// Username and password pair for HTTP basic auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Extract `user:pass` from the authority of `url`.
///
/// The userinfo is everything before the first `@`, split on the first `:`.
/// Nothing is percent-decoded. A userinfo without a colon yields an empty
/// password.
pub fn auth_from_url(url: &str) -> Option<Credentials> {
    let (userinfo, _host) = authority(url).split_once('@')?;

    let credentials = match userinfo.split_once(':') {
        Some((username, password)) => Credentials::new(username, password),
        None => Credentials::new(userinfo, ""),
    };
    Some(credentials)
}

/// The `user:pass@host:port` part of a URL, empty when there is none.
fn authority(url: &str) -> &str {
    let rest = match url.find("//") {
        Some(idx) => &url[idx + 2..],
        None => return "",
    };
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}
