//! The one HTTP exchange the engine needs: method + URL in, status + UTF-8
//! body out. Non-success statuses are data, not transport failure; only
//! connectivity-level problems surface as errors.

use std::fmt;
use std::time::Duration;

/// HTTP methods the directive set maps to (`oyc-get`, `oyc-post`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

pub const METHODS: [Method; 6] = [
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Patch,
    Method::Delete,
    Method::Head,
];

impl Method {
    /// Case-normalized wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }

    /// Suffix used in the directive attribute name, e.g. `get` in `oyc-get`.
    pub fn directive_suffix(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
            Method::Head => "head",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Connectivity-level failure. Rejected exchanges propagate to whichever
/// code initiated them; the engine installs no global handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: {}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// One request/response exchange. No custom headers or body in the base
/// contract; implementations may widen this.
pub trait Transport {
    fn exchange(&mut self, method: Method, url: &str) -> Result<Response, TransportError>;
}

/// `ureq`-backed transport for real hosts.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .user_agent("oyc/0.1")
            .build();
        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn exchange(&mut self, method: Method, url: &str) -> Result<Response, TransportError> {
        log::debug!(target: "oyc.fetch", "{} {}", method, url);
        match self.agent.request(method.as_str(), url).call() {
            Ok(response) => {
                let status = response.status();
                let body = response
                    .into_string()
                    .map_err(|e| TransportError(format!("body read failed: {e}")))?;
                Ok(Response { status, body })
            }
            // ureq reports non-2xx as an error; for the engine it is a
            // perfectly ordinary response.
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Ok(Response { status, body })
            }
            Err(ureq::Error::Transport(e)) => Err(TransportError(e.to_string())),
        }
    }
}
