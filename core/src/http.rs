//! HTTP exchange types described as plain data.
//!
//! # Design
//! The client builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. A `Transport` (see `crate::transport`)
//! performs the round trip in between. Every registrar operation is a
//! form-encoded `POST`, so the request carries no method field.

use crate::error::ApiError;

/// An HTTP `POST` described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data, handed to
/// `RegruClient::parse_response`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Raw request and response text captured in diagnostic dump mode.
///
/// Contains the account password in clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireDump {
    pub request: String,
    pub response: String,
}

/// What a transport hands back after one round trip.
///
/// `body` is `Some` only when the status is 200 and the caller asked for
/// the body to be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub dump: Option<WireDump>,
}

impl Exchange {
    /// Convert into an `HttpResponse` for parsing. A missing body becomes empty.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        }
    }
}

/// Headers the transport always sends on top of the request's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AgentHeaders<'a> {
    pub user_agent: &'a str,
    pub accept: &'a str,
}

/// Render a request as it goes over the wire: origin-form target, `Host`,
/// the request's own headers, `Content-Length` and the agent headers.
pub(crate) fn dump_request(request: &HttpRequest, agent: &AgentHeaders<'_>) -> Result<String, ApiError> {
    let url = url::Url::parse(&request.url).map_err(|e| ApiError::InvalidRequest(format!("bad URL {}: {e}", request.url)))?;
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => return Err(ApiError::InvalidRequest(format!("URL has no host: {}", request.url))),
    };
    let target = match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    };

    let mut out = format!("POST {target} HTTP/1.1\r\nHost: {host}\r\n");
    for (key, value) in &request.headers {
        out.push_str(&format!("{key}: {value}\r\n"));
    }
    out.push_str(&format!("Content-Length: {}\r\n", request.body.len()));
    out.push_str(&format!("User-Agent: {}\r\n", agent.user_agent));
    out.push_str(&format!("Accept: {}\r\n", agent.accept));
    out.push_str("\r\n");
    out.push_str(&request.body);
    Ok(out)
}

/// Render a response status line, headers and body.
pub(crate) fn dump_response(
    version: &str,
    status: u16,
    reason: Option<&str>,
    headers: &[(String, String)],
    body: &str,
) -> String {
    let mut out = match reason {
        Some(reason) => format!("{version} {status} {reason}\r\n"),
        None => format!("{version} {status}\r\n"),
    };
    for (key, value) in headers {
        out.push_str(&format!("{key}: {value}\r\n"));
    }
    out.push_str("\r\n");
    out.push_str(body);
    out
}
