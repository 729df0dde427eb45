//! The HTTP round trip between `build_*` and `parse_response`.
//!
//! # Design
//! `Transport` is the seam between the deterministic core and the network.
//! `HttpTransport` is the blocking implementation backed by a `ureq` agent
//! with a global deadline, so a silent server fails the call instead of
//! hanging it. Non-200 statuses come back as data, never as `Err`, and their
//! body is left unread. Nothing is retried here.
//!
//! The agent's automatic headers are pinned (`User-Agent`, `Accept`, no
//! `Accept-Encoding`) so the diagnostic dump shows exactly what is sent.

use std::io::ErrorKind;
use std::time::Duration;

use ureq::config::AutoHeaderValue;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{dump_request, dump_response, AgentHeaders, Exchange, HttpRequest, WireDump};

const USER_AGENT: &str = concat!("regru-core/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "*/*";

/// Performs a single HTTP round trip.
pub trait Transport {
    /// Send `request`. The body is read only when `read_body` is set and the
    /// status is 200.
    fn execute(&self, request: &HttpRequest, read_body: bool) -> Result<Exchange, ApiError>;
}

/// Blocking transport over `ureq`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    timeout: Duration,
    dump_request_response: bool,
}

impl HttpTransport {
    pub fn new(timeout: Duration, dump_request_response: bool) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .user_agent(USER_AGENT)
            .accept(ACCEPT)
            .accept_encoding(AutoHeaderValue::None)
            .build()
            .new_agent();

        Self {
            agent,
            timeout,
            dump_request_response,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.timeout, config.dump_request_response)
    }

    fn map_error(&self, err: ureq::Error) -> ApiError {
        match err {
            ureq::Error::Timeout(_) => ApiError::Timeout(self.timeout),
            ureq::Error::Io(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                ApiError::Timeout(self.timeout)
            }
            other => ApiError::Transport(other.to_string()),
        }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &HttpRequest, read_body: bool) -> Result<Exchange, ApiError> {
        let agent_headers = AgentHeaders {
            user_agent: USER_AGENT,
            accept: ACCEPT,
        };
        let request_dump = if self.dump_request_response {
            Some(dump_request(request, &agent_headers)?)
        } else {
            None
        };
        if let Some(dump) = &request_dump {
            println!("Request: {dump:?}");
        }

        log::debug!("POST {}", request.url);

        let mut builder = self.agent.post(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        let mut response = builder
            .send(request.body.as_bytes())
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let reason = response.status().canonical_reason();
        let version = format!("{:?}", response.version());
        log::debug!("HTTP {status} from {}", request.url);

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), value.to_str().unwrap_or_default().to_string()))
            .collect();

        let wants_body = status == 200 && read_body;
        let body = if wants_body || self.dump_request_response {
            match response.body_mut().read_to_string() {
                Ok(body) => Some(body),
                Err(e) if wants_body => return Err(self.map_error(e)),
                Err(e) => {
                    log::warn!("could not read response body for dump: {e}");
                    None
                }
            }
        } else {
            None
        };

        let dump = request_dump.map(|request| {
            let response = dump_response(&version, status, reason, &headers, body.as_deref().unwrap_or_default());
            println!("Response: {response:?}");
            WireDump { request, response }
        });

        Ok(Exchange {
            status,
            headers,
            body: body.filter(|_| wants_body),
            dump,
        })
    }
}
