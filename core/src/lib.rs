//! Synchronous client core for the registrar's TXT record API.
//!
//! # Overview
//! Builds form-encoded `HttpRequest` values for adding and removing DNS
//! records, and interprets registrar responses into a single verdict. The
//! registrar reports success at two levels, once for the call and once per
//! domain in the batch, and a call only succeeds when both do.
//!
//! # Design
//! - `RegruClient` is stateless. It holds only the endpoint and credentials.
//! - Requests are built (`build_*`) and responses parsed (`parse_response`)
//!   without I/O. A `Transport` performs the round trip in between;
//!   `HttpTransport` is the blocking `ureq` implementation.
//! - `verdict::classify` is a pure function from `ApiResponse` to `Verdict`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod verdict;

pub use client::RegruClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{Exchange, HttpRequest, HttpResponse, WireDump};
pub use transport::{HttpTransport, Transport};
pub use types::{AddTxtRequest, Answer, ApiResponse, Credentials, Domain, DomainResponse, RemoveRecordRequest};
pub use verdict::{classify, Verdict};
