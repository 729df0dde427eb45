//! Wire DTOs for the registrar's zone API.
//!
//! # Design
//! Field names are the wire contract and must match the registrar exactly.
//! Request payloads are built fresh for every call and never persisted.
//! They carry the account password, so their `Debug` output redacts it;
//! the serialized form is the only place the password appears in clear.
//!
//! The mock-server crate defines its own copies of these shapes.
//! Integration tests catch any schema drift between the two crates.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// The `result` value the registrar uses to signal success, both at the
/// top level and per domain.
pub const SUCCESS_RESULT: &str = "success";

/// The `output_content_type` hint sent with every request.
pub const OUTPUT_CONTENT_TYPE: &str = "plain";

/// Account credentials for the registrar API.
#[derive(Clone, PartialEq, Eq)]
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

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A single domain name as it appears in a request batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub dname: String,
}

impl Domain {
    /// Wrap a domain name, dropping the trailing root dot of an FQDN.
    pub fn new(dname: &str) -> Self {
        Self {
            dname: dname.strip_suffix('.').unwrap_or(dname).to_string(),
        }
    }
}

/// Payload of a `zone/add_txt` request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTxtRequest {
    pub username: String,
    pub password: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<Domain>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subdomain: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output_content_type: String,
}

impl fmt::Debug for AddTxtRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddTxtRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domains", &self.domains)
            .field("subdomain", &self.subdomain)
            .field("text", &self.text)
            .field("output_content_type", &self.output_content_type)
            .finish()
    }
}

/// Payload of a `zone/remove_record` request.
///
/// `content` and `record_type` narrow which records are removed. Leaving
/// both empty removes every record under `subdomain`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveRecordRequest {
    pub username: String,
    pub password: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<Domain>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subdomain: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output_content_type: String,
}

impl fmt::Debug for RemoveRecordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveRecordRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domains", &self.domains)
            .field("subdomain", &self.subdomain)
            .field("content", &self.content)
            .field("record_type", &self.record_type)
            .field("output_content_type", &self.output_content_type)
            .finish()
    }
}

/// Top-level body of every registrar response.
///
/// A `result` of [`SUCCESS_RESULT`] does not mean every domain in the batch
/// succeeded; see [`crate::verdict::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub result: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub error_code: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub error_text: String,
}

/// Per-domain detail, one entry per domain submitted in the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<DomainResponse>,
}

/// Outcome of the operation for a single domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainResponse {
    pub result: String,

    pub dname: String,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub error_code: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub error_text: String,
}

impl DomainResponse {
    pub fn is_success(&self) -> bool {
        self.result == SUCCESS_RESULT
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
