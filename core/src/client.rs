//! Stateless request builder and response interpreter for the zone API.
//!
//! # Design
//! `RegruClient` holds only the endpoint and credentials and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and `parse_response`, which turns
//! an `HttpResponse` into a verdict. `add_txt_record` and `remove_record`
//! glue the two around any `Transport`.
//!
//! The registrar expects a form-encoded body with the JSON payload in the
//! `input_data` field and `input_format=json`.

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{AddTxtRequest, ApiResponse, Credentials, Domain, RemoveRecordRequest, OUTPUT_CONTENT_TYPE};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Longest slice of a response body written to the log.
const LOG_BODY_LIMIT: usize = 256;

#[derive(Debug, Clone)]
pub struct RegruClient {
    base_url: String,
    credentials: Credentials,
}

impl RegruClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
        }
    }

    /// Build a `zone/add_txt` request. An empty `subdomain` targets the apex.
    pub fn build_add_txt_record(&self, domains: &[&str], subdomain: &str, text: &str) -> Result<HttpRequest, ApiError> {
        self.check_credentials()?;
        let domains = to_domains(domains)?;
        if text.is_empty() {
            return Err(ApiError::InvalidRequest("TXT record text is empty".to_string()));
        }

        let payload = AddTxtRequest {
            username: self.credentials.username.clone(),
            password: self.credentials.password.clone(),
            domains,
            subdomain: subdomain.to_string(),
            text: text.to_string(),
            output_content_type: OUTPUT_CONTENT_TYPE.to_string(),
        };
        self.form_request("zone/add_txt", &payload)
    }

    /// Build a `zone/remove_record` request.
    ///
    /// `content` and `record_type` are not required. With both empty the
    /// registrar removes every record under `subdomain`.
    pub fn build_remove_record(
        &self,
        domains: &[&str],
        subdomain: &str,
        content: &str,
        record_type: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.check_credentials()?;
        let domains = to_domains(domains)?;

        let payload = RemoveRecordRequest {
            username: self.credentials.username.clone(),
            password: self.credentials.password.clone(),
            domains,
            subdomain: subdomain.to_string(),
            content: content.to_string(),
            record_type: record_type.to_string(),
            output_content_type: OUTPUT_CONTENT_TYPE.to_string(),
        };
        self.form_request("zone/remove_record", &payload)
    }

    /// Interpret a registrar response.
    ///
    /// Non-200 statuses fail before the body is looked at. A 200 body must
    /// deserialize into `ApiResponse` and then pass both result levels.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ApiResponse, ApiError> {
        if response.status != 200 {
            return Err(ApiError::HttpStatus {
                status: response.status,
            });
        }

        let parsed: ApiResponse = serde_json::from_str(&response.body).map_err(|e| {
            log::error!("malformed response body: {e}");
            log::error!("raw response: {}", truncate_for_log(&response.body));
            ApiError::DeserializationError(e.to_string())
        })?;

        if let Err(e) = parsed.has_error() {
            log::warn!("{e}");
            return Err(e);
        }
        Ok(parsed)
    }

    /// Add a TXT record under `subdomain` in every zone of `domains`.
    pub fn add_txt_record<T>(
        &self,
        transport: &T,
        domains: &[&str],
        subdomain: &str,
        text: &str,
    ) -> Result<ApiResponse, ApiError>
    where
        T: Transport + ?Sized,
    {
        let request = self.build_add_txt_record(domains, subdomain, text)?;
        log::debug!("adding TXT record at {subdomain:?} in {domains:?}");
        let exchange = transport.execute(&request, true)?;
        self.parse_response(exchange.into_response())
    }

    /// Remove records under `subdomain` in every zone of `domains`.
    pub fn remove_record<T>(
        &self,
        transport: &T,
        domains: &[&str],
        subdomain: &str,
        content: &str,
        record_type: &str,
    ) -> Result<ApiResponse, ApiError>
    where
        T: Transport + ?Sized,
    {
        let request = self.build_remove_record(domains, subdomain, content, record_type)?;
        log::debug!("removing {record_type:?} record at {subdomain:?} in {domains:?}");
        let exchange = transport.execute(&request, true)?;
        self.parse_response(exchange.into_response())
    }

    fn check_credentials(&self) -> Result<(), ApiError> {
        if self.credentials.username.is_empty() || self.credentials.password.is_empty() {
            return Err(ApiError::InvalidRequest("username and password are required".to_string()));
        }
        Ok(())
    }

    fn form_request<P: Serialize>(&self, endpoint: &str, payload: &P) -> Result<HttpRequest, ApiError> {
        let input_data = serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("input_format", "json")
            .append_pair("input_data", &input_data)
            .finish();

        Ok(HttpRequest {
            url: format!("{}/{endpoint}", self.base_url),
            headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body,
        })
    }
}

fn to_domains(domains: &[&str]) -> Result<Vec<Domain>, ApiError> {
    if domains.is_empty() {
        return Err(ApiError::InvalidRequest("at least one domain is required".to_string()));
    }
    domains
        .iter()
        .map(|name| {
            let domain = Domain::new(name.trim());
            if domain.dname.is_empty() {
                Err(ApiError::InvalidRequest("domain name is empty".to_string()))
            } else {
                Ok(domain)
            }
        })
        .collect()
}

fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_BODY_LIMIT {
        return s.to_string();
    }
    let mut end = LOG_BODY_LIMIT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated, total {} bytes]", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::http::Exchange;

    fn client() -> RegruClient {
        let config = ClientConfig::new(Credentials::new("test", "secret")).with_base_url("http://localhost:3000");
        RegruClient::new(&config)
    }

    /// Decode the form body and return the parsed `input_data` JSON.
    fn input_data(req: &HttpRequest) -> serde_json::Value {
        let fields: Vec<(String, String)> = url::form_urlencoded::parse(req.body.as_bytes()).into_owned().collect();
        assert!(fields.contains(&("input_format".to_string(), "json".to_string())));
        let data = fields
            .iter()
            .find(|(k, _)| k == "input_data")
            .map(|(_, v)| v.clone())
            .unwrap();
        serde_json::from_str(&data).unwrap()
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    struct FakeTransport {
        exchange: Exchange,
        calls: RefCell<Vec<(HttpRequest, bool)>>,
    }

    impl FakeTransport {
        fn new(status: u16, body: Option<&str>) -> Self {
            Self {
                exchange: Exchange {
                    status,
                    headers: Vec::new(),
                    body: body.map(str::to_string),
                    dump: None,
                },
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: &HttpRequest, read_body: bool) -> Result<Exchange, ApiError> {
            self.calls.borrow_mut().push((request.clone(), read_body));
            Ok(self.exchange.clone())
        }
    }

    #[test]
    fn build_add_txt_record_produces_form_request() {
        let req = client()
            .build_add_txt_record(&["example.com."], "_acme-challenge", "token123")
            .unwrap();

        assert_eq!(req.url, "http://localhost:3000/zone/add_txt");
        assert_eq!(req.header("content-type"), Some(FORM_CONTENT_TYPE));

        let data = input_data(&req);
        assert_eq!(data["username"], "test");
        assert_eq!(data["password"], "secret");
        assert_eq!(data["domains"], serde_json::json!([{"dname": "example.com"}]));
        assert_eq!(data["subdomain"], "_acme-challenge");
        assert_eq!(data["text"], "token123");
        assert_eq!(data["output_content_type"], "plain");
    }

    #[test]
    fn build_add_txt_record_payload_roundtrips() {
        let req = client()
            .build_add_txt_record(&["example.com"], "_acme-challenge", "token123")
            .unwrap();
        let payload: AddTxtRequest = serde_json::from_value(input_data(&req)).unwrap();
        assert_eq!(payload.domains, vec![Domain::new("example.com")]);
        assert_eq!(payload.subdomain, "_acme-challenge");
        assert_eq!(payload.text, "token123");
    }

    #[test]
    fn build_add_txt_record_for_apex_omits_subdomain() {
        let req = client().build_add_txt_record(&["example.com"], "", "v=spf1 -all").unwrap();
        assert!(input_data(&req).get("subdomain").is_none());
    }

    #[test]
    fn build_remove_record_produces_form_request() {
        let req = client()
            .build_remove_record(&["a.com", "b.com"], "_acme-challenge", "token123", "TXT")
            .unwrap();

        assert_eq!(req.url, "http://localhost:3000/zone/remove_record");
        let data = input_data(&req);
        assert_eq!(data["domains"], serde_json::json!([{"dname": "a.com"}, {"dname": "b.com"}]));
        assert_eq!(data["content"], "token123");
        assert_eq!(data["record_type"], "TXT");
        assert!(data.get("text").is_none());
    }

    #[test]
    fn build_rejects_missing_inputs() {
        let c = client();
        assert!(matches!(
            c.build_add_txt_record(&[], "_acme-challenge", "t"),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            c.build_add_txt_record(&["example.com"], "_acme-challenge", ""),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            c.build_remove_record(&[" "], "", "", "TXT"),
            Err(ApiError::InvalidRequest(_))
        ));

        let anonymous = RegruClient::new(&ClientConfig::new(Credentials::new("", "")));
        assert!(matches!(
            anonymous.build_add_txt_record(&["example.com"], "", "t"),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn build_remove_record_allows_empty_filters() {
        let req = client().build_remove_record(&["example.com"], "www", "", "").unwrap();
        let data = input_data(&req);
        assert!(data.get("content").is_none());
        assert!(data.get("record_type").is_none());
    }

    #[test]
    fn parse_response_success() {
        let resp = client()
            .parse_response(ok(r#"{"result":"success","answer":{"domains":[{"result":"success","dname":"example.com"}]}}"#))
            .unwrap();
        assert_eq!(resp.answer.unwrap().domains[0].dname, "example.com");
    }

    #[test]
    fn parse_response_non_ok_status_skips_body() {
        let response = HttpResponse {
            status: 500,
            headers: Vec::new(),
            body: "not json at all".to_string(),
        };
        let err = client().parse_response(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 500 }));
    }

    #[test]
    fn parse_response_bad_json() {
        let err = client().parse_response(ok("<html>")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_response_top_level_failure() {
        let err = client()
            .parse_response(ok(
                r#"{"result":"error","error_code":"PASSWORD_AUTH_FAILED","error_text":"Username/password Incorrect"}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApiError::Api { ref code, .. } if code == "PASSWORD_AUTH_FAILED"));
    }

    #[test]
    fn parse_response_domain_failure() {
        let err = client()
            .parse_response(ok(
                r#"{"result":"success","answer":{"domains":[
                    {"result":"success","dname":"a.com"},
                    {"result":"error","dname":"b.com","error_code":"DOMAIN_NOT_FOUND","error_text":"no zone"}
                ]}}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain { ref dname, .. } if dname == "b.com"));
    }

    #[test]
    fn add_txt_record_reads_body_through_transport() {
        let transport = FakeTransport::new(200, Some(r#"{"result":"success"}"#));
        client()
            .add_txt_record(&transport, &["example.com"], "_acme-challenge", "token123")
            .unwrap();

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1, "body read must be requested");
        assert_eq!(calls[0].0.url, "http://localhost:3000/zone/add_txt");
    }

    #[test]
    fn remove_record_surfaces_http_status() {
        let transport = FakeTransport::new(503, None);
        let err = client()
            .remove_record(&transport, &["example.com"], "_acme-challenge", "token123", "TXT")
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 503 }));
    }

    #[test]
    fn invalid_input_never_reaches_transport() {
        let transport = FakeTransport::new(200, Some(r#"{"result":"success"}"#));
        assert!(client().add_txt_record(&transport, &[], "", "t").is_err());
        assert!(transport.calls.borrow().is_empty());
    }

    #[test]
    fn truncate_for_log_limits_long_bodies() {
        let long = "x".repeat(1000);
        let out = truncate_for_log(&long);
        assert!(out.starts_with(&"x".repeat(256)));
        assert!(out.ends_with("[truncated, total 1000 bytes]"));
        assert_eq!(truncate_for_log("short"), "short");
    }
}
