//! In-memory stand-in for the registrar's zone API.
//!
//! Serves `POST /zone/add_txt` and `POST /zone/remove_record` with the same
//! form encoding and response envelope as the real service: bad credentials
//! fail the whole call, unknown zones fail only their own entry in
//! `answer.domains`.

use std::{collections::HashMap, sync::Arc};

use axum::{extract::State, routing::post, Form, Json, Router};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const TEST_USERNAME: &str = "test";
pub const TEST_PASSWORD: &str = "test";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// `@` for the zone apex.
    pub subdomain: String,
    pub record_type: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiForm {
    pub input_format: String,
    pub input_data: String,
}

#[derive(Debug, Deserialize)]
pub struct Dname {
    pub dname: String,
}

#[derive(Debug, Deserialize)]
pub struct AddTxt {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub domains: Vec<Dname>,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRecord {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub domains: Vec<Dname>,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub record_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainResult {
    pub result: String,
    pub dname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerBody {
    pub domains: Vec<DomainResult>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl ApiResponse {
    fn success(domains: Vec<DomainResult>) -> Self {
        Self {
            result: "success".to_string(),
            answer: Some(AnswerBody { domains }),
            error_code: None,
            error_text: None,
        }
    }

    fn error(code: &str, text: &str) -> Self {
        Self {
            result: "error".to_string(),
            answer: None,
            error_code: Some(code.to_string()),
            error_text: Some(text.to_string()),
        }
    }
}

impl DomainResult {
    fn success(dname: &str) -> Self {
        Self {
            result: "success".to_string(),
            dname: dname.to_string(),
            error_code: None,
            error_text: None,
        }
    }

    fn not_found(dname: &str) -> Self {
        Self {
            result: "error".to_string(),
            dname: dname.to_string(),
            error_code: Some("DOMAIN_NOT_FOUND".to_string()),
            error_text: Some(format!("Domain {dname} not found or not owned by this account")),
        }
    }
}

struct Account {
    username: String,
    password: String,
    zones: HashMap<String, Vec<Record>>,
}

/// Shared zone store behind the router.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RwLock<Account>>,
}

impl Registry {
    /// Registry for the public test account holding `zones`, all empty.
    pub fn new(zones: &[&str]) -> Self {
        Self::with_account(TEST_USERNAME, TEST_PASSWORD, zones)
    }

    pub fn with_account(username: &str, password: &str, zones: &[&str]) -> Self {
        let account = Account {
            username: username.to_string(),
            password: password.to_string(),
            zones: zones.iter().map(|z| (z.to_string(), Vec::new())).collect(),
        };
        Self {
            inner: Arc::new(RwLock::new(account)),
        }
    }

    pub async fn records(&self, zone: &str) -> Vec<Record> {
        let account = self.inner.read().await;
        account.zones.get(zone).cloned().unwrap_or_default()
    }

    /// Like [`Registry::records`], for callers outside the runtime.
    pub fn blocking_records(&self, zone: &str) -> Vec<Record> {
        let account = self.inner.blocking_read();
        account.zones.get(zone).cloned().unwrap_or_default()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(&["example.com", "example.org"])
    }
}

pub fn app() -> Router {
    app_with(Registry::default())
}

pub fn app_with(registry: Registry) -> Router {
    Router::new()
        .route("/zone/add_txt", post(add_txt))
        .route("/zone/remove_record", post(remove_record))
        .with_state(registry)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Registry::default()).await
}

pub async fn run_with(listener: TcpListener, registry: Registry) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(registry)).await
}

fn decode<T: DeserializeOwned>(form: &ApiForm) -> Result<T, ApiResponse> {
    if form.input_format != "json" {
        return Err(ApiResponse::error("INVALID_INPUT_FORMAT", "Only json input_format is supported"));
    }
    serde_json::from_str(&form.input_data).map_err(|e| ApiResponse::error("INVALID_INPUT_DATA", &e.to_string()))
}

fn check_login(account: &Account, username: &str, password: &str) -> Result<(), ApiResponse> {
    if account.username == username && account.password == password {
        Ok(())
    } else {
        Err(ApiResponse::error("PASSWORD_AUTH_FAILED", "Username/password Incorrect"))
    }
}

fn record_name(subdomain: &str) -> String {
    if subdomain.is_empty() {
        "@".to_string()
    } else {
        subdomain.to_string()
    }
}

async fn add_txt(State(registry): State<Registry>, Form(form): Form<ApiForm>) -> Json<ApiResponse> {
    let input: AddTxt = match decode(&form) {
        Ok(input) => input,
        Err(resp) => return Json(resp),
    };

    let mut account = registry.inner.write().await;
    if let Err(resp) = check_login(&account, &input.username, &input.password) {
        return Json(resp);
    }
    if input.domains.is_empty() {
        return Json(ApiResponse::error("NO_DOMAIN", "No domains specified"));
    }
    if input.text.is_empty() {
        return Json(ApiResponse::error("NO_TEXT", "TXT record text is required"));
    }

    let name = record_name(&input.subdomain);
    let domains = input
        .domains
        .iter()
        .map(|d| match account.zones.get_mut(&d.dname) {
            Some(records) => {
                records.push(Record {
                    subdomain: name.clone(),
                    record_type: "TXT".to_string(),
                    content: input.text.clone(),
                });
                log::info!("add_txt {name} in {}", d.dname);
                DomainResult::success(&d.dname)
            }
            None => DomainResult::not_found(&d.dname),
        })
        .collect();

    Json(ApiResponse::success(domains))
}

async fn remove_record(State(registry): State<Registry>, Form(form): Form<ApiForm>) -> Json<ApiResponse> {
    let input: RemoveRecord = match decode(&form) {
        Ok(input) => input,
        Err(resp) => return Json(resp),
    };

    let mut account = registry.inner.write().await;
    if let Err(resp) = check_login(&account, &input.username, &input.password) {
        return Json(resp);
    }
    if input.domains.is_empty() {
        return Json(ApiResponse::error("NO_DOMAIN", "No domains specified"));
    }

    let name = record_name(&input.subdomain);
    let matches = |r: &Record| {
        r.subdomain == name
            && (input.content.is_empty() || r.content == input.content)
            && (input.record_type.is_empty() || r.record_type == input.record_type)
    };

    let domains = input
        .domains
        .iter()
        .map(|d| match account.zones.get_mut(&d.dname) {
            Some(records) => {
                let before = records.len();
                records.retain(|r| !matches(r));
                log::info!("remove_record {name} in {}: {} removed", d.dname, before - records.len());
                DomainResult::success(&d.dname)
            }
            None => DomainResult::not_found(&d.dname),
        })
        .collect();

    Json(ApiResponse::success(domains))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_omits_answer() {
        let json = serde_json::to_value(ApiResponse::error("PASSWORD_AUTH_FAILED", "bad")).unwrap();
        assert_eq!(json["result"], "error");
        assert_eq!(json["error_code"], "PASSWORD_AUTH_FAILED");
        assert!(json.get("answer").is_none());
    }

    #[test]
    fn success_domain_omits_error_fields() {
        let json = serde_json::to_value(DomainResult::success("example.com")).unwrap();
        assert_eq!(json, serde_json::json!({"result": "success", "dname": "example.com"}));
    }

    #[test]
    fn decode_rejects_non_json_format() {
        let form = ApiForm {
            input_format: "xml".to_string(),
            input_data: "{}".to_string(),
        };
        let err = decode::<AddTxt>(&form).unwrap_err();
        assert_eq!(err.error_code.as_deref(), Some("INVALID_INPUT_FORMAT"));
    }

    #[test]
    fn decode_defaults_optional_fields() {
        let form = ApiForm {
            input_format: "json".to_string(),
            input_data: r#"{"username":"u","password":"p"}"#.to_string(),
        };
        let input: RemoveRecord = decode(&form).unwrap();
        assert!(input.domains.is_empty());
        assert!(input.content.is_empty());
        assert!(input.record_type.is_empty());
    }

    #[test]
    fn apex_is_stored_as_at() {
        assert_eq!(record_name(""), "@");
        assert_eq!(record_name("_acme-challenge"), "_acme-challenge");
    }
}
