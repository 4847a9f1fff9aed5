//! hrdeck public API façade.
//!
//! This crate defines the stable Gateway trait and types frontends depend on.
//! Implementations can be HTTP (hrdeck-gateway) or in-memory (MockGateway).

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use hrdeck_core::kinds::ResourceKind;
use hrdeck_core::Record;

/// Connection context injected at construction. No ambient globals: whoever
/// builds a gateway or controller passes the session in explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub base_url: String,
    pub token: Option<String>,
    pub employee_id: Option<i64>,
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        Session {
            base_url: base_url.into(),
            token: None,
            employee_id: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_employee_id(mut self, id: i64) -> Self {
        self.employee_id = Some(id);
        self
    }
}

/// API errors suitable for transport across crate boundaries.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum ApiError {
    /// Network/HTTP failure or non-2xx status from the remote API.
    #[error("transport: {0}")]
    Transport(String),
    /// Payload that is not a sequence of records (or missing the expected key).
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("not_found: {0}")]
    NotFound(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Manager decision forwarded verbatim to the API. The wire shape is
/// `{ id, permission: bool }`; the reason rides along for audit logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAction {
    pub approve: bool,
    pub reason: Option<String>,
}

impl StatusAction {
    pub fn approve() -> Self {
        StatusAction {
            approve: true,
            reason: None,
        }
    }

    pub fn reject(reason: Option<String>) -> Self {
        StatusAction {
            approve: false,
            reason,
        }
    }
}

/// Result of a write as reported by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "empId", alias = "employeeId")]
    pub employee_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Profile fields an employee may change about themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub id: i64,
    pub phone_number: String,
    pub address: String,
    pub image_path: Option<String>,
}

/// Declarative gateway surface consumed by the collection controller and CLI.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch a collection. `scope` narrows to one owning employee
    /// (the `/{kind}/{id}/byEmployee` routes); `None` lists everything.
    async fn fetch_collection(
        &self,
        kind: ResourceKind,
        scope: Option<&str>,
    ) -> ApiResult<Vec<Record>>;

    /// Create one record (permission request, advance, expense, employee).
    async fn create_record(
        &self,
        kind: ResourceKind,
        record: Record,
    ) -> ApiResult<serde_json::Value>;

    /// Approve/reject a record through the manager route for its kind.
    async fn write_mutation(
        &self,
        kind: ResourceKind,
        id: i64,
        action: &StatusAction,
    ) -> ApiResult<WriteOutcome>;

    async fn update_employee(&self, update: &EmployeeUpdate) -> ApiResult<WriteOutcome>;

    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse>;

    /// Ask the API to send a reset mail; `true` when the account exists.
    async fn request_password_reset(&self, email: &str) -> ApiResult<bool>;

    async fn change_password(
        &self,
        email: &str,
        password: &str,
        repeat_password: &str,
    ) -> ApiResult<WriteOutcome>;

    /// Download a supporting document.
    async fn fetch_file(&self, file_name: &str) -> ApiResult<Vec<u8>>;

    /// Upload a supporting document; returns the server-assigned file name.
    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<String>;
}

// ----------------- Mock implementation -----------------

/// In-memory mock gateway for tests. Collections are plain pub fields;
/// a successful write flips the mock to `collections_after_write` so
/// mutate-then-refetch behavior is observable.
pub struct MockGateway {
    pub collections: HashMap<ResourceKind, Vec<Record>>,
    pub collections_after_write: HashMap<ResourceKind, Vec<Record>>,
    pub write: Option<WriteOutcome>,
    /// When set, every fetch fails with `ApiError::Transport`.
    pub fetch_error: Option<String>,
    /// When set, every fetch fails with `ApiError::Malformed`.
    pub malformed: bool,
    pub files: HashMap<String, Vec<u8>>,
    pub login_response: Option<LoginResponse>,
    written: AtomicBool,
    write_calls: Mutex<Vec<(ResourceKind, i64, StatusAction)>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        MockGateway {
            collections: HashMap::new(),
            collections_after_write: HashMap::new(),
            write: None,
            fetch_error: None,
            malformed: false,
            files: HashMap::new(),
            login_response: None,
            written: AtomicBool::new(false),
            write_calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, kind: ResourceKind, records: Vec<Record>) -> Self {
        self.collections.insert(kind, records);
        self
    }

    /// Ids and actions passed to `write_mutation`, in call order.
    pub fn recorded_writes(&self) -> Vec<(ResourceKind, i64, StatusAction)> {
        self.write_calls.lock().expect("mock lock").clone()
    }
}

#[async_trait::async_trait]
impl Gateway for MockGateway {
    async fn fetch_collection(
        &self,
        kind: ResourceKind,
        _scope: Option<&str>,
    ) -> ApiResult<Vec<Record>> {
        if let Some(msg) = &self.fetch_error {
            return Err(ApiError::Transport(msg.clone()));
        }
        if self.malformed {
            return Err(ApiError::Malformed(format!(
                "payload for {} is not a sequence",
                kind.name()
            )));
        }
        if self.written.load(Ordering::SeqCst) {
            if let Some(rows) = self.collections_after_write.get(&kind) {
                return Ok(rows.clone());
            }
        }
        Ok(self.collections.get(&kind).cloned().unwrap_or_default())
    }

    async fn create_record(
        &self,
        _kind: ResourceKind,
        record: Record,
    ) -> ApiResult<serde_json::Value> {
        Ok(serde_json::Value::Object(record))
    }

    async fn write_mutation(
        &self,
        kind: ResourceKind,
        id: i64,
        action: &StatusAction,
    ) -> ApiResult<WriteOutcome> {
        self.write_calls
            .lock()
            .expect("mock lock")
            .push((kind, id, action.clone()));
        let outcome = self.write.clone().unwrap_or(WriteOutcome {
            success: true,
            message: "updated".into(),
        });
        if outcome.success {
            self.written.store(true, Ordering::SeqCst);
        }
        Ok(outcome)
    }

    async fn update_employee(&self, _update: &EmployeeUpdate) -> ApiResult<WriteOutcome> {
        Ok(WriteOutcome {
            success: true,
            message: "updated".into(),
        })
    }

    async fn login(&self, email: &str, _password: &str) -> ApiResult<LoginResponse> {
        self.login_response
            .clone()
            .ok_or_else(|| ApiError::NotFound(format!("no account: {}", email)))
    }

    async fn request_password_reset(&self, _email: &str) -> ApiResult<bool> {
        Ok(true)
    }

    async fn change_password(
        &self,
        _email: &str,
        _password: &str,
        _repeat_password: &str,
    ) -> ApiResult<WriteOutcome> {
        Ok(WriteOutcome {
            success: true,
            message: "password changed".into(),
        })
    }

    async fn fetch_file(&self, file_name: &str) -> ApiResult<Vec<u8>> {
        self.files
            .get(file_name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("no file: {}", file_name)))
    }

    async fn upload_file(&self, file_name: &str, _bytes: Vec<u8>) -> ApiResult<String> {
        Ok(file_name.to_string())
    }
}
