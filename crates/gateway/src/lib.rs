//! hrdeck gateway – HTTP integration with the remote HR API.
//!
//! Owns endpoint mapping per resource kind and the tolerant payload parsing
//! (bare array or wrapped `{key: [...]}` object). Everything else in the
//! workspace talks to the `Gateway` trait, never to HTTP directly.

#![forbid(unsafe_code)]

use std::time::Instant;

use metrics::counter;
use serde::Deserialize;
use tracing::{info, warn};

use hrdeck_api::{
    ApiError, ApiResult, EmployeeUpdate, Gateway, LoginResponse, Session, StatusAction,
    WriteOutcome,
};
use hrdeck_core::kinds::ResourceKind;
use hrdeck_core::Record;

/// Route table for one resource kind. `manager` is absent for kinds without
/// an approve/reject flow.
#[derive(Debug, Clone, Copy)]
struct Endpoints {
    list: &'static str,
    /// Per-employee listing; the placeholder is the employee id.
    by_employee: Option<&'static str>,
    manager: Option<&'static str>,
    create: &'static str,
    /// Key the API may wrap the collection array under.
    payload_key: &'static str,
}

fn endpoints_for(kind: ResourceKind) -> Endpoints {
    match kind {
        ResourceKind::Employees => Endpoints {
            list: "/Employees",
            by_employee: None,
            manager: None,
            create: "/Employees",
            payload_key: "employees",
        },
        ResourceKind::Permissions => Endpoints {
            list: "/Permission",
            by_employee: Some("/Permission/{}/byEmployee"),
            manager: Some("/permission/manager"),
            create: "/Permission",
            payload_key: "permissions",
        },
        ResourceKind::Advances => Endpoints {
            list: "/Advances",
            by_employee: Some("/Advances/{}/byEmployee"),
            manager: Some("/advances/manager"),
            create: "/Advances",
            payload_key: "advances",
        },
        ResourceKind::Expenses => Endpoints {
            list: "/Expenses",
            by_employee: Some("/Expenses/{}/byEmployee"),
            manager: Some("/expenses/manager"),
            create: "/Expenses",
            payload_key: "expenses",
        },
    }
}

/// Accept either a bare array of records or an object wrapping the array
/// under `key`. Anything else is a malformed response: the caller keeps its
/// previous collection and reports the condition.
pub fn parse_collection(payload: serde_json::Value, key: &str) -> ApiResult<Vec<Record>> {
    let items = match payload {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove(key) {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(ApiError::Malformed(format!(
                    "expected an array under '{}'",
                    key
                )))
            }
        },
        other => {
            return Err(ApiError::Malformed(format!(
                "expected a sequence, got {}",
                json_type_name(&other)
            )))
        }
    };
    items
        .into_iter()
        .map(|v| match v {
            serde_json::Value::Object(rec) => Ok(rec),
            other => Err(ApiError::Malformed(format!(
                "collection entry is {}",
                json_type_name(&other)
            ))),
        })
        .collect()
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a bool",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

#[derive(Debug, Deserialize)]
struct MessageReply {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    #[serde(alias = "fileName")]
    file_name: String,
}

/// reqwest-backed implementation of the Gateway trait.
pub struct HttpGateway {
    http: reqwest::Client,
    session: Session,
}

impl HttpGateway {
    pub fn new(session: Session) -> Self {
        HttpGateway {
            http: reqwest::Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.session.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut rb = self.http.request(method, self.url(path));
        if let Some(token) = &self.session.token {
            rb = rb.bearer_auth(token);
        }
        rb
    }

    async fn write_simple(
        &self,
        path: &str,
        body: &serde_json::Value,
        what: &'static str,
    ) -> ApiResult<WriteOutcome> {
        let t0 = Instant::now();
        let resp = self
            .request(reqwest::Method::PUT, path)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        counter!("gateway_requests_total", 1, "endpoint" => what);
        let status = resp.status();
        if status.is_success() {
            let message = resp
                .json::<MessageReply>()
                .await
                .map(|r| r.message)
                .unwrap_or_default();
            info!(what, took_ms = %t0.elapsed().as_millis(), "gateway: write ok");
            Ok(WriteOutcome {
                success: true,
                message,
            })
        } else {
            warn!(what, status = %status, took_ms = %t0.elapsed().as_millis(), "gateway: write rejected");
            Ok(WriteOutcome {
                success: false,
                message: format!("{} failed: {}", what, status),
            })
        }
    }
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn fetch_collection(
        &self,
        kind: ResourceKind,
        scope: Option<&str>,
    ) -> ApiResult<Vec<Record>> {
        let t0 = Instant::now();
        let eps = endpoints_for(kind);
        let path = match (scope, eps.by_employee) {
            (Some(emp), Some(tpl)) => tpl.replacen("{}", emp, 1),
            (Some(_), None) => {
                return Err(ApiError::Validation(format!(
                    "{} has no per-employee route",
                    kind.name()
                )))
            }
            (None, _) => eps.list.to_string(),
        };
        let resp = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;
        counter!("gateway_requests_total", 1, "endpoint" => "fetch_collection");
        let payload = resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        let records = parse_collection(payload, eps.payload_key)?;
        info!(kind = kind.name(), count = records.len(), took_ms = %t0.elapsed().as_millis(), "gateway: fetch ok");
        Ok(records)
    }

    async fn create_record(
        &self,
        kind: ResourceKind,
        record: Record,
    ) -> ApiResult<serde_json::Value> {
        let t0 = Instant::now();
        let eps = endpoints_for(kind);
        let resp = self
            .request(reqwest::Method::POST, eps.create)
            .json(&serde_json::Value::Object(record))
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;
        counter!("gateway_requests_total", 1, "endpoint" => "create_record");
        let body = resp
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);
        info!(kind = kind.name(), took_ms = %t0.elapsed().as_millis(), "gateway: create ok");
        Ok(body)
    }

    async fn write_mutation(
        &self,
        kind: ResourceKind,
        id: i64,
        action: &StatusAction,
    ) -> ApiResult<WriteOutcome> {
        let eps = endpoints_for(kind);
        let Some(path) = eps.manager else {
            return Err(ApiError::Validation(format!(
                "{} has no manager route",
                kind.name()
            )));
        };
        if let Some(reason) = &action.reason {
            info!(kind = kind.name(), id, approve = action.approve, reason = %reason, "gateway: status update");
        } else {
            info!(kind = kind.name(), id, approve = action.approve, "gateway: status update");
        }
        let body = serde_json::json!({ "id": id, "permission": action.approve });
        self.write_simple(path, &body, "write_mutation").await
    }

    async fn update_employee(&self, update: &EmployeeUpdate) -> ApiResult<WriteOutcome> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Internal(e.to_string()))?;
        self.write_simple("/employees/", &body, "update_employee")
            .await
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let t0 = Instant::now();
        // The API requires oneTimeCode mirroring the password.
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "oneTimeCode": password,
        });
        let resp = self
            .request(reqwest::Method::POST, "/account/login")
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        counter!("gateway_requests_total", 1, "endpoint" => "login");
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::BAD_REQUEST
        {
            warn!(status = %status, took_ms = %t0.elapsed().as_millis(), "gateway: login rejected");
            return Err(ApiError::Validation("invalid email or password".into()));
        }
        let resp = resp.error_for_status().map_err(transport)?;
        let out = resp
            .json::<LoginResponse>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        info!(took_ms = %t0.elapsed().as_millis(), "gateway: login ok");
        Ok(out)
    }

    async fn request_password_reset(&self, email: &str) -> ApiResult<bool> {
        let resp = self
            .request(reqwest::Method::POST, "/account/resetpassword")
            .query(&[("email", email)])
            .send()
            .await
            .map_err(transport)?;
        counter!("gateway_requests_total", 1, "endpoint" => "request_password_reset");
        Ok(resp.status().is_success())
    }

    async fn change_password(
        &self,
        email: &str,
        password: &str,
        repeat_password: &str,
    ) -> ApiResult<WriteOutcome> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "repeatPassword": repeat_password,
        });
        self.write_simple("/account", &body, "change_password").await
    }

    async fn fetch_file(&self, file_name: &str) -> ApiResult<Vec<u8>> {
        let t0 = Instant::now();
        let resp = self
            .request(reqwest::Method::GET, "/file/download")
            .query(&[("fileName", file_name)])
            .send()
            .await
            .map_err(transport)?;
        counter!("gateway_requests_total", 1, "endpoint" => "fetch_file");
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("no file: {}", file_name)));
        }
        let resp = resp.error_for_status().map_err(transport)?;
        let bytes = resp.bytes().await.map_err(transport)?;
        info!(file = file_name, bytes = bytes.len(), took_ms = %t0.elapsed().as_millis(), "gateway: download ok");
        Ok(bytes.to_vec())
    }

    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<String> {
        let t0 = Instant::now();
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .request(reqwest::Method::POST, "/File/upload")
            .multipart(form)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?;
        counter!("gateway_requests_total", 1, "endpoint" => "upload_file");
        let reply = resp
            .json::<UploadReply>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        info!(file = %reply.file_name, took_ms = %t0.elapsed().as_millis(), "gateway: upload ok");
        Ok(reply.file_name)
    }
}
