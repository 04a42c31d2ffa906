//! Validated request dispatch.
//!
//! # Design
//! `Dispatcher` is the single choke point for outbound calls. It owns the
//! secret key, the base URL and the transport; nothing else in the crate
//! knows either. Each call runs four steps:
//!
//! 1. check the secret key,
//! 2. validate path parameters and payload against the attached schemas,
//! 3. build one `HttpRequest` and hand it to the transport,
//! 4. fold the response (or any error) into an `ApiResponse`.
//!
//! Steps 1 and 2 short-circuit without touching the transport. No step
//! retries. `dispatch` never returns `Err`; every path ends in an
//! `ApiResponse`.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::credential::SecretKey;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::response::{decode_envelope, decode_error_message, ApiResponse};
use crate::schema::{Schema, Violations};

/// Description of one API call, built fresh by a resource method.
///
/// `path` may contain `{name}` placeholders filled from `params`. The payload
/// becomes the query string for GET and the JSON body for POST.
#[derive(Debug, Clone)]
pub struct Operation {
    method: HttpMethod,
    path: String,
    params: Map<String, Value>,
    params_schema: Option<&'static Schema>,
    payload: Option<Value>,
    payload_schema: Option<&'static Schema>,
}

impl Operation {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Map::new(),
            params_schema: None,
            payload: None,
            payload_schema: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Supply the value for a `{name}` placeholder in the path.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn params_schema(mut self, schema: &'static Schema) -> Self {
        self.params_schema = Some(schema);
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn payload_schema(mut self, schema: &'static Schema) -> Self {
        self.payload_schema = Some(schema);
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Sends validated, authenticated requests through a `Transport`.
#[derive(Debug, Clone)]
pub struct Dispatcher<T = ReqwestTransport> {
    secret_key: SecretKey,
    base_url: String,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(secret_key: SecretKey, base_url: &str, transport: T) -> Self {
        Self {
            secret_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one operation end to end.
    #[instrument(skip(self, operation), fields(method = %operation.method, path = %operation.path))]
    pub async fn dispatch<D: DeserializeOwned>(&self, operation: Operation) -> ApiResponse<D> {
        match self.try_dispatch(operation).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "request did not succeed");
                err.into()
            }
        }
    }

    async fn try_dispatch<D: DeserializeOwned>(
        &self,
        operation: Operation,
    ) -> Result<ApiResponse<D>, ApiError> {
        let request = self.prepare(operation)?;
        debug!(url = %request.url, query_len = request.query.len(), "sending request");
        let response = self.transport.send(request).await?;
        debug!(status = response.status, "received response");
        normalize(response)
    }

    /// Check credentials, validate, and build the `HttpRequest` for
    /// `operation` without sending it.
    pub fn prepare(&self, operation: Operation) -> Result<HttpRequest, ApiError> {
        self.secret_key.validate()?;

        let Operation {
            method,
            path,
            params,
            params_schema,
            payload,
            payload_schema,
        } = operation;

        let mut violations = Vec::new();
        let params = Value::Object(params);
        if let Some(schema) = params_schema {
            if let Err(v) = schema.validate(&params) {
                violations.extend_from_slice(v.messages());
            }
        }
        if let (Some(payload), Some(schema)) = (&payload, payload_schema) {
            if let Err(v) = schema.validate(payload) {
                violations.extend_from_slice(v.messages());
            }
        }
        if !violations.is_empty() {
            return Err(ApiError::Validation(Violations::from(violations)));
        }

        let path = match &params {
            Value::Object(map) => render_path(&path, map)?,
            _ => path,
        };

        let (query, body) = match method {
            HttpMethod::Get => (payload.as_ref().map(query_pairs).unwrap_or_default(), None),
            HttpMethod::Post => {
                let body = payload
                    .map(|p| serde_json::to_string(&p))
                    .transpose()
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                (Vec::new(), body)
            }
        };

        Ok(HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            query,
            headers: vec![
                ("Authorization".to_string(), self.secret_key.bearer()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
        })
    }
}

/// Map a transport response onto `ApiResponse` or the matching `ApiError`.
fn normalize<D: DeserializeOwned>(response: HttpResponse) -> Result<ApiResponse<D>, ApiError> {
    if response.is_success() {
        return decode_envelope(&response.body);
    }
    match decode_error_message(&response.body) {
        Some(message) => Err(ApiError::Remote(message)),
        None => Err(ApiError::Deserialization(format!(
            "HTTP {} without an error message",
            response.status
        ))),
    }
}

/// Replace each `{name}` in `template` with the percent-encoded parameter.
fn render_path(template: &str, params: &Map<String, Value>) -> Result<String, ApiError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        out.push_str(&rest[..open]);
        let name = &rest[open + 1..close];
        let value = params
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ApiError::MissingPathParam(name.to_string()))?;
        out.push_str(&urlencoding::encode(&scalar_to_string(value)));
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Flatten a JSON object into query pairs. `null` fields are omitted and
/// arrays repeat the key once per element.
fn query_pairs(payload: &Value) -> Vec<(String, String)> {
    let Some(object) = payload.as_object() else {
        return Vec::new();
    };
    let mut pairs = Vec::with_capacity(object.len());
    for (key, value) in object {
        match value {
            Value::Null => {}
            Value::Array(items) => pairs.extend(
                items
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| (key.clone(), scalar_to_string(v))),
            ),
            other => pairs.push((key.clone(), scalar_to_string(other))),
        }
    }
    pairs
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
