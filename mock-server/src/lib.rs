//! In-memory stand-in for the Paystack transactions API.
//!
//! Serves the same paths, envelopes and bearer-token check as the real API so
//! client tests can run end to end without network access. State lives in a
//! single `RwLock` and is lost when the server stops.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: u64 = 50;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    pub email: String,
    pub customer_code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Authorization {
    pub authorization_code: String,
    pub channel: String,
    pub reusable: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct Transaction {
    pub id: u64,
    pub domain: String,
    pub status: String,
    pub reference: String,
    pub amount: u64,
    pub currency: String,
    pub gateway_response: String,
    pub created_at: String,
    pub paid_at: Option<String>,
    pub channel: Option<String>,
    pub customer: Customer,
    #[serde(serialize_with = "authorization_or_empty")]
    pub authorization: Option<Authorization>,
    #[serde(skip)]
    pub access_code: String,
}

/// Unpaid transactions carry `"authorization": {}` rather than `null`.
fn authorization_or_empty<S: Serializer>(
    authorization: &Option<Authorization>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match authorization {
        Some(authorization) => authorization.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

#[derive(Default)]
struct Store {
    next_id: u64,
    transactions: Vec<Transaction>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn customer_for(&mut self, email: &str) -> Customer {
        if let Some(t) = self.transactions.iter().find(|t| t.customer.email == email) {
            return t.customer.clone();
        }
        let id = 180_000_000 + self.transactions.len() as u64 + 1;
        Customer {
            id,
            email: email.to_string(),
            customer_code: format!("CUS_{}", &Uuid::new_v4().simple().to_string()[..12]),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    secret_key: Arc<str>,
    store: Arc<RwLock<Store>>,
}

type Failure = (StatusCode, Json<Value>);
type ApiResult = Result<Json<Value>, Failure>;

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "status": false, "message": message })))
}

fn success(message: &str, data: impl Serialize) -> Json<Value> {
    Json(json!({ "status": true, "message": message, "data": data }))
}

/// Build the router. Requests must carry `Authorization: Bearer <secret_key>`.
pub fn app(secret_key: &str) -> Router {
    let state = AppState {
        secret_key: Arc::from(secret_key),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/transaction", get(list_transactions))
        .route("/transaction/initialize", post(initialize))
        .route("/transaction/verify/{reference}", get(verify))
        .route("/transaction/charge_authorization", post(charge_authorization))
        .route("/transaction/{id}", get(fetch))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn run(listener: TcpListener, secret_key: &str) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app(secret_key)).await
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.secret_key);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        debug!(path = %request.uri().path(), "rejected request with bad key");
        return failure(StatusCode::UNAUTHORIZED, "Invalid key").into_response();
    }
    next.run(request).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn required_str<'a>(body: &'a Value, field: &str, message: &str) -> Result<&'a str, Failure> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, message))
}

/// Amounts arrive as subunit strings; anything but a whole number is refused.
fn parse_amount(body: &Value) -> Result<u64, Failure> {
    let invalid = || failure(StatusCode::BAD_REQUEST, "Invalid Amount Sent");
    match body.get("amount") {
        Some(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| invalid()),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn currency(body: &Value) -> String {
    body.get("currency")
        .and_then(Value::as_str)
        .unwrap_or("NGN")
        .to_string()
}

async fn initialize(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    let email = required_str(&body, "email", "Email is required")?;
    let amount = parse_amount(&body)?;

    let mut store = state.store.write().await;
    let reference = match body.get("reference").and_then(Value::as_str) {
        Some(r) => r.to_string(),
        None => Uuid::new_v4().simple().to_string()[..10].to_string(),
    };
    if store.transactions.iter().any(|t| t.reference == reference) {
        return Err(failure(StatusCode::BAD_REQUEST, "Duplicate Transaction Reference"));
    }

    let access_code = Uuid::new_v4().simple().to_string()[..10].to_string();
    let transaction = Transaction {
        id: store.next_id(),
        domain: "test".to_string(),
        status: "abandoned".to_string(),
        reference: reference.clone(),
        amount,
        currency: currency(&body),
        gateway_response: "The transaction was not completed".to_string(),
        created_at: now(),
        paid_at: None,
        channel: None,
        customer: store.customer_for(email),
        authorization: None,
        access_code: access_code.clone(),
    };
    store.transactions.push(transaction);

    Ok(success(
        "Authorization URL created",
        json!({
            "authorization_url": format!("https://checkout.paystack.com/{access_code}"),
            "access_code": access_code,
            "reference": reference,
        }),
    ))
}

async fn charge_authorization(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult {
    let email = required_str(&body, "email", "Email is required")?;
    let code = required_str(&body, "authorization_code", "Authorization code is required")?;
    let amount = parse_amount(&body)?;
    if !code.starts_with("AUTH_") {
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid authorization code"));
    }

    let mut store = state.store.write().await;
    let reference = body
        .get("reference")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string()[..10].to_string());
    let queued = body.get("queue").and_then(Value::as_bool).unwrap_or(false);
    let transaction = Transaction {
        id: store.next_id(),
        domain: "test".to_string(),
        status: if queued { "pending" } else { "success" }.to_string(),
        reference,
        amount,
        currency: currency(&body),
        gateway_response: if queued { "Pending" } else { "Approved" }.to_string(),
        created_at: now(),
        paid_at: (!queued).then(now),
        channel: Some("card".to_string()),
        customer: store.customer_for(email),
        authorization: Some(Authorization {
            authorization_code: code.to_string(),
            channel: "card".to_string(),
            reusable: true,
        }),
        access_code: String::new(),
    };
    store.transactions.push(transaction.clone());

    Ok(success("Charge attempted", transaction))
}

async fn verify(State(state): State<AppState>, Path(reference): Path<String>) -> ApiResult {
    let store = state.store.read().await;
    store
        .transactions
        .iter()
        .find(|t| t.reference == reference)
        .map(|t| success("Verification successful", t))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Transaction reference not found"))
}

async fn fetch(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let store = state.store.read().await;
    store
        .transactions
        .iter()
        .find(|t| t.id == id)
        .map(|t| success("Transaction retrieved", t))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Transaction not found"))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "perPage")]
    pub per_page: Option<u64>,
    pub page: Option<u64>,
    pub status: Option<String>,
    pub customer: Option<u64>,
    pub amount: Option<u64>,
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    let store = state.store.read().await;
    let matching: Vec<&Transaction> = store
        .transactions
        .iter()
        .rev()
        .filter(|t| params.status.as_deref().map_or(true, |s| t.status == s))
        .filter(|t| params.customer.map_or(true, |c| t.customer.id == c))
        .filter(|t| params.amount.map_or(true, |a| t.amount == a))
        .collect();

    let per_page = params.per_page.filter(|p| *p > 0).unwrap_or(DEFAULT_PER_PAGE);
    let page = params.page.filter(|p| *p > 0).unwrap_or(1);
    let total = matching.len() as u64;
    let skipped = (page - 1).saturating_mul(per_page);
    let data: Vec<&Transaction> = matching
        .into_iter()
        .skip(usize::try_from(skipped).unwrap_or(usize::MAX))
        .take(usize::try_from(per_page).unwrap_or(usize::MAX))
        .collect();

    Ok(Json(json!({
        "status": true,
        "message": "Transactions retrieved",
        "data": data,
        "meta": {
            "total": total,
            "skipped": skipped,
            "perPage": per_page,
            "page": page,
            "pageCount": total.div_ceil(per_page),
        }
    })))
}
