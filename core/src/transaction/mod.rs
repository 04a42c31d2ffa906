//! The Transactions API: create, verify, list, fetch and charge payments.
//!
//! Each method maps a typed input onto one `Operation` and hands it to the
//! dispatcher. Amount-carrying operations convert the amount to subunits
//! first; the schema then runs against the converted payload.

mod schemas;
pub mod types;

use serde::Serialize;
use serde_json::Value;

use crate::dispatcher::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::http::{ReqwestTransport, Transport};
use crate::response::ApiResponse;

pub use types::{
    Amount, Authorization, Bearer, ChargeAuthorization, Channel, Currency, Customer,
    InitializeTransaction, InitializedTransaction, ListTransactionsQuery, RequestOptions,
    TransactionRecord, TransactionStatus,
};

const INITIALIZE_PATH: &str = "/transaction/initialize";
const VERIFY_PATH: &str = "/transaction/verify/{reference}";
const LIST_PATH: &str = "/transaction";
const FETCH_PATH: &str = "/transaction/{id}";
const CHARGE_AUTHORIZATION_PATH: &str = "/transaction/charge_authorization";

/// Confirmation messages the API sends with a successful response. The
/// `message` field stays a plain `String` since the server owns the wording.
pub const INITIALIZE_MESSAGE: &str = "Authorization URL created";
pub const VERIFY_MESSAGE: &str = "Verification successful";
pub const LIST_MESSAGE: &str = "Transactions retrieved";
pub const FETCH_MESSAGE: &str = "Transaction retrieved";
pub const CHARGE_AUTHORIZATION_MESSAGE: &str = "Charge attempted";

/// Façade over the transaction endpoints. Obtained from
/// `Paystack::transaction`.
#[derive(Debug)]
pub struct Transactions<'a, T = ReqwestTransport> {
    dispatcher: &'a Dispatcher<T>,
}

impl<'a, T: Transport> Transactions<'a, T> {
    pub(crate) fn new(dispatcher: &'a Dispatcher<T>) -> Self {
        Self { dispatcher }
    }

    /// Initialize a transaction and obtain a checkout URL.
    pub async fn initialize(
        &self,
        input: &InitializeTransaction,
        options: RequestOptions,
    ) -> ApiResponse<InitializedTransaction> {
        let payload = match with_wire_amount(input, &input.amount, options) {
            Ok(payload) => payload,
            Err(err) => return err.into(),
        };
        self.dispatcher
            .dispatch(
                Operation::post(INITIALIZE_PATH)
                    .payload(payload)
                    .payload_schema(&schemas::INITIALIZE),
            )
            .await
    }

    /// Confirm the status of a transaction by its reference.
    pub async fn verify(&self, reference: &str) -> ApiResponse<TransactionRecord> {
        self.dispatcher
            .dispatch(
                Operation::get(VERIFY_PATH)
                    .param("reference", reference)
                    .params_schema(&schemas::VERIFY),
            )
            .await
    }

    /// List transactions, one page at a time.
    pub async fn list(&self, query: &ListTransactionsQuery) -> ApiResponse<Vec<TransactionRecord>> {
        let payload = match to_payload(query) {
            Ok(payload) => payload,
            Err(err) => return err.into(),
        };
        self.dispatcher
            .dispatch(
                Operation::get(LIST_PATH)
                    .payload(payload)
                    .payload_schema(&schemas::LIST),
            )
            .await
    }

    /// Fetch a single transaction by its numeric id.
    pub async fn fetch(&self, id: u64) -> ApiResponse<TransactionRecord> {
        self.dispatcher
            .dispatch(
                Operation::get(FETCH_PATH)
                    .param("id", id)
                    .params_schema(&schemas::FETCH),
            )
            .await
    }

    /// Charge a previously saved authorization.
    pub async fn charge_authorization(
        &self,
        input: &ChargeAuthorization,
        options: RequestOptions,
    ) -> ApiResponse<TransactionRecord> {
        let payload = match with_wire_amount(input, &input.amount, options) {
            Ok(payload) => payload,
            Err(err) => return err.into(),
        };
        self.dispatcher
            .dispatch(
                Operation::post(CHARGE_AUTHORIZATION_PATH)
                    .payload(payload)
                    .payload_schema(&schemas::CHARGE_AUTHORIZATION),
            )
            .await
    }
}

fn to_payload<S: Serialize>(input: &S) -> Result<Value, ApiError> {
    serde_json::to_value(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Serialize `input` and replace its `amount` with the subunit string.
fn with_wire_amount<S: Serialize>(
    input: &S,
    amount: &Amount,
    options: RequestOptions,
) -> Result<Value, ApiError> {
    let mut payload = to_payload(input)?;
    if let Some(object) = payload.as_object_mut() {
        object.insert("amount".to_string(), Value::String(amount.to_wire(options)));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::credential::SecretKey;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportError};

    /// Records every request and answers with a fixed body.
    struct Recorder {
        requests: Mutex<Vec<HttpRequest>>,
        body: &'static str,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: self.body.to_string(),
            })
        }
    }

    fn dispatcher(body: &'static str) -> Dispatcher<Recorder> {
        Dispatcher::new(
            SecretKey::new("sk_test_0123456789"),
            "https://api.paystack.co",
            Recorder {
                requests: Mutex::new(Vec::new()),
                body,
            },
        )
    }

    fn sent(d: &Dispatcher<Recorder>) -> Vec<HttpRequest> {
        d.transport().requests.lock().unwrap().clone()
    }

    const INITIALIZED: &str = r#"{"status":true,"message":"Authorization URL created","data":{"authorization_url":"https://checkout.paystack.com/0peioxfhpn","access_code":"0peioxfhpn","reference":"7PVGX8MEk85tgeEpVDtD"}}"#;

    const RECORD: &str = r#"{"status":true,"message":"Verification successful","data":{"id":4099260516,"status":"success","reference":"re4lyvq3s3","amount":40333}}"#;

    #[tokio::test]
    async fn initialize_multiplies_amount_by_default() {
        let d = dispatcher(INITIALIZED);
        let resp = Transactions::new(&d)
            .initialize(
                &InitializeTransaction::new("customer@email.com", 200_u32),
                RequestOptions::default(),
            )
            .await;
        assert_eq!(resp.message(), INITIALIZE_MESSAGE);
        assert_eq!(resp.data().unwrap().access_code, "0peioxfhpn");

        let requests = sent(&d);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].url, "https://api.paystack.co/transaction/initialize");
        let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "email": "customer@email.com", "amount": "20000" }));
    }

    #[tokio::test]
    async fn initialize_passes_subunits_through() {
        let d = dispatcher(INITIALIZED);
        Transactions::new(&d)
            .initialize(
                &InitializeTransaction::new("customer@email.com", 20000_u32),
                RequestOptions::already_in_subunits(),
            )
            .await;
        let body: Value = serde_json::from_str(sent(&d)[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["amount"], "20000");
    }

    #[tokio::test]
    async fn initialize_rejects_bad_email_before_sending() {
        let d = dispatcher(INITIALIZED);
        let resp = Transactions::new(&d)
            .initialize(
                &InitializeTransaction::new("not-an-email", 10_u32),
                RequestOptions::default(),
            )
            .await;
        assert_eq!(resp.message(), "validation error: The transaction email is invalid");
        assert!(sent(&d).is_empty());
    }

    #[tokio::test]
    async fn initialize_rejects_non_numeric_amount() {
        let d = dispatcher(INITIALIZED);
        let resp = Transactions::new(&d)
            .initialize(
                &InitializeTransaction::new("customer@email.com", "twenty"),
                RequestOptions::default(),
            )
            .await;
        assert_eq!(
            resp.message(),
            "validation error: The amount can't be converted to a number"
        );
        assert!(sent(&d).is_empty());
    }

    #[tokio::test]
    async fn verify_interpolates_reference() {
        let d = dispatcher(RECORD);
        let resp = Transactions::new(&d).verify("re4lyvq3s3").await;
        assert_eq!(resp.data().unwrap().amount, 40333);
        let requests = sent(&d);
        assert_eq!(requests[0].url, "https://api.paystack.co/transaction/verify/re4lyvq3s3");
        assert!(requests[0].query.is_empty());
    }

    const ABANDONED: &str = r#"{"status":true,"message":"Verification successful","data":{"id":4099260517,"domain":"test","status":"abandoned","reference":"ref123","amount":20000,"gateway_response":"The transaction was not completed","paid_at":null,"channel":"card","currency":"NGN","authorization":{},"customer":{"id":181873746,"email":"demo@test.com"}}}"#;

    #[tokio::test]
    async fn verify_returns_abandoned_transaction() {
        let d = dispatcher(ABANDONED);
        let resp = Transactions::new(&d).verify("ref123").await;
        assert!(resp.status(), "got {resp:?}");
        assert_eq!(resp.message(), VERIFY_MESSAGE);
        let record = resp.into_data().unwrap();
        assert_eq!(record.status, "abandoned");
        assert!(record.authorization.is_none());
    }

    #[tokio::test]
    async fn list_keeps_page_with_abandoned_record() {
        let d = dispatcher(
            r#"{"status":true,"message":"Transactions retrieved","data":[
                {"id":2,"status":"success","reference":"ref-paid","amount":5000,"authorization":{"authorization_code":"AUTH_72btv547","reusable":true}},
                {"id":1,"status":"abandoned","reference":"ref-open","amount":20000,"authorization":{}}
            ],"meta":{"total":2,"skipped":0,"perPage":50,"page":1,"pageCount":1}}"#,
        );
        let resp = Transactions::new(&d)
            .list(&ListTransactionsQuery::default())
            .await;
        assert_eq!(resp.message(), LIST_MESSAGE);
        assert_eq!(resp.meta().unwrap().total, 2);
        let records = resp.into_data().unwrap();
        assert_eq!(
            records[0].authorization.as_ref().unwrap().authorization_code,
            "AUTH_72btv547"
        );
        assert!(records[1].authorization.is_none());
    }

    #[tokio::test]
    async fn verify_rejects_short_reference() {
        let d = dispatcher(RECORD);
        let resp = Transactions::new(&d).verify("ab").await;
        assert_eq!(
            resp,
            ApiResponse::failure("validation error: The reference must be at least 3 characters")
        );
        assert!(sent(&d).is_empty());
    }

    #[tokio::test]
    async fn list_sends_only_set_fields() {
        let d = dispatcher(
            r#"{"status":true,"message":"Transactions retrieved","data":[],"meta":{"total":0,"skipped":0,"perPage":5,"page":1,"pageCount":0}}"#,
        );
        let query = ListTransactionsQuery {
            per_page: Some(5),
            status: Some(TransactionStatus::Failed),
            ..ListTransactionsQuery::default()
        };
        let resp = Transactions::new(&d).list(&query).await;
        assert!(matches!(resp, ApiResponse::ListSuccess { ref data, .. } if data.is_empty()));

        let requests = sent(&d);
        assert_eq!(requests[0].url, "https://api.paystack.co/transaction");
        assert_eq!(
            requests[0].query,
            vec![
                ("perPage".to_string(), "5".to_string()),
                ("status".to_string(), "failed".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn list_rejects_bad_date_before_sending() {
        let d = dispatcher(RECORD);
        let query = ListTransactionsQuery {
            from: Some("31/01/2024".to_string()),
            ..ListTransactionsQuery::default()
        };
        let resp = Transactions::new(&d).list(&query).await;
        assert_eq!(resp.message(), "validation error: from query must be a valid date time");
        assert!(sent(&d).is_empty());
    }

    #[tokio::test]
    async fn fetch_interpolates_id() {
        let d = dispatcher(RECORD);
        let resp = Transactions::new(&d).fetch(4099260516).await;
        assert!(resp.status());
        assert_eq!(sent(&d)[0].url, "https://api.paystack.co/transaction/4099260516");
    }

    #[tokio::test]
    async fn charge_authorization_converts_amount() {
        let d = dispatcher(RECORD);
        let input = ChargeAuthorization {
            queue: Some(false),
            ..ChargeAuthorization::new("customer@email.com", 75.25, "AUTH_72btv547")
        };
        let resp = Transactions::new(&d)
            .charge_authorization(&input, RequestOptions::default())
            .await;
        assert!(resp.status());

        let requests = sent(&d);
        assert_eq!(
            requests[0].url,
            "https://api.paystack.co/transaction/charge_authorization"
        );
        let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "email": "customer@email.com",
                "amount": "7525",
                "authorization_code": "AUTH_72btv547",
                "queue": false
            })
        );
    }

    #[tokio::test]
    async fn charge_authorization_requires_code() {
        let d = dispatcher(RECORD);
        let input = ChargeAuthorization::new("customer@email.com", 10_u32, "");
        let resp = Transactions::new(&d)
            .charge_authorization(&input, RequestOptions::default())
            .await;
        assert_eq!(
            resp.message(),
            "validation error: The authorization_code must be at least 1 character"
        );
        assert!(sent(&d).is_empty());
    }
}
