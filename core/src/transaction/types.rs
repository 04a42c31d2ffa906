//! Request and response DTOs for the transaction endpoints.
//!
//! # Design
//! Request types serialize with optional fields skipped so unset values never
//! reach the wire. Response types are lenient: nullable fields are `Option`
//! and fields this crate does not model are kept in `other`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Currencies the processor settles in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "NGN")]
    Ngn,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "GHS")]
    Ghs,
    #[serde(rename = "ZAR")]
    Zar,
    #[serde(rename = "KES")]
    Kes,
}

/// Payment channels offered to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Card,
    Bank,
    Ussd,
    Qr,
    MobileMoney,
    BankTransfer,
    Eft,
}

/// Who bears the transaction charge on a split payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bearer {
    Account,
    Subaccount,
}

/// Status filter accepted by the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Failed,
    Success,
    Abandoned,
}

/// A monetary amount given either as a number or as a numeric string.
///
/// Whole numbers are kept as `Integer` so large amounts are never rounded
/// through `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Integer(u64),
    Number(f64),
    Text(String),
}

impl Amount {
    /// Render the amount as the subunit string sent on the wire.
    ///
    /// With `subunit` set the amount is read as major units, multiplied by
    /// 100 and rounded to a whole subunit. Otherwise it is rendered as given.
    /// A string that does not parse as a number is returned untouched so the
    /// validator can reject it.
    pub fn to_wire(&self, options: RequestOptions) -> String {
        match self {
            Amount::Integer(n) if options.subunit => (u128::from(*n) * 100).to_string(),
            Amount::Integer(n) => n.to_string(),
            Amount::Number(n) if options.subunit => to_subunits(*n),
            Amount::Number(n) => n.to_string(),
            Amount::Text(s) if options.subunit => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => to_subunits(n),
                _ => s.clone(),
            },
            Amount::Text(s) => s.clone(),
        }
    }
}

fn to_subunits(major: f64) -> String {
    // Adding 0.0 folds -0 into 0.
    ((major * 100.0).round() + 0.0).to_string()
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Integer(0)
    }
}

impl From<f64> for Amount {
    fn from(n: f64) -> Self {
        Amount::Number(n)
    }
}

impl From<u32> for Amount {
    fn from(n: u32) -> Self {
        Amount::Integer(u64::from(n))
    }
}

impl From<u64> for Amount {
    fn from(n: u64) -> Self {
        Amount::Integer(n)
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Amount::Text(s.to_string())
    }
}

impl From<String> for Amount {
    fn from(s: String) -> Self {
        Amount::Text(s)
    }
}

/// Per-call options for operations that carry an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// `true` (the default): the amount is in major units and is converted to
    /// subunits. `false`: the amount is already in subunits and is sent as-is.
    pub subunit: bool,
}

impl RequestOptions {
    /// Options for an amount that is already expressed in subunits.
    pub const fn already_in_subunits() -> Self {
        Self { subunit: false }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { subunit: true }
    }
}

/// Body of `POST /transaction/initialize`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitializeTransaction {
    pub email: String,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<Channel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaccount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_charge: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer: Option<Bearer>,
}

impl InitializeTransaction {
    pub fn new(email: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            email: email.into(),
            amount: amount.into(),
            ..Self::default()
        }
    }
}

/// Body of `POST /transaction/charge_authorization`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeAuthorization {
    pub email: String,
    pub amount: Amount,
    pub authorization_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<Channel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaccount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_charge: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer: Option<Bearer>,
    /// Queue the charge for later processing instead of charging immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<bool>,
}

impl ChargeAuthorization {
    pub fn new(
        email: impl Into<String>,
        amount: impl Into<Amount>,
        authorization_code: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            amount: amount.into(),
            authorization_code: authorization_code.into(),
            ..Self::default()
        }
    }
}

/// Query for `GET /transaction`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTransactionsQuery {
    #[serde(rename = "perPage", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Customer id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminalid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    /// Amount in subunits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Start of the window: a date (`2024-01-31`) or RFC 3339 date-time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Data returned by a successful initialize call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// A reusable card or bank authorization attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub authorization_code: String,
    #[serde(default)]
    pub bin: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
    #[serde(default)]
    pub exp_month: Option<String>,
    #[serde(default)]
    pub exp_year: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub reusable: bool,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub customer_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub risk_action: Option<String>,
    #[serde(default)]
    pub international_format_phone: Option<String>,
}

/// A transaction as returned by verify, fetch, list and charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: u64,
    #[serde(default)]
    pub domain: Option<String>,
    pub status: String,
    pub reference: String,
    /// Amount in subunits.
    pub amount: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub fees: Option<u64>,
    #[serde(default)]
    pub requested_amount: Option<u64>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default, deserialize_with = "empty_authorization_as_none")]
    pub authorization: Option<Authorization>,
    /// Fields not modelled above (`log`, `plan`, `split`, ...).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Transactions that never reached a payment instrument (abandoned, failed)
/// carry `"authorization": {}`; read that the same as `null`.
fn empty_authorization_as_none<'de, D>(deserializer: D) -> Result<Option<Authorization>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
