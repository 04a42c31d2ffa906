//! Async client for the Paystack transactions API.
//!
//! # Overview
//! `Paystack` is constructed from a secret key and exposes one façade per
//! resource (`transaction()`). Every call goes through a single `Dispatcher`
//! that checks the key, validates the outgoing payload against a declarative
//! `Schema`, sends exactly one request with bearer authentication, and folds
//! every outcome into an `ApiResponse`.
//!
//! # Design
//! - Calls never return `Err` or panic on remote input. Callers match on
//!   `ApiResponse::{Success, ListSuccess, Failure}`.
//! - Credential and validation failures are detected before any I/O.
//! - The dispatcher builds plain-data `HttpRequest`s and delegates I/O to a
//!   `Transport` (reqwest by default), so tests can substitute a recorder.
//! - No retries, no caching, no shared mutable state.

pub mod client;
pub mod config;
pub mod credential;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod response;
pub mod schema;
pub mod transaction;

pub use client::Paystack;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use credential::{SecretKey, MIN_SECRET_KEY_LEN};
pub use dispatcher::{Dispatcher, Operation};
pub use error::{ApiError, ConfigError, UNEXPECTED_ERROR_MESSAGE};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use response::{ApiResponse, PaginationMeta};
pub use schema::{FieldRule, Schema, Violations};
pub use transaction::{
    Amount, Bearer, ChargeAuthorization, Channel, Currency, InitializeTransaction,
    InitializedTransaction, ListTransactionsQuery, RequestOptions, TransactionRecord,
    TransactionStatus, Transactions, CHARGE_AUTHORIZATION_MESSAGE, FETCH_MESSAGE,
    INITIALIZE_MESSAGE, LIST_MESSAGE, VERIFY_MESSAGE,
};
