//! Root client.
//!
//! # Design
//! `Paystack` owns exactly one `Dispatcher` and hands out borrowed resource
//! façades. It carries no mutable state: the secret key and base URL are
//! fixed at construction and shared read-only by concurrent calls.

use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ConfigError;
use crate::http::{ReqwestTransport, Transport};
use crate::transaction::Transactions;

/// Entry point to the API.
///
/// ```no_run
/// use paystack_core::{InitializeTransaction, Paystack, RequestOptions};
///
/// # async fn run() {
/// let paystack = Paystack::new("sk_test_xxxxxxxxxxxxxxxx");
/// let response = paystack
///     .transaction()
///     .initialize(
///         &InitializeTransaction::new("customer@email.com", 200_u32),
///         RequestOptions::default(),
///     )
///     .await;
/// match response.into_data() {
///     Ok(init) => println!("pay at {}", init.authorization_url),
///     Err(message) => eprintln!("failed: {message}"),
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Paystack<T = ReqwestTransport> {
    dispatcher: Dispatcher<T>,
}

impl Paystack {
    /// A client for the production API using the default transport.
    pub fn new(secret_key: &str) -> Self {
        Self::from_config(ClientConfig::new(secret_key))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    /// Configure from `PAYSTACK_SECRET_KEY` / `PAYSTACK_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        ClientConfig::from_env().map(Self::from_config)
    }
}

impl<T: Transport> Paystack<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::new(config.secret_key, &config.base_url, transport),
        }
    }

    pub fn transaction(&self) -> Transactions<'_, T> {
        Transactions::new(&self.dispatcher)
    }

    /// The underlying dispatcher, for operations without a typed façade.
    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_targets_production() {
        let client = Paystack::new("sk_test_0123456789");
        assert_eq!(client.dispatcher().base_url(), "https://api.paystack.co");
    }

    #[test]
    fn clients_are_independent() {
        let live = Paystack::new("sk_live_0123456789");
        let local = Paystack::from_config(
            ClientConfig::new("sk_test_9876543210")
                .with_base_url("http://127.0.0.1:4010/")
                .unwrap(),
        );
        assert_eq!(live.dispatcher().base_url(), "https://api.paystack.co");
        assert_eq!(local.dispatcher().base_url(), "http://127.0.0.1:4010");

        let req = live
            .dispatcher()
            .prepare(crate::Operation::get("/transaction"))
            .unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer sk_live_0123456789"));
        let req = local
            .dispatcher()
            .prepare(crate::Operation::get("/transaction"))
            .unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer sk_test_9876543210"));
    }
}
