//! Validation schemas for the transaction endpoints.

use std::sync::LazyLock;

use crate::schema::{FieldRule, Schema};

pub(crate) const CURRENCIES: &[&str] = &["NGN", "USD", "GHS", "ZAR", "KES"];

pub(crate) const CHANNELS: &[&str] = &[
    "card",
    "bank",
    "ussd",
    "qr",
    "mobile_money",
    "bank_transfer",
    "eft",
];

pub(crate) const BEARERS: &[&str] = &["account", "subaccount"];

pub(crate) const STATUSES: &[&str] = &["failed", "success", "abandoned"];

fn optional_text(type_message: &'static str, min_message: &'static str) -> FieldRule {
    FieldRule::string(type_message)
        .min_len(1, min_message)
        .optional()
}

fn date_bound(
    type_message: &'static str,
    datetime_message: &'static str,
    date_message: &'static str,
) -> FieldRule {
    FieldRule::any_of(
        vec![
            FieldRule::string(type_message).datetime(datetime_message),
            FieldRule::string(type_message).date(date_message),
        ],
        type_message,
    )
    .optional()
}

/// Body of `POST /transaction/initialize`, checked after the amount has been
/// converted.
pub(crate) static INITIALIZE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field(
            "email",
            FieldRule::string("The email must be a string")
                .email("The transaction email is invalid")
                .required("The email is required"),
        )
        .field(
            "amount",
            FieldRule::number_or_numeric_string(
                "The amount must be a number or a numeric string",
                "The amount can't be converted to a number",
            )
            .required("The amount is required"),
        )
        .field(
            "currency",
            FieldRule::one_of(
                CURRENCIES,
                "The currency must be one of NGN, USD, GHS, ZAR or KES",
            )
            .optional(),
        )
        .field(
            "reference",
            optional_text(
                "The reference must be a string",
                "The reference must be at least 1 character",
            ),
        )
        .field(
            "callback_url",
            FieldRule::string("The callback_url must be a string")
                .url("The callback_url must be a valid url")
                .optional(),
        )
        .field(
            "plan",
            optional_text(
                "The plan must be a string",
                "The plan must be at least 1 character",
            ),
        )
        .field(
            "invoice_limit",
            FieldRule::number("The invoice_limit must be a number")
                .positive("The invoice_limit must be positive")
                .optional(),
        )
        .field(
            "metadata",
            optional_text(
                "The metadata must be a string",
                "The metadata must be at least 1 character",
            ),
        )
        .field(
            "channels",
            FieldRule::array(
                FieldRule::one_of(
                    CHANNELS,
                    "The channels must be any of card, bank, ussd, qr, mobile_money, bank_transfer or eft",
                ),
                "The channels must be a list",
            )
            .optional(),
        )
        .field(
            "split_code",
            optional_text(
                "The split_code must be a string",
                "The split_code must be at least 1 character",
            ),
        )
        .field(
            "subaccount",
            optional_text(
                "The subaccount must be a string",
                "The subaccount must be at least 1 character",
            ),
        )
        .field(
            "transaction_charge",
            FieldRule::number("The transaction_charge must be a number")
                .positive("The transaction_charge must be positive")
                .optional(),
        )
        .field(
            "bearer",
            FieldRule::one_of(BEARERS, "The bearer must be either 'account' or 'subaccount'")
                .optional(),
        )
});

/// Path parameters of `GET /transaction/verify/{reference}`.
pub(crate) static VERIFY: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new().field(
        "reference",
        FieldRule::string("The reference must be a string")
            .min_len(3, "The reference must be at least 3 characters")
            .required("The reference is required"),
    )
});

/// Query of `GET /transaction`.
pub(crate) static LIST: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field(
            "perPage",
            FieldRule::number("perPage query must be a number")
                .min(0.0, "The min value of perPage is 0")
                .optional(),
        )
        .field(
            "page",
            FieldRule::number("page query must be a number")
                .min(1.0, "The min value of page is 1")
                .optional(),
        )
        .field(
            "customer",
            FieldRule::number("customer id query must be a number").optional(),
        )
        .field(
            "terminalid",
            FieldRule::string("terminalid query must be a string").optional(),
        )
        .field(
            "status",
            FieldRule::one_of(
                STATUSES,
                "The transaction status query only accepts 'failed', 'success', and 'abandoned'",
            )
            .optional(),
        )
        .field(
            "amount",
            FieldRule::number("amount query must be a number").optional(),
        )
        .field(
            "from",
            date_bound(
                "from query must be a string",
                "from query must be a valid date time",
                "from query must be a valid date",
            ),
        )
        .field(
            "to",
            date_bound(
                "to query must be a string",
                "to query must be a valid date time",
                "to query must be a valid date",
            ),
        )
});

/// Path parameters of `GET /transaction/{id}`.
pub(crate) static FETCH: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new().field(
        "id",
        FieldRule::number("The id must be a number").required("The id is required"),
    )
});

/// Body of `POST /transaction/charge_authorization`: the shared initialize
/// fields plus the authorization to charge.
pub(crate) static CHARGE_AUTHORIZATION: LazyLock<Schema> = LazyLock::new(|| {
    INITIALIZE
        .pick(&[
            "amount",
            "email",
            "reference",
            "currency",
            "metadata",
            "channels",
            "subaccount",
            "transaction_charge",
            "bearer",
        ])
        .merge(
            Schema::new()
                .field(
                    "authorization_code",
                    FieldRule::string("The authorization_code must be a string")
                        .min_len(1, "The authorization_code must be at least 1 character")
                        .required("The authorization_code is required"),
                )
                .field(
                    "queue",
                    FieldRule::boolean("queue must be a boolean that is true or false")
                        .optional(),
                ),
        )
});
