//! Declarative validation rules for request payloads.
//!
//! # Design
//! A `Schema` is an ordered list of named `FieldRule`s applied to a JSON
//! object. Rules are plain data, built once (usually in a `LazyLock`) and
//! shared by every call. Validation never mutates the input and collects
//! every violated rule rather than stopping at the first one.
//!
//! `null` is treated the same as an absent field. Unions (`any_of`,
//! `number_or_numeric_string`) pass if any branch passes. When none does,
//! the violations of the first branch whose primitive type matched are
//! reported, so a malformed date string yields the date message rather than a
//! generic type error.

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

const DEFAULT_REQUIRED_MESSAGE: &str = "Required";

/// Every rule a payload broke, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<String>> for Violations {
    fn from(messages: Vec<String>) -> Self {
        Self(messages)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

#[derive(Debug, Clone)]
enum Presence {
    Optional,
    Required(&'static str),
}

#[derive(Debug, Clone)]
enum StringCheck {
    MinLen(usize, &'static str),
    Email(&'static str),
    Url(&'static str),
    DateTime(&'static str),
    Date(&'static str),
}

#[derive(Debug, Clone)]
enum NumberCheck {
    Min(f64, &'static str),
    Positive(&'static str),
}

#[derive(Debug, Clone)]
enum Kind {
    String {
        type_message: &'static str,
        checks: Vec<StringCheck>,
    },
    Number {
        type_message: &'static str,
        checks: Vec<NumberCheck>,
    },
    Boolean {
        type_message: &'static str,
    },
    OneOf {
        values: &'static [&'static str],
        message: &'static str,
    },
    Array {
        item: Box<Kind>,
        type_message: &'static str,
    },
    NumberOrNumericString {
        type_message: &'static str,
        parse_message: &'static str,
    },
    AnyOf {
        variants: Vec<Kind>,
        type_message: &'static str,
    },
}

enum Outcome {
    Valid,
    WrongType(&'static str),
    Invalid(Vec<String>),
}

/// The rule for a single field. Fields are required unless `optional()` is
/// called.
#[derive(Debug, Clone)]
pub struct FieldRule {
    kind: Kind,
    presence: Presence,
}

impl FieldRule {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            presence: Presence::Required(DEFAULT_REQUIRED_MESSAGE),
        }
    }

    pub fn string(type_message: &'static str) -> Self {
        Self::of(Kind::String {
            type_message,
            checks: Vec::new(),
        })
    }

    pub fn number(type_message: &'static str) -> Self {
        Self::of(Kind::Number {
            type_message,
            checks: Vec::new(),
        })
    }

    pub fn boolean(type_message: &'static str) -> Self {
        Self::of(Kind::Boolean { type_message })
    }

    /// A string restricted to `values`. `message` is reported for any other
    /// value, including non-strings.
    pub fn one_of(values: &'static [&'static str], message: &'static str) -> Self {
        Self::of(Kind::OneOf { values, message })
    }

    /// An array whose every element satisfies `item`.
    pub fn array(item: FieldRule, type_message: &'static str) -> Self {
        Self::of(Kind::Array {
            item: Box::new(item.kind),
            type_message,
        })
    }

    /// A number, or a string that parses to a finite number. The value is
    /// accepted as-is; strings are not converted.
    pub fn number_or_numeric_string(
        type_message: &'static str,
        parse_message: &'static str,
    ) -> Self {
        Self::of(Kind::NumberOrNumericString {
            type_message,
            parse_message,
        })
    }

    pub fn any_of(variants: Vec<FieldRule>, type_message: &'static str) -> Self {
        Self::of(Kind::AnyOf {
            variants: variants.into_iter().map(|v| v.kind).collect(),
            type_message,
        })
    }

    pub fn min_len(self, len: usize, message: &'static str) -> Self {
        self.string_check(StringCheck::MinLen(len, message))
    }

    pub fn email(self, message: &'static str) -> Self {
        self.string_check(StringCheck::Email(message))
    }

    pub fn url(self, message: &'static str) -> Self {
        self.string_check(StringCheck::Url(message))
    }

    /// RFC 3339 date-time, e.g. `2024-01-31T10:00:00Z`.
    pub fn datetime(self, message: &'static str) -> Self {
        self.string_check(StringCheck::DateTime(message))
    }

    /// Calendar date, e.g. `2024-01-31`.
    pub fn date(self, message: &'static str) -> Self {
        self.string_check(StringCheck::Date(message))
    }

    pub fn min(self, min: f64, message: &'static str) -> Self {
        self.number_check(NumberCheck::Min(min, message))
    }

    pub fn positive(self, message: &'static str) -> Self {
        self.number_check(NumberCheck::Positive(message))
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Mark the field required, reporting `message` when it is absent.
    pub fn required(mut self, message: &'static str) -> Self {
        self.presence = Presence::Required(message);
        self
    }

    fn string_check(mut self, check: StringCheck) -> Self {
        match &mut self.kind {
            Kind::String { checks, .. } => checks.push(check),
            other => debug_assert!(false, "string refinement applied to {other:?}"),
        }
        self
    }

    fn number_check(mut self, check: NumberCheck) -> Self {
        match &mut self.kind {
            Kind::Number { checks, .. } => checks.push(check),
            other => debug_assert!(false, "number refinement applied to {other:?}"),
        }
        self
    }
}

/// An object schema: named fields checked in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(&'static str, FieldRule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rule: FieldRule) -> Self {
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, rule));
        self
    }

    /// A new schema holding only the named fields, in this schema's order.
    pub fn pick(&self, names: &[&str]) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| names.contains(name))
                .cloned()
                .collect(),
        }
    }

    /// Append `other`'s fields. A field present in both takes `other`'s rule.
    pub fn merge(self, other: Schema) -> Self {
        other
            .fields
            .into_iter()
            .fold(self, |schema, (name, rule)| schema.field(name, rule))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn validate(&self, value: &Value) -> Result<(), Violations> {
        let Some(object) = value.as_object() else {
            return Err(Violations(vec!["Expected an object".to_string()]));
        };

        let mut violations = Vec::new();
        for (name, rule) in &self.fields {
            match object.get(*name).filter(|v| !v.is_null()) {
                None => {
                    if let Presence::Required(message) = rule.presence {
                        violations.push(message.to_string());
                    }
                }
                Some(v) => match check(&rule.kind, v) {
                    Outcome::Valid => {}
                    Outcome::WrongType(message) => violations.push(message.to_string()),
                    Outcome::Invalid(messages) => violations.extend(messages),
                },
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Violations(violations))
        }
    }

    /// Validate and hand the input back untouched.
    pub fn parse(&self, value: Value) -> Result<Value, Violations> {
        self.validate(&value)?;
        Ok(value)
    }
}

fn check(kind: &Kind, value: &Value) -> Outcome {
    match kind {
        Kind::String {
            type_message,
            checks,
        } => match value.as_str() {
            Some(s) => collect(checks.iter().filter_map(|c| check_string(c, s))),
            None => Outcome::WrongType(*type_message),
        },
        Kind::Number {
            type_message,
            checks,
        } => match value.as_f64().filter(|n| n.is_finite()) {
            Some(n) => collect(checks.iter().filter_map(|c| check_number(c, n))),
            None => Outcome::WrongType(*type_message),
        },
        Kind::Boolean { type_message } => {
            if value.is_boolean() {
                Outcome::Valid
            } else {
                Outcome::WrongType(*type_message)
            }
        }
        Kind::OneOf { values, message } => match value.as_str() {
            Some(s) if values.contains(&s) => Outcome::Valid,
            Some(_) => Outcome::Invalid(vec![message.to_string()]),
            None => Outcome::WrongType(*message),
        },
        Kind::Array { item, type_message } => match value.as_array() {
            Some(items) => {
                let mut messages = Vec::new();
                for element in items {
                    match check(item, element) {
                        Outcome::Valid => {}
                        Outcome::WrongType(m) => messages.push(m.to_string()),
                        Outcome::Invalid(ms) => messages.extend(ms),
                    }
                }
                messages.dedup();
                if messages.is_empty() {
                    Outcome::Valid
                } else {
                    Outcome::Invalid(messages)
                }
            }
            None => Outcome::WrongType(*type_message),
        },
        Kind::NumberOrNumericString {
            type_message,
            parse_message,
        } => match value {
            Value::Number(_) => Outcome::Valid,
            Value::String(s) if is_numeric(s) => Outcome::Valid,
            Value::String(_) => Outcome::Invalid(vec![parse_message.to_string()]),
            _ => Outcome::WrongType(*type_message),
        },
        Kind::AnyOf {
            variants,
            type_message,
        } => {
            let mut first_invalid = None;
            for variant in variants {
                match check(variant, value) {
                    Outcome::Valid => return Outcome::Valid,
                    Outcome::Invalid(messages) => {
                        first_invalid.get_or_insert(messages);
                    }
                    Outcome::WrongType(_) => {}
                }
            }
            match first_invalid {
                Some(messages) => Outcome::Invalid(messages),
                None => Outcome::WrongType(*type_message),
            }
        }
    }
}

fn collect<'a>(failures: impl Iterator<Item = &'a str>) -> Outcome {
    let messages: Vec<String> = failures.map(str::to_string).collect();
    if messages.is_empty() {
        Outcome::Valid
    } else {
        Outcome::Invalid(messages)
    }
}

fn check_string(check: &StringCheck, s: &str) -> Option<&'static str> {
    let (ok, message) = match check {
        StringCheck::MinLen(len, message) => (s.chars().count() >= *len, *message),
        StringCheck::Email(message) => (is_email(s), *message),
        StringCheck::Url(message) => (url::Url::parse(s).is_ok(), *message),
        StringCheck::DateTime(message) => (DateTime::parse_from_rfc3339(s).is_ok(), *message),
        StringCheck::Date(message) => (NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(), *message),
    };
    (!ok).then_some(message)
}

fn check_number(check: &NumberCheck, n: f64) -> Option<&'static str> {
    match check {
        NumberCheck::Min(min, message) => (n < *min).then_some(*message),
        NumberCheck::Positive(message) => (n <= 0.0).then_some(*message),
    }
}

/// True when `s` parses to a finite number. Surrounding whitespace is allowed.
pub(crate) fn is_numeric(s: &str) -> bool {
    s.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
