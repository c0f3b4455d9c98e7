//! User identity and profile preferences.

use std::{fmt, str::FromStr};

use api_types::record::Record;
use serde::{Deserialize, Serialize};

use crate::{ClientError, config::UserFields, fields::FieldDataExt};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned record id.
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub currency: Option<String>,
    pub theme: Option<Theme>,
    pub expense_limit: Option<ExpenseLimit>,
    /// `None` means budgets follow the calendar month.
    pub pay_day: Option<PayDay>,
}

impl User {
    pub(crate) fn from_record(record: &Record, fields: &UserFields) -> Self {
        let data = &record.field_data;
        let expense_limit = match (
            data.mapped_text(fields.expense_limit_type.as_deref()),
            data.mapped_number(fields.expense_limit_value.as_deref()),
            data.mapped_text(fields.expense_limit_period.as_deref()),
        ) {
            (Some(kind), Some(value), Some(period)) => {
                ExpenseLimit::new(kind.parse().ok(), value, period.parse().ok())
            }
            _ => None,
        };

        Self {
            user_id: record.record_id.clone(),
            first_name: data.text(&fields.first_name).unwrap_or_default(),
            last_name: data.text(&fields.last_name).unwrap_or_default(),
            email: data.text(&fields.email).unwrap_or_default(),
            currency: data.mapped_text(fields.currency.as_deref()),
            theme: data
                .mapped_text(fields.theme.as_deref())
                .and_then(|theme| theme.parse().ok()),
            expense_limit,
            pay_day: data
                .mapped_number(fields.pay_day.as_deref())
                .and_then(|day| PayDay::new(day as u8).ok().filter(|_| day.fract() == 0.0)),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Input of sign-up.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if self.first_name.trim().is_empty() {
            return Err(ClientError::Validation("first name is required".to_string()));
        }
        if !self.email.contains('@') {
            return Err(ClientError::Validation(format!(
                "'{}' is not an email address",
                self.email
            )));
        }
        validate_password(&self.password)
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), ClientError> {
    if password.is_empty() {
        return Err(ClientError::Validation("password must not be empty".to_string()));
    }
    Ok(())
}

/// Emails are compared trimmed and lowercased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Upper-cases and checks an ISO 4217 style code.
pub(crate) fn normalize_currency(code: &str) -> Result<String, ClientError> {
    let code = code.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ClientError::Validation(format!(
            "'{code}' is not a three-letter currency code"
        )));
    }
    Ok(code)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ClientError::Validation(format!("unknown theme: {other}"))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    Percentage,
    Amount,
}

impl LimitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Amount => "amount",
        }
    }
}

impl FromStr for LimitKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percentage" => Ok(Self::Percentage),
            "amount" => Ok(Self::Amount),
            other => Err(ClientError::Validation(format!("unknown limit type: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPeriod {
    Week,
    Month,
    Year,
}

impl LimitPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl FromStr for LimitPeriod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(ClientError::Validation(format!("unknown limit period: {other}"))),
        }
    }
}

/// Spending ceiling, either a share of income or a fixed amount per period.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLimit {
    pub kind: LimitKind,
    pub value: f64,
    pub period: LimitPeriod,
}

impl ExpenseLimit {
    fn new(kind: Option<LimitKind>, value: f64, period: Option<LimitPeriod>) -> Option<Self> {
        let limit = Self {
            kind: kind?,
            value,
            period: period?,
        };
        limit.validate().ok().map(|()| limit)
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(ClientError::Validation(
                "expense limit must be a non-negative number".to_string(),
            ));
        }
        if self.kind == LimitKind::Percentage && self.value > 100.0 {
            return Err(ClientError::Validation(
                "percentage limit must not exceed 100".to_string(),
            ));
        }
        Ok(())
    }
}

/// Day of the month salaries arrive on (1-28, valid in every month).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PayDay(u8);

impl PayDay {
    pub const MAX: u8 = 28;

    pub fn new(day: u8) -> Result<Self, ClientError> {
        if !(1..=Self::MAX).contains(&day) {
            return Err(ClientError::Validation(format!(
                "pay day must be between 1 and {}, got {day}",
                Self::MAX
            )));
        }
        Ok(Self(day))
    }

    pub fn day(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PayDay {
    type Error = ClientError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PayDay> for u8 {
    fn from(value: PayDay) -> Self {
        value.0
    }
}
