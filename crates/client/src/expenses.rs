//! Income and expense transactions.

use std::{cmp::Reverse, fmt, str::FromStr};

use api_types::{FieldData, record::Record};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Amount, ClientError,
    config::ExpenseFields,
    dates::{format_date, parse_date, parse_timestamp},
    fields::FieldDataExt,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseKind {
    Income,
    #[default]
    Expense,
}

impl ExpenseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for ExpenseKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(ClientError::Validation(format!("unknown transaction type: {other}"))),
        }
    }
}

impl fmt::Display for ExpenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: Amount,
    /// May point to a category that no longer exists.
    pub category_id: Option<String>,
    pub date: NaiveDate,
    /// `date` could not be parsed and was replaced with today.
    pub date_recovered: bool,
    pub kind: ExpenseKind,
    pub payment_method: String,
    pub notes: Option<String>,
    /// Server-assigned; `None` when missing or unparseable.
    pub created_at: Option<NaiveDateTime>,
}

impl Expense {
    /// Never fails: malformed values fall back and are logged.
    pub(crate) fn from_record(record: &Record, fields: &ExpenseFields) -> Self {
        let data = &record.field_data;
        let id = record.record_id.as_str();

        let raw_date = data.text(&fields.date);
        let (date, date_recovered) = match raw_date.as_deref().and_then(parse_date) {
            Some(date) => (date, false),
            None => {
                tracing::warn!(record_id = id, raw = ?raw_date, "unparseable expense date, using today");
                (Local::now().date_naive(), true)
            }
        };

        let raw_created = data.text(&fields.created_at);
        let created_at = raw_created.as_deref().and_then(parse_timestamp);
        if created_at.is_none() && raw_created.is_some() {
            tracing::warn!(record_id = id, raw = ?raw_created, "unparseable creation timestamp");
        }

        let amount = data
            .number(&fields.amount)
            .and_then(Amount::from_f64)
            .unwrap_or_else(|| {
                tracing::warn!(record_id = id, "missing or invalid amount, using 0");
                Amount::ZERO
            });

        Self {
            id: id.to_string(),
            description: data.text(&fields.description).unwrap_or_default(),
            amount,
            category_id: data.text(&fields.category),
            date,
            date_recovered,
            kind: data
                .text(&fields.kind)
                .and_then(|kind| kind.parse().ok())
                .unwrap_or_default(),
            payment_method: data.text(&fields.payment_method).unwrap_or_default(),
            notes: data.mapped_text(fields.notes.as_deref()),
            created_at,
        }
    }
}

/// Newest first by creation time; rows without one keep their order at the end.
pub(crate) fn sort_by_recency(expenses: &mut [Expense]) {
    expenses.sort_by_key(|expense| (expense.created_at.is_none(), Reverse(expense.created_at)));
}

/// Input of expense create/update.
#[derive(Clone, Debug)]
pub struct ExpenseDraft {
    pub date: NaiveDate,
    pub amount: Amount,
    pub category_id: String,
    pub payment_method: String,
    pub description: String,
    pub kind: ExpenseKind,
    pub notes: Option<String>,
}

impl ExpenseDraft {
    /// `fieldData` of the draft; `owner` is only written on create.
    pub(crate) fn field_data(&self, fields: &ExpenseFields, owner: Option<&str>) -> FieldData {
        let mut data = FieldData::new();
        if let Some(owner) = owner {
            data.insert(fields.owner.clone(), Value::from(owner));
        }
        data.insert(fields.date.clone(), Value::from(format_date(self.date)));
        data.insert(fields.amount.clone(), Value::from(self.amount.to_f64()));
        data.insert(fields.category.clone(), Value::from(self.category_id.as_str()));
        data.insert(
            fields.payment_method.clone(),
            Value::from(self.payment_method.as_str()),
        );
        data.insert(fields.description.clone(), Value::from(self.description.as_str()));
        data.insert(fields.kind.clone(), Value::from(self.kind.as_str()));
        if let Some(notes_field) = &fields.notes {
            data.insert(
                notes_field.clone(),
                Value::from(self.notes.clone().unwrap_or_default()),
            );
        }
        data
    }
}
