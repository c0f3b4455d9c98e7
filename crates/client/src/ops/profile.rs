//! Partial updates of the user record, one preference at a time.

use api_types::FieldData;
use serde_json::Value;

use crate::{
    Client, ClientError, ExpenseLimit, PayDay, Result, Theme,
    users::{normalize_currency, validate_password},
};

fn mapped<'a>(field: &'a Option<String>, label: &str) -> Result<&'a str> {
    field
        .as_deref()
        .ok_or_else(|| ClientError::Configuration(format!("user field '{label}' is not mapped")))
}

impl Client {
    pub async fn update_currency(&self, user_id: &str, currency: &str) -> Result<()> {
        let currency = normalize_currency(currency)?;
        let field = mapped(&self.config().fields.user.currency, "currency")?;

        let mut data = FieldData::new();
        data.insert(field.to_string(), Value::from(currency));
        self.update_user_fields(user_id, data).await
    }

    pub async fn update_theme(&self, user_id: &str, theme: Theme) -> Result<()> {
        let field = mapped(&self.config().fields.user.theme, "theme")?;

        let mut data = FieldData::new();
        data.insert(field.to_string(), Value::from(theme.as_str()));
        self.update_user_fields(user_id, data).await
    }

    pub async fn update_password(&self, user_id: &str, password: &str) -> Result<()> {
        validate_password(password)?;

        let mut data = FieldData::new();
        data.insert(
            self.config().fields.user.password.clone(),
            Value::from(password),
        );
        self.update_user_fields(user_id, data).await
    }

    /// `None` removes the limit.
    pub async fn update_expense_limit(&self, user_id: &str, limit: Option<ExpenseLimit>) -> Result<()> {
        if let Some(limit) = &limit {
            limit.validate()?;
        }
        let fields = &self.config().fields.user;
        let kind = mapped(&fields.expense_limit_type, "expense_limit_type")?;
        let value = mapped(&fields.expense_limit_value, "expense_limit_value")?;
        let period = mapped(&fields.expense_limit_period, "expense_limit_period")?;

        let mut data = FieldData::new();
        match limit {
            Some(limit) => {
                data.insert(kind.to_string(), Value::from(limit.kind.as_str()));
                data.insert(value.to_string(), Value::from(limit.value));
                data.insert(period.to_string(), Value::from(limit.period.as_str()));
            }
            None => {
                for name in [kind, value, period] {
                    data.insert(name.to_string(), Value::from(""));
                }
            }
        }
        self.update_user_fields(user_id, data).await
    }

    /// `None` switches back to calendar-month budgeting.
    pub async fn update_pay_day(&self, user_id: &str, pay_day: Option<PayDay>) -> Result<()> {
        let field = mapped(&self.config().fields.user.pay_day, "pay_day")?;

        let value = match pay_day {
            Some(day) => Value::from(day.day()),
            None => Value::from(""),
        };
        let mut data = FieldData::new();
        data.insert(field.to_string(), value);
        self.update_user_fields(user_id, data).await
    }

    async fn update_user_fields(&self, user_id: &str, data: FieldData) -> Result<()> {
        self.with_session(|token| async move {
            self.update_record(&token, &self.config().layouts.users, user_id, &data)
                .await?;
            tracing::info!(user_id, fields = ?data.keys().collect::<Vec<_>>(), "user profile updated");
            Ok(())
        })
        .await
    }
}
