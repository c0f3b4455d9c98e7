use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    Client, ClientError, Expense, ExpenseDraft, RequestFactory, Result,
    expenses::sort_by_recency,
};

/// `limit` of expense finds; larger than the default so history is not cut.
const EXPENSE_FIND_LIMIT: u32 = 1000;

impl Client {
    /// Creates an expense and returns its record id.
    pub async fn create_expense(&self, user_id: &str, draft: &ExpenseDraft) -> Result<String> {
        self.with_session(|token| async move {
            let data = draft.field_data(&self.config().fields.expense, Some(user_id));
            let id = self
                .create_record(&token, &self.config().layouts.expenses, &data)
                .await?
                .ok_or_else(|| {
                    ClientError::InvalidResponse("expense created without record id".to_string())
                })?;
            tracing::info!(expense_id = %id, kind = %draft.kind, "expense created");
            Ok(id)
        })
        .await
    }

    /// Expenses owned by `user_id`, newest first.
    ///
    /// A record with a malformed date or timestamp is still returned; see
    /// [`Expense::date_recovered`].
    pub async fn fetch_expenses(&self, user_id: &str) -> Result<Vec<Expense>> {
        self.with_session(|token| async move {
            let fields = &self.config().fields.expense;
            let query = BTreeMap::from([(fields.owner.clone(), Value::from(user_id))]);
            let body = RequestFactory::find_query_with_fields(&query, EXPENSE_FIND_LIMIT)?;

            let Some(found) = self
                .find_records(&token, &self.config().layouts.expenses, body)
                .await?
            else {
                return Ok(Vec::new());
            };

            let mut expenses: Vec<Expense> = found
                .data
                .iter()
                .map(|record| Expense::from_record(record, fields))
                .collect();
            sort_by_recency(&mut expenses);
            Ok(expenses)
        })
        .await
    }

    pub async fn fetch_expense(&self, expense_id: &str) -> Result<Expense> {
        self.with_session(|token| async move {
            let record = self
                .get_record(&token, &self.config().layouts.expenses, expense_id)
                .await?;
            Ok(Expense::from_record(&record, &self.config().fields.expense))
        })
        .await
    }

    pub async fn update_expense(&self, expense_id: &str, draft: &ExpenseDraft) -> Result<()> {
        self.with_session(|token| async move {
            let data = draft.field_data(&self.config().fields.expense, None);
            self.update_record(&token, &self.config().layouts.expenses, expense_id, &data)
                .await?;
            tracing::info!(expense_id, "expense updated");
            Ok(())
        })
        .await
    }

    pub async fn delete_expense(&self, expense_id: &str) -> Result<()> {
        self.with_session(|token| async move {
            self.delete_record(&token, &self.config().layouts.expenses, expense_id)
                .await?;
            tracing::info!(expense_id, "expense deleted");
            Ok(())
        })
        .await
    }
}
