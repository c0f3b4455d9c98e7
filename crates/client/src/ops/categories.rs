use std::collections::BTreeMap;

use api_types::FieldData;
use serde_json::Value;

use crate::{
    Category, CategoryDraft, Client, ClientError, RequestFactory, Result,
    request::FIND_LIMIT_DEFAULT,
};

impl Client {
    /// Categories owned by `user_id`; an empty match is an empty list.
    pub async fn fetch_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        self.with_session(|token| async move {
            let fields = &self.config().fields.category;
            let mut query = BTreeMap::from([(fields.owner.clone(), Value::from(user_id))]);
            if let Some(active) = &fields.active {
                query.insert(active.clone(), Value::Bool(true));
            }
            let body = RequestFactory::find_query_with_fields(&query, FIND_LIMIT_DEFAULT)?;

            let Some(found) = self
                .find_records(&token, &self.config().layouts.categories, body)
                .await?
            else {
                return Ok(Vec::new());
            };

            let total = found.data.len();
            let categories: Vec<Category> = found
                .data
                .iter()
                .filter_map(|record| Category::from_record(record, fields))
                .collect();
            if categories.len() < total {
                tracing::debug!(skipped = total - categories.len(), "skipped unnamed categories");
            }
            Ok(categories)
        })
        .await
    }

    pub async fn create_category(&self, user_id: &str, draft: &CategoryDraft) -> Result<Category> {
        draft.validate()?;
        let (name, icon, color) = draft.resolved();

        self.with_session(|token| async move {
            let data = self.category_field_data(&name, &icon, &color, Some(user_id));
            let id = self
                .create_record(&token, &self.config().layouts.categories, &data)
                .await?
                .ok_or_else(|| {
                    ClientError::InvalidResponse("category created without record id".to_string())
                })?;

            tracing::info!(category_id = %id, "category created");
            Ok(Category {
                id,
                name,
                icon,
                color,
                user_id: user_id.to_string(),
            })
        })
        .await
    }

    pub async fn update_category(&self, category_id: &str, draft: &CategoryDraft) -> Result<()> {
        draft.validate()?;
        let (name, icon, color) = draft.resolved();

        self.with_session(|token| async move {
            let data = self.category_field_data(&name, &icon, &color, None);
            self.update_record(&token, &self.config().layouts.categories, category_id, &data)
                .await?;
            tracing::info!(category_id, "category updated");
            Ok(())
        })
        .await
    }

    fn category_field_data(&self, name: &str, icon: &str, color: &str, owner: Option<&str>) -> FieldData {
        let fields = &self.config().fields.category;
        let mut data = FieldData::new();
        data.insert(fields.name.clone(), Value::from(name));
        if let Some(field) = &fields.icon {
            data.insert(field.clone(), Value::from(icon));
        }
        if let Some(field) = &fields.color {
            data.insert(field.clone(), Value::from(color));
        }
        if let Some(owner) = owner {
            data.insert(fields.owner.clone(), Value::from(owner));
        }
        data
    }
}
