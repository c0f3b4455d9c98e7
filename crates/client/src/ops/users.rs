use std::collections::BTreeMap;

use api_types::FieldData;
use serde_json::Value;

use crate::{
    Client, ClientError, NewUser, RequestFactory, Result, User, request::FIND_LIMIT_SINGLE,
    users::normalize_email,
};

impl Client {
    /// Finds the user whose email and password both match.
    pub async fn login_user(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        self.with_session(|token| async move {
            let fields = &self.config().fields.user;
            let query = BTreeMap::from([
                (fields.email.clone(), format!("=={email}")),
                (fields.password.clone(), format!("=={password}")),
            ]);
            let body = RequestFactory::find_query(&query, FIND_LIMIT_SINGLE)?;

            let found = self
                .find_records(&token, &self.config().layouts.users, body)
                .await?;
            let record = found
                .filter(|set| set.found_count() > 0)
                .and_then(|set| set.data.into_iter().next())
                .ok_or(ClientError::UserNotFound)?;

            let user = User::from_record(&record, fields);
            tracing::info!(user_id = %user.user_id, "user logged in");
            Ok(user)
        })
        .await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let email = normalize_email(email);
        self.with_session(|token| async move { self.email_exists_with(&token, &email).await })
            .await
    }

    /// Signs a user up. Fails with [`ClientError::EmailAlreadyExists`]
    /// before any record is created when the email is taken.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<bool> {
        new_user.validate()?;
        let email = normalize_email(&new_user.email);

        self.with_session(|token| async move {
            if self.email_exists_with(&token, &email).await? {
                return Err(ClientError::EmailAlreadyExists);
            }

            let fields = &self.config().fields.user;
            let mut data = FieldData::new();
            data.insert(
                fields.first_name.clone(),
                Value::from(new_user.first_name.trim()),
            );
            data.insert(
                fields.last_name.clone(),
                Value::from(new_user.last_name.trim()),
            );
            data.insert(fields.email.clone(), Value::from(email.as_str()));
            data.insert(fields.password.clone(), Value::from(new_user.password.as_str()));

            let record_id = self
                .create_record(&token, &self.config().layouts.users, &data)
                .await?;
            tracing::info!(record_id = ?record_id, "user created");
            Ok(true)
        })
        .await
    }

    /// Deletes the user record. Removing the user's categories and
    /// expenses is left to the server.
    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.with_session(|token| async move {
            self.delete_record(&token, &self.config().layouts.users, user_id)
                .await?;
            tracing::info!(user_id, "user deleted");
            Ok(())
        })
        .await
    }

    async fn email_exists_with(&self, token: &str, email: &str) -> Result<bool> {
        let query = BTreeMap::from([(
            self.config().fields.user.email.clone(),
            format!("=={email}"),
        )]);
        let body = RequestFactory::find_query(&query, FIND_LIMIT_SINGLE)?;
        let found = self
            .find_records(token, &self.config().layouts.users, body)
            .await?;
        Ok(found.is_some_and(|set| set.found_count() > 0))
    }
}
