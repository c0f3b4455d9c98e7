//! Static configuration of the Data API endpoint and the database schema.
//!
//! The two app variants share one client; they only differ by which profile
//! fields are mapped. An unmapped field (`None`) is never read, and updating it
//! fails with [`ClientError::Configuration`].
//!
//! [`ClientError::Configuration`]: crate::ClientError::Configuration

use std::{fmt, time::Duration};

use serde::Deserialize;

/// Database name shipped in the template config; must be replaced on setup.
pub const DATABASE_PLACEHOLDER: &str = "YOUR_DATABASE_NAME";

/// Versioned Data API prefix, appended to `server_url`.
pub const DATA_API_PATH: &str = "fmi/data/vLatest/databases";

/// Upper bound on the best-effort `DELETE .../sessions/{token}` call.
pub const SESSION_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub database: String,
    /// Service account used for Basic-Auth session creation.
    pub username: String,
    pub password: String,
    pub layouts: Layouts,
    pub fields: Fields,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "https://127.0.0.1".to_string(),
            database: DATABASE_PLACEHOLDER.to_string(),
            username: String::new(),
            password: String::new(),
            layouts: Layouts::default(),
            fields: Fields::default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("layouts", &self.layouts)
            .field("fields", &self.fields)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Layouts {
    /// Layout used for login, sign-up and profile updates.
    pub users: String,
    pub categories: String,
    pub expenses: String,
}

impl Default for Layouts {
    fn default() -> Self {
        Self {
            users: "Users".to_string(),
            categories: "Categories".to_string(),
            expenses: "Expenses".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fields {
    pub user: UserFields,
    pub category: CategoryFields,
    pub expense: ExpenseFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub currency: Option<String>,
    pub theme: Option<String>,
    pub expense_limit_type: Option<String>,
    pub expense_limit_value: Option<String>,
    pub expense_limit_period: Option<String>,
    pub pay_day: Option<String>,
}

impl Default for UserFields {
    fn default() -> Self {
        Self {
            first_name: "first_name".to_string(),
            last_name: "last_name".to_string(),
            email: "EmailAddress".to_string(),
            password: "Password".to_string(),
            currency: Some("currency".to_string()),
            theme: Some("theme".to_string()),
            expense_limit_type: Some("expense_limit_type".to_string()),
            expense_limit_value: Some("expense_limit_value".to_string()),
            expense_limit_period: Some("expense_limit_period".to_string()),
            pay_day: Some("pay_day".to_string()),
        }
    }
}

impl UserFields {
    /// Field mapping of the reduced "Demo" schema: no profile preferences.
    pub fn basic() -> Self {
        Self {
            currency: None,
            theme: None,
            expense_limit_type: None,
            expense_limit_value: None,
            expense_limit_period: None,
            pay_day: None,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryFields {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub owner: String,
    /// Optional "is active" flag; when set, finds only match active rows.
    pub active: Option<String>,
}

impl Default for CategoryFields {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            icon: Some("icon".to_string()),
            color: Some("color".to_string()),
            owner: "user_id".to_string(),
            active: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExpenseFields {
    pub owner: String,
    pub date: String,
    pub amount: String,
    pub category: String,
    pub payment_method: String,
    pub description: String,
    pub kind: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl Default for ExpenseFields {
    fn default() -> Self {
        Self {
            owner: "user_id".to_string(),
            date: "date".to_string(),
            amount: "amount".to_string(),
            category: "category_id".to_string(),
            payment_method: "payment_method".to_string(),
            description: "description".to_string(),
            kind: "type".to_string(),
            notes: Some("notes".to_string()),
            created_at: "CreationTimestamp".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "database": "Wallet",
            "fields": { "user": { "email": "Email" } }
        }))
        .unwrap();

        assert_eq!(config.database, "Wallet");
        assert_eq!(config.fields.user.email, "Email");
        assert_eq!(config.fields.user.first_name, "first_name");
        assert_eq!(config.layouts.expenses, "Expenses");
    }

    #[test]
    fn debug_output_hides_the_service_password() {
        let config = ClientConfig {
            username: "svc".to_string(),
            password: "hunter2".to_string(),
            ..ClientConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(printed.contains("svc"));
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn basic_schema_drops_profile_fields() {
        let fields = UserFields::basic();
        assert!(fields.pay_day.is_none());
        assert!(fields.theme.is_none());
        assert_eq!(fields.password, "Password");
    }
}
