//! On-disk cache of the logged-in user and their categories.
//!
//! Each invocation of the binary is a fresh process, so the user id needed
//! by most commands is read from here.

use std::{fs, path::Path};

use client::{Category, User};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalState {
    pub user: Option<User>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }

    pub fn require_user(&self) -> Result<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::Usage("not logged in; run `walletwatch login` first".to_string()))
    }

    pub fn category_name(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.categories.iter().find(|category| category.id == id))
            .map(|category| category.name.as_str())
            .unwrap_or("-")
    }

    pub fn upsert_category(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }
}
