//! Per-user expense categories.

use api_types::record::Record;
use serde::{Deserialize, Serialize};

use crate::{ClientError, config::CategoryFields, fields::FieldDataExt};

/// Color of categories created without one.
pub const DEFAULT_COLOR: &str = "#8E8E93";
/// Icon of categories whose name matches no keyword.
pub const DEFAULT_ICON: &str = "tag";

const ICON_KEYWORDS: &[(&[&str], &str)] = &[
    (&["food", "grocer", "restaurant", "dining", "lunch"], "fork.knife"),
    (&["coffee", "cafe"], "cup.and.saucer"),
    (&["transport", "car", "fuel", "gas", "taxi", "bus", "train"], "car"),
    (&["home", "rent", "house", "mortgage"], "house"),
    (&["shop", "cloth"], "bag"),
    (&["health", "medic", "doctor", "pharm"], "cross.case"),
    (&["travel", "flight", "hotel", "vacation"], "airplane"),
    (&["bill", "utilit", "electric", "water", "internet", "phone"], "bolt"),
    (&["entertain", "movie", "game", "music"], "film"),
    (&["salary", "income", "wage", "pay"], "banknote"),
    (&["gift"], "gift"),
    (&["education", "school", "book"], "book"),
];

/// Picks an icon from keywords in the category name.
pub fn default_icon(name: &str) -> &'static str {
    let name = name.to_lowercase();
    ICON_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_ICON)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub user_id: String,
}

impl Category {
    /// `None` for rows without a name; those are skipped, not reported.
    pub(crate) fn from_record(record: &Record, fields: &CategoryFields) -> Option<Self> {
        let data = &record.field_data;
        let name = data.text(&fields.name)?;
        Some(Self {
            id: record.record_id.clone(),
            icon: data
                .mapped_text(fields.icon.as_deref())
                .unwrap_or_else(|| default_icon(&name).to_string()),
            color: data
                .mapped_text(fields.color.as_deref())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            user_id: data.text(&fields.owner).unwrap_or_default(),
            name,
        })
    }
}

/// Input of category create/update.
#[derive(Clone, Debug, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if self.name.trim().is_empty() {
            return Err(ClientError::Validation(
                "category name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Icon and color with defaults applied.
    pub(crate) fn resolved(&self) -> (String, String, String) {
        let name = self.name.trim().to_string();
        let icon = self
            .icon
            .clone()
            .filter(|icon| !icon.trim().is_empty())
            .unwrap_or_else(|| default_icon(&name).to_string());
        let color = self
            .color
            .clone()
            .filter(|color| !color.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COLOR.to_string());
        (name, icon, color)
    }
}
