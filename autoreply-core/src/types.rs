use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Soft display cap for the direct message. Longer text is still accepted.
pub const DM_MESSAGE_SOFT_LIMIT: usize = 1000;

/// Post chosen by the caller. The form only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPost {
    pub id: String,
    pub permalink: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl SelectedPost {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let post = serde_json::from_str(&contents)?;
        Ok(post)
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.thumbnail_url
            .as_deref()
            .or(self.media_url.as_deref())
    }
}

/// The finalized configuration handed back to the caller after a successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoresponderConfig {
    pub name: String,
    pub keywords: Vec<String>,
    pub dm_message: String,
    pub post_id: String,
    pub post_url: String,
    pub post_caption: Option<String>,
}

/// Row payload for the insert-one write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAutoresponder {
    pub user_id: String,
    pub post_id: String,
    pub post_url: String,
    pub post_caption: Option<String>,
    pub name: String,
    pub keywords: Vec<String>,
    pub dm_message: String,
    pub is_active: bool,
}

impl NewAutoresponder {
    pub fn new(user_id: String, config: &AutoresponderConfig) -> Self {
        Self {
            user_id,
            post_id: config.post_id.clone(),
            post_url: config.post_url.clone(),
            post_caption: config.post_caption.clone(),
            name: config.name.clone(),
            keywords: config.keywords.clone(),
            dm_message: config.dm_message.clone(),
            is_active: true,
        }
    }
}

/// Row echoed back by the store after an insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoresponderRecord {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub post_url: String,
    pub post_caption: Option<String>,
    pub name: String,
    pub keywords: Vec<String>,
    pub dm_message: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Page identity returned by the profile endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub instagram_business_account: Option<BusinessAccount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessAccount {
    pub id: String,
}
