use async_trait::async_trait;
use autoreply_core::{
    AutoresponderRecord, AutoresponderStore, CoreError, NewAutoresponder, StoreError,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Row echoed back by the table endpoint.
///
/// Hosted tables differ in column types and defaults: the key may be a UUID
/// string or an integer identity, and `created_at` may be absent or stored
/// without a zone. Anything the echo omits is taken from the submitted row.
#[derive(Debug, Deserialize)]
struct EchoedRow {
    #[serde(default)]
    id: Value,
    user_id: Option<String>,
    post_id: Option<String>,
    post_url: Option<String>,
    post_caption: Option<String>,
    name: Option<String>,
    keywords: Option<Vec<String>>,
    dm_message: Option<String>,
    is_active: Option<bool>,
    created_at: Option<String>,
}

impl EchoedRow {
    fn into_record(self, submitted: &NewAutoresponder) -> Option<AutoresponderRecord> {
        let id = match self.id {
            Value::String(id) if !id.is_empty() => id,
            Value::Number(id) => id.to_string(),
            _ => return None,
        };

        Some(AutoresponderRecord {
            id,
            user_id: self.user_id.unwrap_or_else(|| submitted.user_id.clone()),
            post_id: self.post_id.unwrap_or_else(|| submitted.post_id.clone()),
            post_url: self.post_url.unwrap_or_else(|| submitted.post_url.clone()),
            post_caption: self.post_caption.or_else(|| submitted.post_caption.clone()),
            name: self.name.unwrap_or_else(|| submitted.name.clone()),
            keywords: self.keywords.unwrap_or_else(|| submitted.keywords.clone()),
            dm_message: self.dm_message.unwrap_or_else(|| submitted.dm_message.clone()),
            is_active: self.is_active.unwrap_or(submitted.is_active),
            created_at: self
                .created_at
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_else(Utc::now),
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => {
            warn!("Unrecognized created_at value {:?}, using current time", raw);
            None
        }
    }
}

/// Insert-only client for a PostgREST-style table endpoint.
#[derive(Debug, Clone)]
pub struct RestStore {
    http_client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, CoreError> {
        let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    pub async fn insert_one(
        &self,
        row: &NewAutoresponder,
    ) -> Result<AutoresponderRecord, CoreError> {
        let url = self.table_url();
        debug!("Inserting autoresponder into {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Insert into {} failed with {}: {}", self.table, status, body);
            let err = if status == StatusCode::CONFLICT {
                StoreError::ConstraintViolation { constraint: body }
            } else {
                StoreError::Rejected {
                    status_code: status.as_u16(),
                    body,
                }
            };
            return Err(err.into());
        }

        let body = response.bytes().await?;
        let mut rows: Vec<EchoedRow> =
            serde_json::from_slice(&body).map_err(|e| StoreError::MalformedResponse {
                table: self.table.clone(),
                details: e.to_string(),
            })?;
        if rows.is_empty() {
            return Err(StoreError::EmptyResponse {
                table: self.table.clone(),
            }
            .into());
        }

        let record = rows.swap_remove(0).into_record(row).ok_or_else(|| {
            StoreError::MalformedResponse {
                table: self.table.clone(),
                details: "echoed row has no usable id".to_string(),
            }
        })?;
        info!("Inserted autoresponder {} for {}", record.id, record.user_id);
        Ok(record)
    }
}

#[async_trait]
impl AutoresponderStore for RestStore {
    async fn insert(&self, row: NewAutoresponder) -> Result<AutoresponderRecord, CoreError> {
        self.insert_one(&row).await
    }
}
