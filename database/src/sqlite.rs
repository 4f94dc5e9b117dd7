use async_trait::async_trait;
use autoreply_core::{
    AutoresponderRecord, AutoresponderStore, CoreError, NewAutoresponder, StoreError,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

const RECORD_COLUMNS: &str = "id, user_id, post_id, post_url, post_caption, name, keywords, \
                              dm_message, is_active, created_at";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::ConnectionFailed {
                reason: e.to_string(),
            })?
            .create_if_missing(true);

        // Every connection to an in-memory database sees its own empty database.
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        info!("Connected to {}", database_url);
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), CoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed {
                migration: e.to_string(),
            })?;
        debug!("Database migrations applied");
        Ok(())
    }

    pub async fn save_autoresponder(
        &self,
        row: &NewAutoresponder,
    ) -> Result<AutoresponderRecord, CoreError> {
        let id = Uuid::new_v4().to_string();
        let keywords = serde_json::to_string(&row.keywords)?;
        let created_at = Utc::now();

        let sql = format!(
            "INSERT INTO autoresponders ({RECORD_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {RECORD_COLUMNS}"
        );
        let inserted = sqlx::query(&sql)
            .bind(&id)
            .bind(&row.user_id)
            .bind(&row.post_id)
            .bind(&row.post_url)
            .bind(&row.post_caption)
            .bind(&row.name)
            .bind(&keywords)
            .bind(&row.dm_message)
            .bind(row.is_active)
            .bind(created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sql_error)?;

        let record = record_from_row(&inserted)?;
        info!("Inserted autoresponder {} for {}", record.id, record.user_id);
        Ok(record)
    }

    pub async fn get_autoresponders_for_owner(
        &self,
        user_id: &str,
    ) -> Result<Vec<AutoresponderRecord>, CoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM autoresponders WHERE user_id = ? ORDER BY created_at"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sql_error)?;

        rows.iter().map(record_from_row).collect()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl AutoresponderStore for SqliteStore {
    async fn insert(&self, row: NewAutoresponder) -> Result<AutoresponderRecord, CoreError> {
        self.save_autoresponder(&row).await
    }
}

fn map_sql_error(error: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            return StoreError::ConstraintViolation {
                constraint: db.message().to_string(),
            }
            .into();
        }
    }
    StoreError::Sql(error).into()
}

fn record_from_row(row: &SqliteRow) -> Result<AutoresponderRecord, CoreError> {
    let keywords: String = row.try_get("keywords").map_err(map_sql_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_sql_error)?;

    Ok(AutoresponderRecord {
        id: row.try_get("id").map_err(map_sql_error)?,
        user_id: row.try_get("user_id").map_err(map_sql_error)?,
        post_id: row.try_get("post_id").map_err(map_sql_error)?,
        post_url: row.try_get("post_url").map_err(map_sql_error)?,
        post_caption: row.try_get("post_caption").map_err(map_sql_error)?,
        name: row.try_get("name").map_err(map_sql_error)?,
        keywords: serde_json::from_str(&keywords)?,
        dm_message: row.try_get("dm_message").map_err(map_sql_error)?,
        is_active: row.try_get("is_active").map_err(map_sql_error)?,
        created_at,
    })
}
