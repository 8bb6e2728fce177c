use crate::core::dispatch::{CooldownCheck, CooldownError, CooldownStore};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

/// Cooldowns that survive restarts and can be shared by several bot processes
/// pointed at the same database file.
pub struct SqliteCooldownStore {
    pool: Pool<Sqlite>,
}

impl SqliteCooldownStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path_str)?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        let pool = SqlitePoolOptions::new().connect(&conn_str).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS command_cooldowns (
                actor_id INTEGER NOT NULL,
                command TEXT NOT NULL,
                last_invoked_at INTEGER NOT NULL,
                PRIMARY KEY (actor_id, command)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CooldownStore for SqliteCooldownStore {
    async fn last_invocation(
        &self,
        actor_id: u64,
        command: &str,
    ) -> Result<Option<i64>, CooldownError> {
        let row = sqlx::query(
            "SELECT last_invoked_at FROM command_cooldowns WHERE actor_id = ? AND command = ?",
        )
        .bind(actor_id as i64)
        .bind(command)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CooldownError::StorageError(e.to_string()))?;

        Ok(row.map(|row| row.get::<i64, _>("last_invoked_at")))
    }

    async fn try_acquire(
        &self,
        actor_id: u64,
        command: &str,
        cooldown_millis: u64,
        now_millis: i64,
    ) -> Result<CooldownCheck, CooldownError> {
        // Insert or advance in one statement. The WHERE clause leaves a row that
        // is still inside its window untouched, so only one writer can win.
        let result = sqlx::query(
            r#"
            INSERT INTO command_cooldowns (actor_id, command, last_invoked_at)
            VALUES (?, ?, ?)
            ON CONFLICT(actor_id, command) DO UPDATE SET
                last_invoked_at = excluded.last_invoked_at
            WHERE excluded.last_invoked_at - command_cooldowns.last_invoked_at >= ?
            "#,
        )
        .bind(actor_id as i64)
        .bind(command)
        .bind(now_millis)
        .bind(cooldown_millis as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| CooldownError::StorageError(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(CooldownCheck::allowed());
        }

        let last = self.last_invocation(actor_id, command).await?;
        let check = CooldownCheck::evaluate(last, cooldown_millis, now_millis);
        if check.allowed {
            // Only reachable if the row moved between the two statements.
            return Ok(CooldownCheck {
                allowed: false,
                remaining_millis: cooldown_millis,
            });
        }
        Ok(check)
    }
}
