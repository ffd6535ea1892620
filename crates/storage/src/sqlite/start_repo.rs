use chrono::{DateTime, Utc};
use quiz_core::model::{QuizStart, StartId};

use super::SqliteRepository;
use super::mapping::{connection, count_u64, map_start_row};
use crate::repository::{QuizStartRepository, StorageError};

#[async_trait::async_trait]
impl QuizStartRepository for SqliteRepository {
    async fn record_start(
        &self,
        ip_address: &str,
        started_at: DateTime<Utc>,
    ) -> Result<QuizStart, StorageError> {
        let row = sqlx::query(
            r"
            INSERT INTO quiz_starts (ip_address, started_at)
            VALUES (?1, ?2)
            RETURNING id, ip_address, started_at
            ",
        )
        .bind(ip_address)
        .bind(started_at)
        .fetch_one(&self.pool)
        .await
        .map_err(connection)?;

        map_start_row(&row)
    }

    async fn get_start(&self, id: StartId) -> Result<Option<QuizStart>, StorageError> {
        let Ok(id_value) = i64::try_from(id.value()) else {
            return Ok(None);
        };
        let row = sqlx::query(
            r"
            SELECT id, ip_address, started_at
            FROM quiz_starts
            WHERE id = ?1
            ",
        )
        .bind(id_value)
        .fetch_optional(&self.pool)
        .await
        .map_err(connection)?;

        row.as_ref().map(map_start_row).transpose()
    }

    async fn count_starts(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_starts")
            .fetch_one(&self.pool)
            .await
            .map_err(connection)?;
        count_u64("start count", count)
    }
}
