use tracing::info;

use super::SqliteRepository;
use super::mapping::connection;
use crate::repository::{ResetRepository, StorageError};

#[async_trait::async_trait]
impl ResetRepository for SqliteRepository {
    async fn clear_all(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(connection)?;

        // children before parents so foreign keys never dangle mid-transaction
        for table in ["responses", "attempts", "options", "questions", "quiz_starts"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(connection)?;
        }

        tx.commit().await.map_err(connection)?;
        info!("all quiz data cleared");
        Ok(())
    }
}
