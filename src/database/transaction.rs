use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::AppError;

/// Helpers for the multi-record write paths (ticket + sale, locker + member
/// flag, request decision + issuance). Either every statement commits or none
/// does; dropping an unfinished transaction also rolls back.
#[derive(Debug)]
pub struct DatabaseTransaction;

impl DatabaseTransaction {
    pub async fn begin(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, AppError> {
        pool.begin().await.map_err(AppError::from)
    }

    /// Commit when `result` is `Ok`, roll back otherwise.
    pub async fn finish<T>(
        tx: Transaction<'static, Sqlite>,
        result: Result<T, AppError>,
    ) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                tx.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(err) => {
                log::warn!("Transaction failed with error: {}, rolling back", err);
                if let Err(rollback_err) = tx.rollback().await {
                    log::error!(
                        "Rollback failed after error (orig: {}, rollback: {})",
                        err,
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }
}
