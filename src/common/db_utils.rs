// src/common/db_utils.rs

use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

use crate::common::error::AppError;

// ---
// Helper de transação com "lock_timeout"
// ---
/// Abre uma transação e limita quanto tempo ela espera por locks de linha.
/// Se o `SELECT ... FOR UPDATE` não conseguir o lock a tempo, o Postgres
/// aborta a instrução e a transação sofre rollback ao ser descartada.
pub(crate) async fn begin_with_lock_timeout(
    pool: &PgPool,
    lock_timeout: Duration,
) -> Result<Transaction<'static, Postgres>, AppError> {
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = pool.begin().await?;

    // `true` = vale só para esta transação (SET LOCAL)
    sqlx::query("SELECT set_config('lock_timeout', $1, true)")
        .bind(format!("{}ms", lock_timeout.as_millis()))
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}

/// Violação de chave estrangeira (SQLSTATE 23503).
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_foreign_key_violation())
        .unwrap_or(false)
}

/// Lock não obtido a tempo (55P03) ou deadlock detectado (40P01).
pub(crate) fn is_lock_failure(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code == "55P03" || code == "40P01")
        .unwrap_or(false)
}

/// Valor fora do intervalo do tipo da coluna (22003).
pub(crate) fn is_numeric_out_of_range(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code == "22003")
        .unwrap_or(false)
}
