use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::{Trainer, TrainerInput};

const TRAINER_COLUMNS: &str = "id, name, phone, specialty, color, created_at, updated_at";

pub async fn create_trainer(
    conn: &mut SqliteConnection,
    input: &TrainerInput,
    now: DateTime<Utc>,
) -> Result<Trainer, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO
            trainers (id, name, phone, specialty, color, created_at, updated_at)
        VALUES
            (?, ?, ?, ?, ?, ?, ?)
        RETURNING
            {}
        "#,
        TRAINER_COLUMNS
    );
    sqlx::query_as::<_, Trainer>(&query)
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.specialty)
        .bind(input.color)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Trainer>, sqlx::Error> {
    let query = format!("SELECT {} FROM trainers WHERE id = ?", TRAINER_COLUMNS);
    sqlx::query_as::<_, Trainer>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn list_trainers(conn: &mut SqliteConnection) -> Result<Vec<Trainer>, sqlx::Error> {
    let query = format!("SELECT {} FROM trainers ORDER BY name", TRAINER_COLUMNS);
    sqlx::query_as::<_, Trainer>(&query)
        .fetch_all(&mut *conn)
        .await
}

pub async fn update_trainer(
    conn: &mut SqliteConnection,
    id: Uuid,
    input: &TrainerInput,
    now: DateTime<Utc>,
) -> Result<Option<Trainer>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE
            trainers
        SET
            name = ?,
            phone = ?,
            specialty = ?,
            color = ?,
            updated_at = ?
        WHERE
            id = ?
        RETURNING
            {}
        "#,
        TRAINER_COLUMNS
    );
    sqlx::query_as::<_, Trainer>(&query)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.specialty)
        .bind(input.color)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Delete a trainer that was never booked. Returns false when the trainer
/// is missing or has booking history.
pub async fn delete_unbooked_trainer(conn: &mut SqliteConnection, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM
            trainers
        WHERE
            id = ?
            AND NOT EXISTS (
                SELECT 1 FROM pt_schedules WHERE trainer_id = trainers.id
            )
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
