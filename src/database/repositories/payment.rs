use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::{PaymentEvent, PaymentEventInput};

const PAYMENT_COLUMNS: &str = "id, member_id, external_id, amount, created_at";

/// Record a gateway confirmation. Replays of the same `external_id` return
/// the row stored the first time.
pub async fn record_event(
    conn: &mut SqliteConnection,
    input: &PaymentEventInput,
    now: DateTime<Utc>,
) -> Result<PaymentEvent, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO
            payment_events (id, member_id, external_id, amount, created_at)
        VALUES
            (?, ?, ?, ?, ?)
        ON CONFLICT (external_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.member_id)
    .bind(&input.external_id)
    .bind(input.amount)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let query = format!(
        "SELECT {} FROM payment_events WHERE external_id = ?",
        PAYMENT_COLUMNS
    );
    sqlx::query_as::<_, PaymentEvent>(&query)
        .bind(&input.external_id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn list_for_member(
    conn: &mut SqliteConnection,
    member_id: Uuid,
) -> Result<Vec<PaymentEvent>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM payment_events WHERE member_id = ? ORDER BY created_at DESC",
        PAYMENT_COLUMNS
    );
    sqlx::query_as::<_, PaymentEvent>(&query)
        .bind(member_id)
        .fetch_all(&mut *conn)
        .await
}
