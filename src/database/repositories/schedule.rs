use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::{BookingInput, Schedule, ScheduleStatus};

const SCHEDULE_COLUMNS: &str = r#"
    id,
    member_id,
    trainer_id,
    date,
    time,
    status,
    created_at,
    updated_at
"#;

/// Insert a `scheduled` booking. The partial unique index on
/// `(trainer_id, date, time)` rejects a second live booking for the slot.
pub async fn create_booking(
    conn: &mut SqliteConnection,
    input: &BookingInput,
    now: DateTime<Utc>,
) -> Result<Schedule, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO
            pt_schedules (
                id,
                member_id,
                trainer_id,
                date,
                time,
                status,
                created_at,
                updated_at
            )
        VALUES
            (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING
            {}
        "#,
        SCHEDULE_COLUMNS
    );
    sqlx::query_as::<_, Schedule>(&query)
        .bind(Uuid::new_v4())
        .bind(input.member_id)
        .bind(input.trainer_id)
        .bind(input.date)
        .bind(input.time)
        .bind(ScheduleStatus::Scheduled)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Schedule>, sqlx::Error> {
    let query = format!("SELECT {} FROM pt_schedules WHERE id = ?", SCHEDULE_COLUMNS);
    sqlx::query_as::<_, Schedule>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Move a booking out of `scheduled`. `None` if it is missing or no longer
/// scheduled.
pub async fn transition_from_scheduled(
    conn: &mut SqliteConnection,
    id: Uuid,
    to: ScheduleStatus,
    now: DateTime<Utc>,
) -> Result<Option<Schedule>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE
            pt_schedules
        SET
            status = ?,
            updated_at = ?
        WHERE
            id = ?
            AND status = 'scheduled'
        RETURNING
            {}
        "#,
        SCHEDULE_COLUMNS
    );
    sqlx::query_as::<_, Schedule>(&query)
        .bind(to)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Bookings on a given day, in slot order
pub async fn list_for_date(
    conn: &mut SqliteConnection,
    date: NaiveDate,
) -> Result<Vec<Schedule>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM pt_schedules WHERE date = ? ORDER BY time, created_at",
        SCHEDULE_COLUMNS
    );
    sqlx::query_as::<_, Schedule>(&query)
        .bind(date)
        .fetch_all(&mut *conn)
        .await
}

pub async fn list_for_member(
    conn: &mut SqliteConnection,
    member_id: Uuid,
) -> Result<Vec<Schedule>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM pt_schedules WHERE member_id = ? ORDER BY date DESC, time",
        SCHEDULE_COLUMNS
    );
    sqlx::query_as::<_, Schedule>(&query)
        .bind(member_id)
        .fetch_all(&mut *conn)
        .await
}

/// Completed sessions for a trainer within `[from, to)`
pub async fn count_completed_for_trainer(
    conn: &mut SqliteConnection,
    trainer_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT
            COUNT(*)
        FROM
            pt_schedules
        WHERE
            trainer_id = ?
            AND status = 'completed'
            AND date >= ?
            AND date < ?
        "#,
    )
    .bind(trainer_id)
    .bind(from)
    .bind(to)
    .fetch_one(&mut *conn)
    .await
}
