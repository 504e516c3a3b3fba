use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::{Locker, LockerStatus};

const LOCKER_COLUMNS: &str = r#"
    locker_number,
    status,
    member_id,
    start_date,
    end_date,
    version,
    updated_at
"#;

/// Desired state of a locker row after a write.
#[derive(Debug, Clone)]
pub struct LockerState {
    pub status: LockerStatus,
    pub member_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl LockerState {
    pub fn vacant(status: LockerStatus) -> Self {
        LockerState {
            status,
            member_id: None,
            start_date: None,
            end_date: None,
        }
    }
}

pub async fn find_by_number(
    conn: &mut SqliteConnection,
    locker_number: i32,
) -> Result<Option<Locker>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM lockers WHERE locker_number = ?",
        LOCKER_COLUMNS
    );
    sqlx::query_as::<_, Locker>(&query)
        .bind(locker_number)
        .fetch_optional(&mut *conn)
        .await
}

/// Stored rows only; numbers that were never written are absent
pub async fn list_stored(conn: &mut SqliteConnection) -> Result<Vec<Locker>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM lockers ORDER BY locker_number",
        LOCKER_COLUMNS
    );
    sqlx::query_as::<_, Locker>(&query)
        .fetch_all(&mut *conn)
        .await
}

/// First write for a locker number. Fails with a unique violation if another
/// writer created the row first.
pub async fn insert_locker(
    conn: &mut SqliteConnection,
    locker_number: i32,
    state: &LockerState,
    now: DateTime<Utc>,
) -> Result<Locker, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO
            lockers (
                locker_number,
                status,
                member_id,
                start_date,
                end_date,
                version,
                updated_at
            )
        VALUES
            (?, ?, ?, ?, ?, 1, ?)
        RETURNING
            {}
        "#,
        LOCKER_COLUMNS
    );
    sqlx::query_as::<_, Locker>(&query)
        .bind(locker_number)
        .bind(state.status)
        .bind(state.member_id)
        .bind(state.start_date)
        .bind(state.end_date)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
}

/// Compare-and-swap update: applies only if the row is still at
/// `expected_version`. `None` means a concurrent writer got there first.
pub async fn update_locker(
    conn: &mut SqliteConnection,
    locker_number: i32,
    expected_version: i64,
    state: &LockerState,
    now: DateTime<Utc>,
) -> Result<Option<Locker>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE
            lockers
        SET
            status = ?,
            member_id = ?,
            start_date = ?,
            end_date = ?,
            version = version + 1,
            updated_at = ?
        WHERE
            locker_number = ?
            AND version = ?
        RETURNING
            {}
        "#,
        LOCKER_COLUMNS
    );
    sqlx::query_as::<_, Locker>(&query)
        .bind(state.status)
        .bind(state.member_id)
        .bind(state.start_date)
        .bind(state.end_date)
        .bind(now)
        .bind(locker_number)
        .bind(expected_version)
        .fetch_optional(&mut *conn)
        .await
}

/// Lowest number in `1..=pool_size` whose stored row is free to assign at
/// `today`, or that has no row at all.
pub async fn first_assignable(
    conn: &mut SqliteConnection,
    pool_size: i32,
    today: NaiveDate,
) -> Result<Option<i32>, sqlx::Error> {
    let blocked: Vec<i32> = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT
            locker_number
        FROM
            lockers
        WHERE
            status = 'maintenance'
            OR (status = 'occupied' AND (end_date IS NULL OR end_date > ?))
        ORDER BY
            locker_number
        "#,
    )
    .bind(today)
    .fetch_all(&mut *conn)
    .await?;

    Ok((1..=pool_size).find(|number| blocked.binary_search(number).is_err()))
}
