use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::AttendanceRecord;

const ATTENDANCE_COLUMNS: &str = "id, member_id, check_in, check_out";

/// Open a session. The partial unique index on open sessions rejects a
/// second one for the same member.
pub async fn check_in(
    conn: &mut SqliteConnection,
    member_id: Uuid,
    now: DateTime<Utc>,
) -> Result<AttendanceRecord, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO
            attendance (id, member_id, check_in, check_out)
        VALUES
            (?, ?, ?, NULL)
        RETURNING
            {}
        "#,
        ATTENDANCE_COLUMNS
    );
    sqlx::query_as::<_, AttendanceRecord>(&query)
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
}

/// Close a session that is still open. `None` if missing or already closed.
pub async fn check_out(
    conn: &mut SqliteConnection,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE
            attendance
        SET
            check_out = ?
        WHERE
            id = ?
            AND check_out IS NULL
        RETURNING
            {}
        "#,
        ATTENDANCE_COLUMNS
    );
    sqlx::query_as::<_, AttendanceRecord>(&query)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    let query = format!("SELECT {} FROM attendance WHERE id = ?", ATTENDANCE_COLUMNS);
    sqlx::query_as::<_, AttendanceRecord>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn find_open_for_member(
    conn: &mut SqliteConnection,
    member_id: Uuid,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM attendance WHERE member_id = ? AND check_out IS NULL ORDER BY check_in DESC LIMIT 1",
        ATTENDANCE_COLUMNS
    );
    sqlx::query_as::<_, AttendanceRecord>(&query)
        .bind(member_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Records whose check-in falls in `[from, to)`, latest first
pub async fn list_between(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM attendance WHERE check_in >= ? AND check_in < ? ORDER BY check_in DESC",
        ATTENDANCE_COLUMNS
    );
    sqlx::query_as::<_, AttendanceRecord>(&query)
        .bind(from)
        .bind(to)
        .fetch_all(&mut *conn)
        .await
}

pub async fn list_for_member(
    conn: &mut SqliteConnection,
    member_id: Uuid,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM attendance WHERE member_id = ? ORDER BY check_in DESC",
        ATTENDANCE_COLUMNS
    );
    sqlx::query_as::<_, AttendanceRecord>(&query)
        .bind(member_id)
        .fetch_all(&mut *conn)
        .await
}
