use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::{MemberRequest, RequestStatus, RequestType};

const REQUEST_COLUMNS: &str = r#"
    id,
    member_id,
    request_type,
    plan_id,
    plan_name,
    amount,
    pause_start,
    pause_end,
    bank,
    account,
    reason,
    status,
    decided_by,
    decided_at,
    created_at
"#;

/// Create a new member request
pub async fn create_request(
    conn: &mut SqliteConnection,
    request: &MemberRequest,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO
            member_requests (
                id,
                member_id,
                request_type,
                plan_id,
                plan_name,
                amount,
                pause_start,
                pause_end,
                bank,
                account,
                reason,
                status,
                decided_by,
                decided_at,
                created_at
            )
        VALUES
            (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(request.id)
    .bind(request.member_id)
    .bind(request.request_type)
    .bind(&request.plan_id)
    .bind(&request.plan_name)
    .bind(request.amount)
    .bind(request.pause_start)
    .bind(request.pause_end)
    .bind(&request.bank)
    .bind(&request.account)
    .bind(&request.reason)
    .bind(request.status)
    .bind(request.decided_by)
    .bind(request.decided_at)
    .bind(request.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Get a specific request by ID
pub async fn find_by_id(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<MemberRequest>, sqlx::Error> {
    let query = format!("SELECT {} FROM member_requests WHERE id = ?", REQUEST_COLUMNS);
    sqlx::query_as::<_, MemberRequest>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Get requests with optional filtering
pub async fn list_requests(
    conn: &mut SqliteConnection,
    member_id: Option<Uuid>,
    status: Option<RequestStatus>,
    request_type: Option<RequestType>,
) -> Result<Vec<MemberRequest>, sqlx::Error> {
    let mut query = format!("SELECT {} FROM member_requests", REQUEST_COLUMNS);
    let mut conditions = vec![];

    if member_id.is_some() {
        conditions.push("member_id = ?");
    }
    if status.is_some() {
        conditions.push("status = ?");
    }
    if request_type.is_some() {
        conditions.push("request_type = ?");
    }

    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }
    query.push_str(" ORDER BY created_at DESC");

    let mut prepared = sqlx::query_as::<_, MemberRequest>(&query);
    if let Some(member_id) = member_id {
        prepared = prepared.bind(member_id);
    }
    if let Some(status) = status {
        prepared = prepared.bind(status);
    }
    if let Some(request_type) = request_type {
        prepared = prepared.bind(request_type);
    }

    prepared.fetch_all(&mut *conn).await
}

/// Move a pending request to its terminal status. `None` if the request is
/// missing or was already decided.
pub async fn decide_request(
    conn: &mut SqliteConnection,
    id: Uuid,
    status: RequestStatus,
    decided_by: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<MemberRequest>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE
            member_requests
        SET
            status = ?,
            decided_by = ?,
            decided_at = ?
        WHERE
            id = ?
            AND status = 'pending'
        RETURNING
            {}
        "#,
        REQUEST_COLUMNS
    );
    sqlx::query_as::<_, MemberRequest>(&query)
        .bind(status)
        .bind(decided_by)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}
