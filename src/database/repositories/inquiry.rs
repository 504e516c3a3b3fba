use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::{Inquiry, InquiryStatus};

const INQUIRY_COLUMNS: &str = r#"
    id,
    member_id,
    category,
    title,
    content,
    status,
    reply,
    replied_by,
    replied_at,
    created_at
"#;

pub async fn create_inquiry(conn: &mut SqliteConnection, inquiry: &Inquiry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO
            inquiries (
                id,
                member_id,
                category,
                title,
                content,
                status,
                reply,
                replied_by,
                replied_at,
                created_at
            )
        VALUES
            (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(inquiry.id)
    .bind(inquiry.member_id)
    .bind(inquiry.category)
    .bind(&inquiry.title)
    .bind(&inquiry.content)
    .bind(inquiry.status)
    .bind(&inquiry.reply)
    .bind(inquiry.replied_by)
    .bind(inquiry.replied_at)
    .bind(inquiry.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Inquiry>, sqlx::Error> {
    let query = format!("SELECT {} FROM inquiries WHERE id = ?", INQUIRY_COLUMNS);
    sqlx::query_as::<_, Inquiry>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Newest first, optionally narrowed to one member and/or status
pub async fn list_inquiries(
    conn: &mut SqliteConnection,
    member_id: Option<Uuid>,
    status: Option<InquiryStatus>,
) -> Result<Vec<Inquiry>, sqlx::Error> {
    let mut query = format!("SELECT {} FROM inquiries", INQUIRY_COLUMNS);
    let mut conditions = vec![];

    if member_id.is_some() {
        conditions.push("member_id = ?");
    }
    if status.is_some() {
        conditions.push("status = ?");
    }

    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }
    query.push_str(" ORDER BY created_at DESC");

    let mut prepared = sqlx::query_as::<_, Inquiry>(&query);
    if let Some(member_id) = member_id {
        prepared = prepared.bind(member_id);
    }
    if let Some(status) = status {
        prepared = prepared.bind(status);
    }

    prepared.fetch_all(&mut *conn).await
}

/// Record the reply on a pending inquiry. `None` if the inquiry is missing
/// or already answered.
pub async fn answer_inquiry(
    conn: &mut SqliteConnection,
    id: Uuid,
    reply: &str,
    replied_by: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<Inquiry>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE
            inquiries
        SET
            status = 'answered',
            reply = ?,
            replied_by = ?,
            replied_at = ?
        WHERE
            id = ?
            AND status = 'pending'
        RETURNING
            {}
        "#,
        INQUIRY_COLUMNS
    );
    sqlx::query_as::<_, Inquiry>(&query)
        .bind(reply)
        .bind(replied_by)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}
