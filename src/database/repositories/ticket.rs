use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::{PlanKind, Ticket};

const TICKET_COLUMNS: &str = r#"
    id,
    member_id,
    plan_id,
    plan_name,
    kind,
    start_date,
    end_date,
    remaining,
    total_sessions,
    used_sessions,
    trainer_id,
    price,
    payment_method,
    request_id,
    created_at,
    updated_at
"#;

/// Insert a ticket row as given
pub async fn insert_ticket(conn: &mut SqliteConnection, ticket: &Ticket) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO
            tickets (
                id,
                member_id,
                plan_id,
                plan_name,
                kind,
                start_date,
                end_date,
                remaining,
                total_sessions,
                used_sessions,
                trainer_id,
                price,
                payment_method,
                request_id,
                created_at,
                updated_at
            )
        VALUES
            (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(ticket.id)
    .bind(ticket.member_id)
    .bind(&ticket.plan_id)
    .bind(&ticket.plan_name)
    .bind(ticket.kind)
    .bind(ticket.start_date)
    .bind(ticket.end_date)
    .bind(ticket.remaining)
    .bind(ticket.total_sessions)
    .bind(ticket.used_sessions)
    .bind(ticket.trainer_id)
    .bind(ticket.price)
    .bind(&ticket.payment_method)
    .bind(ticket.request_id)
    .bind(ticket.created_at)
    .bind(ticket.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Get a ticket by ID
pub async fn find_by_id(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Ticket>, sqlx::Error> {
    let query = format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS);
    sqlx::query_as::<_, Ticket>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Get the ticket issued for an approved request, if any
pub async fn find_by_request(
    conn: &mut SqliteConnection,
    request_id: Uuid,
) -> Result<Option<Ticket>, sqlx::Error> {
    let query = format!("SELECT {} FROM tickets WHERE request_id = ?", TICKET_COLUMNS);
    sqlx::query_as::<_, Ticket>(&query)
        .bind(request_id)
        .fetch_optional(&mut *conn)
        .await
}

/// All tickets for a member, most recent start first
pub async fn list_for_member(
    conn: &mut SqliteConnection,
    member_id: Uuid,
) -> Result<Vec<Ticket>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM tickets WHERE member_id = ? ORDER BY start_date DESC, created_at DESC",
        TICKET_COLUMNS
    );
    sqlx::query_as::<_, Ticket>(&query)
        .bind(member_id)
        .fetch_all(&mut *conn)
        .await
}

/// Every ticket, of one kind when given
pub async fn list_tickets(
    conn: &mut SqliteConnection,
    kind: Option<PlanKind>,
) -> Result<Vec<Ticket>, sqlx::Error> {
    match kind {
        Some(kind) => {
            let query = format!(
                "SELECT {} FROM tickets WHERE kind = ? ORDER BY created_at",
                TICKET_COLUMNS
            );
            sqlx::query_as::<_, Ticket>(&query)
                .bind(kind)
                .fetch_all(&mut *conn)
                .await
        }
        None => {
            let query = format!("SELECT {} FROM tickets ORDER BY created_at", TICKET_COLUMNS);
            sqlx::query_as::<_, Ticket>(&query)
                .fetch_all(&mut *conn)
                .await
        }
    }
}

/// Draw one session from a PT pack.
///
/// The balance check and the increment are a single statement, so two
/// concurrent callers racing on the last session cannot both succeed.
/// Returns `None` when the ticket is missing, not a PT pack, or exhausted.
pub async fn consume_session(
    conn: &mut SqliteConnection,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<Ticket>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE
            tickets
        SET
            used_sessions = used_sessions + 1,
            remaining = total_sessions - used_sessions - 1,
            updated_at = ?
        WHERE
            id = ?
            AND kind = ?
            AND used_sessions < total_sessions
        RETURNING
            {}
        "#,
        TICKET_COLUMNS
    );
    sqlx::query_as::<_, Ticket>(&query)
        .bind(now)
        .bind(id)
        .bind(PlanKind::Pt)
        .fetch_optional(&mut *conn)
        .await
}

/// Set the trainer on a PT pack
pub async fn set_trainer(
    conn: &mut SqliteConnection,
    id: Uuid,
    trainer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<Ticket>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE
            tickets
        SET
            trainer_id = ?,
            updated_at = ?
        WHERE
            id = ?
        RETURNING
            {}
        "#,
        TICKET_COLUMNS
    );
    sqlx::query_as::<_, Ticket>(&query)
        .bind(trainer_id)
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Rewrite the end date of a ticket whose window is still degenerate.
/// A ticket that no longer has `start_date = end_date` is left alone.
pub async fn repair_end_date(
    conn: &mut SqliteConnection,
    id: Uuid,
    new_end_date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE
            tickets
        SET
            end_date = ?,
            updated_at = ?
        WHERE
            id = ?
            AND start_date = end_date
        "#,
    )
    .bind(new_end_date)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Tickets whose start and end dates coincide
pub async fn list_degenerate(conn: &mut SqliteConnection) -> Result<Vec<Ticket>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM tickets WHERE start_date = end_date ORDER BY created_at",
        TICKET_COLUMNS
    );
    sqlx::query_as::<_, Ticket>(&query)
        .fetch_all(&mut *conn)
        .await
}
