use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::Member;

const MEMBER_COLUMNS: &str = r#"
    id,
    name,
    phone,
    email,
    gender,
    birth_date,
    address,
    emergency_contact,
    memo,
    has_locker,
    locker_number,
    created_at
"#;

/// Insert a new member
pub async fn create_member(conn: &mut SqliteConnection, member: &Member) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO
            members (
                id,
                name,
                phone,
                email,
                gender,
                birth_date,
                address,
                emergency_contact,
                memo,
                has_locker,
                locker_number,
                created_at
            )
        VALUES
            (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(member.id)
    .bind(&member.name)
    .bind(&member.phone)
    .bind(&member.email)
    .bind(member.gender)
    .bind(member.birth_date)
    .bind(&member.address)
    .bind(&member.emergency_contact)
    .bind(&member.memo)
    .bind(member.has_locker)
    .bind(member.locker_number)
    .bind(member.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Find a member by ID
pub async fn find_by_id(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Member>, sqlx::Error> {
    let query = format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS);
    sqlx::query_as::<_, Member>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// List all members, newest first
pub async fn list_members(conn: &mut SqliteConnection) -> Result<Vec<Member>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM members ORDER BY created_at DESC",
        MEMBER_COLUMNS
    );
    sqlx::query_as::<_, Member>(&query)
        .fetch_all(&mut *conn)
        .await
}

/// Point the member's locker back-reference at `locker_number`
pub async fn set_locker(
    conn: &mut SqliteConnection,
    member_id: Uuid,
    locker_number: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE
            members
        SET
            has_locker = 1,
            locker_number = ?
        WHERE
            id = ?
        "#,
    )
    .bind(locker_number)
    .bind(member_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Clear the member's locker back-reference, but only if it still points at
/// `locker_number`
pub async fn clear_locker(
    conn: &mut SqliteConnection,
    member_id: Uuid,
    locker_number: i32,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE
            members
        SET
            has_locker = 0,
            locker_number = NULL
        WHERE
            id = ?
            AND locker_number = ?
        "#,
    )
    .bind(member_id)
    .bind(locker_number)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
