use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::database::models::Sale;

const SALE_COLUMNS: &str = r#"
    id,
    member_id,
    ticket_id,
    category,
    plan_name,
    amount,
    payment_method,
    created_at
"#;

/// Append a sale to the ledger
pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO
            sales (
                id,
                member_id,
                ticket_id,
                category,
                plan_name,
                amount,
                payment_method,
                created_at
            )
        VALUES
            (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(sale.id)
    .bind(sale.member_id)
    .bind(sale.ticket_id)
    .bind(sale.category)
    .bind(&sale.plan_name)
    .bind(sale.amount)
    .bind(&sale.payment_method)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn list_for_member(
    conn: &mut SqliteConnection,
    member_id: Uuid,
) -> Result<Vec<Sale>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM sales WHERE member_id = ? ORDER BY created_at DESC",
        SALE_COLUMNS
    );
    sqlx::query_as::<_, Sale>(&query)
        .bind(member_id)
        .fetch_all(&mut *conn)
        .await
}
