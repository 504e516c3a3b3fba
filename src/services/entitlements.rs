//! Entitlement store: issuing tickets, drawing PT sessions and read-time
//! ticket status.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::AppState;
use crate::database::DatabaseTransaction;
use crate::database::models::{
    AssignTrainerInput, Issuance, IssueTicketInput, Plan, PlanKind, PlanTerm, Sale, Ticket,
    TicketView, WindowRepair,
};
use crate::database::repositories::{
    member as member_repo, sale as sale_repo, ticket as ticket_repo, trainer as trainer_repo,
};
use crate::error::{AppError, AppResult};
use crate::services::auth::Caller;
use crate::services::catalog::UNKNOWN_PLAN_DURATION_DAYS;
use crate::services::status::{self, EntitlementStatus};

/// Everything needed to write one ticket and its sale.
#[derive(Debug, Clone)]
pub struct TicketOrder<'a> {
    pub plan: &'a Plan,
    pub member_id: Uuid,
    pub start_date: NaiveDate,
    pub payment_method: &'a str,
    /// Charged amount; the plan price unless a request fixed it earlier.
    pub amount: i64,
    pub request_id: Option<Uuid>,
}

impl<'a> TicketOrder<'a> {
    pub fn new(plan: &'a Plan, member_id: Uuid, start_date: NaiveDate, payment_method: &'a str) -> Self {
        TicketOrder {
            plan,
            member_id,
            start_date,
            payment_method,
            amount: plan.price,
            request_id: None,
        }
    }
}

pub fn add_days(date: NaiveDate, days: i64) -> AppResult<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| AppError::ValidationError(format!("date {} + {} days is out of range", date, days)))
}

/// Build the ticket for an order without touching storage.
pub fn build_ticket(
    order: &TicketOrder<'_>,
    validity_days: i64,
    now: DateTime<Utc>,
) -> AppResult<Ticket> {
    if validity_days <= 0 {
        return Err(AppError::ValidationError(format!(
            "plan {} has non-positive validity {}",
            order.plan.id, validity_days
        )));
    }
    if order.payment_method.trim().is_empty() {
        return Err(AppError::ValidationError(
            "payment method is required".to_string(),
        ));
    }
    if order.amount < 0 {
        return Err(AppError::ValidationError("amount must not be negative".to_string()));
    }

    let end_date = add_days(order.start_date, validity_days)?;
    let (remaining, total_sessions) = match order.plan.term {
        PlanTerm::Days(days) => {
            let days = i32::try_from(days).map_err(|_| {
                AppError::ValidationError(format!("plan {} duration is too long", order.plan.id))
            })?;
            (days, 0)
        }
        PlanTerm::Sessions(count) => (count, count),
    };

    Ok(Ticket {
        id: Uuid::new_v4(),
        member_id: order.member_id,
        plan_id: order.plan.id.clone(),
        plan_name: order.plan.name.clone(),
        kind: order.plan.kind,
        start_date: order.start_date,
        end_date,
        remaining,
        total_sessions,
        used_sessions: 0,
        trainer_id: None,
        price: order.amount,
        payment_method: order.payment_method.trim().to_string(),
        request_id: order.request_id,
        created_at: now,
        updated_at: now,
    })
}

/// Write a ticket and its sale on `conn`. Callers run this inside a
/// transaction so both rows land or neither does.
pub async fn issue_on(
    conn: &mut SqliteConnection,
    order: &TicketOrder<'_>,
    validity_days: i64,
    now: DateTime<Utc>,
) -> AppResult<Issuance> {
    if member_repo::find_by_id(conn, order.member_id).await?.is_none() {
        return Err(AppError::not_found("member", order.member_id));
    }

    let ticket = build_ticket(order, validity_days, now)?;
    ticket_repo::insert_ticket(conn, &ticket)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "a ticket was already issued for this request"))?;

    let sale = Sale {
        id: Uuid::new_v4(),
        member_id: ticket.member_id,
        ticket_id: Some(ticket.id),
        category: ticket.kind,
        plan_name: ticket.plan_name.clone(),
        amount: ticket.price,
        payment_method: ticket.payment_method.clone(),
        created_at: now,
    };
    sale_repo::insert_sale(conn, &sale).await?;

    log::info!(
        "Issued {} ticket {} ({}) to member {} for {}",
        ticket.kind,
        ticket.id,
        ticket.plan_name,
        ticket.member_id,
        ticket.price
    );
    Ok(Issuance { ticket, sale })
}

pub async fn issue_ticket(
    state: &AppState,
    caller: &Caller,
    input: IssueTicketInput,
) -> AppResult<Issuance> {
    caller.require_admin()?;
    let plan = state
        .catalog
        .find(&input.plan_id)
        .ok_or_else(|| AppError::ValidationError(format!("unknown plan {}", input.plan_id)))?;
    let order = TicketOrder::new(plan, input.member_id, input.start_date, &input.payment_method);
    let validity_days = state.catalog.validity_days(plan);

    let mut tx = DatabaseTransaction::begin(&state.pool).await?;
    let result = issue_on(&mut tx, &order, validity_days, state.now()).await;
    DatabaseTransaction::finish(tx, result).await
}

/// Draw one session on `conn`, classifying why it failed if it did.
pub async fn consume_on(
    conn: &mut SqliteConnection,
    ticket_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<Ticket> {
    if let Some(ticket) = ticket_repo::consume_session(conn, ticket_id, now).await? {
        log::info!(
            "Consumed session on ticket {}: {}/{} used",
            ticket.id,
            ticket.used_sessions,
            ticket.total_sessions
        );
        return Ok(ticket);
    }

    match ticket_repo::find_by_id(conn, ticket_id).await? {
        None => Err(AppError::not_found("ticket", ticket_id)),
        Some(ticket) if !ticket.is_session_pack() => Err(AppError::ValidationError(format!(
            "ticket {} is a {} ticket, not a session pack",
            ticket_id, ticket.kind
        ))),
        Some(ticket) => {
            log::warn!(
                "Session pack {} exhausted ({}/{})",
                ticket_id,
                ticket.used_sessions,
                ticket.total_sessions
            );
            Err(AppError::InsufficientBalance(format!(
                "ticket {} has no sessions left",
                ticket_id
            )))
        }
    }
}

pub async fn consume_session(state: &AppState, caller: &Caller, ticket_id: Uuid) -> AppResult<Ticket> {
    caller.require_admin()?;
    let mut conn = state.pool.acquire().await?;
    consume_on(&mut conn, ticket_id, state.now()).await
}

/// A delivered PT visit, recorded independently of any booking.
pub async fn record_session(state: &AppState, caller: &Caller, ticket_id: Uuid) -> AppResult<Ticket> {
    consume_session(state, caller, ticket_id).await
}

pub async fn assign_trainer(
    state: &AppState,
    caller: &Caller,
    ticket_id: Uuid,
    input: AssignTrainerInput,
) -> AppResult<Ticket> {
    caller.require_admin()?;
    let mut conn = state.pool.acquire().await?;

    let ticket = ticket_repo::find_by_id(&mut conn, ticket_id)
        .await?
        .ok_or_else(|| AppError::not_found("ticket", ticket_id))?;
    if !ticket.is_session_pack() {
        return Err(AppError::ValidationError(format!(
            "trainers can only be assigned to PT tickets, {} is {}",
            ticket_id, ticket.kind
        )));
    }
    if trainer_repo::find_by_id(&mut conn, input.trainer_id).await?.is_none() {
        return Err(AppError::not_found("trainer", input.trainer_id));
    }

    ticket_repo::set_trainer(&mut conn, ticket_id, input.trainer_id, state.now())
        .await?
        .ok_or_else(|| AppError::not_found("ticket", ticket_id))
}

pub fn recompute_status(ticket: &Ticket, now: DateTime<Utc>, expiring_threshold_days: i64) -> EntitlementStatus {
    status::classify_with(
        status::days_remaining(Some(ticket.end_date), now),
        expiring_threshold_days,
    )
}

pub fn view(ticket: Ticket, now: DateTime<Utc>, expiring_threshold_days: i64) -> TicketView {
    let days_remaining = status::days_remaining(Some(ticket.end_date), now);
    TicketView {
        status: status::classify_with(days_remaining, expiring_threshold_days),
        days_remaining,
        ticket,
    }
}

pub async fn list_tickets(state: &AppState, caller: &Caller, member_id: Uuid) -> AppResult<Vec<TicketView>> {
    caller.require_self_or_admin(member_id)?;
    let mut conn = state.pool.acquire().await?;
    if member_repo::find_by_id(&mut conn, member_id).await?.is_none() {
        return Err(AppError::not_found("member", member_id));
    }

    let now = state.now();
    let threshold = state.config.expiring_threshold_days;
    Ok(ticket_repo::list_for_member(&mut conn, member_id)
        .await?
        .into_iter()
        .map(|ticket| view(ticket, now, threshold))
        .collect())
}

pub async fn list_all_tickets(
    state: &AppState,
    caller: &Caller,
    kind: Option<PlanKind>,
) -> AppResult<Vec<TicketView>> {
    caller.require_admin()?;
    let mut conn = state.pool.acquire().await?;
    let now = state.now();
    let threshold = state.config.expiring_threshold_days;
    Ok(ticket_repo::list_tickets(&mut conn, kind)
        .await?
        .into_iter()
        .map(|ticket| view(ticket, now, threshold))
        .collect())
}

/// The membership ticket that runs latest among those not yet expired.
pub async fn active_membership(
    state: &AppState,
    caller: &Caller,
    member_id: Uuid,
) -> AppResult<Option<TicketView>> {
    let views = list_tickets(state, caller, member_id).await?;
    Ok(views
        .into_iter()
        .filter(|v| v.ticket.kind == PlanKind::Membership && v.status != EntitlementStatus::Expired)
        .max_by_key(|v| v.ticket.end_date))
}

pub async fn member_sales(state: &AppState, caller: &Caller, member_id: Uuid) -> AppResult<Vec<Sale>> {
    caller.require_self_or_admin(member_id)?;
    let mut conn = state.pool.acquire().await?;
    Ok(sale_repo::list_for_member(&mut conn, member_id).await?)
}

/// Give a ticket stored with `start_date == end_date` its nominal window,
/// looked up by plan name. Any other ticket comes back unchanged, so
/// applying this twice is the same as applying it once.
pub fn fix_degenerate_window(ticket: &Ticket, durations: &HashMap<String, i64>) -> AppResult<Ticket> {
    let mut fixed = ticket.clone();
    if ticket.has_degenerate_window() {
        let days = durations
            .get(&ticket.plan_name)
            .copied()
            .unwrap_or(UNKNOWN_PLAN_DURATION_DAYS);
        fixed.end_date = add_days(ticket.start_date, days)?;
    }
    Ok(fixed)
}

/// Repair every degenerate ticket and report what changed.
pub async fn fix_degenerate_windows(state: &AppState, caller: &Caller) -> AppResult<Vec<WindowRepair>> {
    caller.require_admin()?;
    let durations = state.catalog.duration_table();
    let now = state.now();

    let mut tx = DatabaseTransaction::begin(&state.pool).await?;
    let result = async {
        let mut repairs = Vec::new();
        for ticket in ticket_repo::list_degenerate(&mut tx).await? {
            let fixed = fix_degenerate_window(&ticket, &durations)?;
            if ticket_repo::repair_end_date(&mut tx, ticket.id, fixed.end_date, now).await? {
                repairs.push(WindowRepair {
                    ticket_id: ticket.id,
                    plan_name: ticket.plan_name,
                    start_date: ticket.start_date,
                    old_end_date: ticket.end_date,
                    new_end_date: fixed.end_date,
                });
            }
        }
        Ok::<_, AppError>(repairs)
    }
    .await;
    let repairs = DatabaseTransaction::finish(tx, result).await?;

    log::info!("Repaired {} degenerate ticket windows", repairs.len());
    Ok(repairs)
}
