//! Member requests and their one-way administrator decisions.

use uuid::Uuid;

use crate::AppState;
use crate::database::DatabaseTransaction;
use crate::database::models::{
    CreateRequestInput, MemberRequest, RequestDecision, RequestFilter, RequestInput,
    RequestPayload, RequestStatus, RequestType,
};
use crate::database::repositories::{
    member as member_repo, request as request_repo, ticket as ticket_repo,
};
use crate::error::{AppError, AppResult};
use crate::services::auth::Caller;
use crate::services::catalog::PlanCatalog;
use crate::services::entitlements::{self, TicketOrder};

/// Payment method recorded on tickets and sales created by an approval;
/// settlement happens outside the engine.
pub const APPROVAL_PAYMENT_METHOD: &str = "pending";

fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(AppError::ValidationError(format!("{} is required", field)))
    } else {
        Ok(value.to_string())
    }
}

/// Turn member input into a stored payload, pricing purchases from the
/// catalog.
pub fn to_payload(input: RequestInput, catalog: &PlanCatalog) -> AppResult<RequestPayload> {
    match input {
        RequestInput::Purchase { plan_id } => {
            let plan = catalog
                .find(&plan_id)
                .ok_or_else(|| AppError::ValidationError(format!("unknown plan {}", plan_id)))?;
            Ok(RequestPayload::Purchase {
                plan_id: plan.id.clone(),
                plan_name: plan.name.clone(),
                amount: plan.price,
            })
        }
        RequestInput::Pause { start, end, reason } => {
            if end <= start {
                return Err(AppError::ValidationError(format!(
                    "pause end {} must be after start {}",
                    end, start
                )));
            }
            Ok(RequestPayload::Pause {
                start,
                end,
                reason: required(&reason, "reason")?,
            })
        }
        RequestInput::Refund {
            bank,
            account,
            reason,
        } => Ok(RequestPayload::Refund {
            bank: required(&bank, "bank")?,
            account: required(&account, "account")?,
            reason: required(&reason, "reason")?,
        }),
    }
}

pub async fn create_request(
    state: &AppState,
    caller: &Caller,
    input: CreateRequestInput,
) -> AppResult<MemberRequest> {
    let member_id = input.member_id.unwrap_or_else(|| caller.id());
    caller.require_self_or_admin(member_id)?;
    let payload = to_payload(input.request, &state.catalog)?;

    let mut conn = state.pool.acquire().await?;
    if member_repo::find_by_id(&mut conn, member_id).await?.is_none() {
        return Err(AppError::not_found("member", member_id));
    }

    let request = MemberRequest::new(member_id, payload, state.now());
    request_repo::create_request(&mut conn, &request).await?;
    log::info!(
        "Member {} filed {} request {}",
        member_id,
        request.request_type,
        request.id
    );
    Ok(request)
}

/// Members only ever see their own requests, whatever the filter says.
pub async fn list_requests(
    state: &AppState,
    caller: &Caller,
    filter: RequestFilter,
) -> AppResult<Vec<MemberRequest>> {
    let member_id = match caller {
        Caller::Admin { .. } => filter.member_id,
        Caller::Member { id } => Some(*id),
    };
    let mut conn = state.pool.acquire().await?;
    Ok(request_repo::list_requests(&mut conn, member_id, filter.status, filter.request_type).await?)
}

pub async fn get_request(state: &AppState, caller: &Caller, request_id: Uuid) -> AppResult<MemberRequest> {
    let mut conn = state.pool.acquire().await?;
    let request = request_repo::find_by_id(&mut conn, request_id)
        .await?
        .ok_or_else(|| AppError::not_found("request", request_id))?;
    caller.require_self_or_admin(request.member_id)?;
    Ok(request)
}

/// Claim the pending request for `status`, explaining a refusal.
async fn decide(
    conn: &mut sqlx::SqliteConnection,
    caller: &Caller,
    request_id: Uuid,
    status: RequestStatus,
    now: chrono::DateTime<chrono::Utc>,
) -> AppResult<MemberRequest> {
    if let Some(decided) = request_repo::decide_request(conn, request_id, status, caller.id(), now).await? {
        return Ok(decided);
    }
    match request_repo::find_by_id(conn, request_id).await? {
        None => Err(AppError::not_found("request", request_id)),
        Some(existing) => {
            log::warn!(
                "Refusing to mark request {} {}: already {}",
                request_id,
                status,
                existing.status
            );
            let issued = match existing.request_type {
                RequestType::Purchase => ticket_repo::find_by_request(conn, request_id).await?,
                _ => None,
            };
            let message = match issued {
                Some(ticket) => format!(
                    "request {} is already {} (ticket {})",
                    request_id, existing.status, ticket.id
                ),
                None => format!("request {} is already {}", request_id, existing.status),
            };
            Err(AppError::InvalidTransition(message))
        }
    }
}

/// Approve a pending request. A purchase issues its ticket and sale in the
/// same transaction as the status change; pause and refund only change the
/// status.
pub async fn approve(state: &AppState, caller: &Caller, request_id: Uuid) -> AppResult<RequestDecision> {
    caller.require_admin()?;
    let now = state.now();

    let mut tx = DatabaseTransaction::begin(&state.pool).await?;
    let result: AppResult<RequestDecision> = async {
        let request = decide(&mut tx, caller, request_id, RequestStatus::Approved, now).await?;

        if request.request_type != RequestType::Purchase {
            log::info!(
                "Approved {} request {}; entitlements left unchanged",
                request.request_type,
                request_id
            );
            return Ok(RequestDecision {
                request,
                issuance: None,
                side_effects_applied: false,
            });
        }

        let plan = state
            .catalog
            .resolve(request.plan_id.as_deref(), request.plan_name.as_deref())
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "request {} refers to a plan that is no longer offered",
                    request_id
                ))
            })?;
        let order = TicketOrder {
            amount: request.amount.unwrap_or(plan.price),
            request_id: Some(request.id),
            ..TicketOrder::new(plan, request.member_id, now.date_naive(), APPROVAL_PAYMENT_METHOD)
        };
        let issuance =
            entitlements::issue_on(&mut tx, &order, state.catalog.validity_days(plan), now).await?;

        log::info!(
            "Approved purchase request {}; issued ticket {}",
            request_id,
            issuance.ticket.id
        );
        Ok(RequestDecision {
            request,
            issuance: Some(issuance),
            side_effects_applied: true,
        })
    }
    .await;
    DatabaseTransaction::finish(tx, result).await
}

pub async fn reject(state: &AppState, caller: &Caller, request_id: Uuid) -> AppResult<RequestDecision> {
    caller.require_admin()?;
    let mut conn = state.pool.acquire().await?;
    let request = decide(&mut conn, caller, request_id, RequestStatus::Rejected, state.now()).await?;
    log::info!("Rejected request {}", request_id);
    Ok(RequestDecision {
        request,
        issuance: None,
        side_effects_applied: false,
    })
}
