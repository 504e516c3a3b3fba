use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path, Query},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{AssignTrainerInput, IssueTicketInput, PlanKind};
use crate::handlers::shared::ApiResponse;
use crate::services::{Caller, entitlements};

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub kind: Option<PlanKind>,
}

pub async fn issue_ticket(
    state: Data<AppState>,
    caller: Caller,
    input: Json<IssueTicketInput>,
) -> Result<HttpResponse> {
    let issuance = entitlements::issue_ticket(&state, &caller, input.into_inner()).await?;
    Ok(ApiResponse::created(issuance))
}

pub async fn list_tickets(
    state: Data<AppState>,
    caller: Caller,
    query: Query<TicketQuery>,
) -> Result<HttpResponse> {
    let tickets = entitlements::list_all_tickets(&state, &caller, query.kind).await?;
    Ok(ApiResponse::ok(tickets))
}

/// Record a delivered PT session against a pack
pub async fn consume_session(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let ticket = entitlements::record_session(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(ticket))
}

pub async fn assign_trainer(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
    input: Json<AssignTrainerInput>,
) -> Result<HttpResponse> {
    let ticket =
        entitlements::assign_trainer(&state, &caller, path.into_inner(), input.into_inner()).await?;
    Ok(ApiResponse::ok(ticket))
}

pub async fn fix_degenerate_windows(state: Data<AppState>, caller: Caller) -> Result<HttpResponse> {
    let repairs = entitlements::fix_degenerate_windows(&state, &caller).await?;
    Ok(ApiResponse::ok(repairs))
}

pub async fn list_plans(state: Data<AppState>, _caller: Caller) -> Result<HttpResponse> {
    Ok(ApiResponse::ok(state.catalog.plans().to_vec()))
}
