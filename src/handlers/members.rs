use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path},
};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{MemberInput, RegistrationInput};
use crate::handlers::shared::ApiResponse;
use crate::services::{Caller, attendance, entitlements, members, payments, pt};

pub async fn register_member(
    state: Data<AppState>,
    caller: Caller,
    input: Json<MemberInput>,
) -> Result<HttpResponse> {
    let member = members::register_member(&state, &caller, input.into_inner()).await?;
    Ok(ApiResponse::created(member))
}

pub async fn register_with_plans(
    state: Data<AppState>,
    caller: Caller,
    input: Json<RegistrationInput>,
) -> Result<HttpResponse> {
    let registration = members::register_with_plans(&state, &caller, input.into_inner()).await?;
    Ok(ApiResponse::created(registration))
}

pub async fn list_members(state: Data<AppState>, caller: Caller) -> Result<HttpResponse> {
    let members = members::list_members(&state, &caller).await?;
    Ok(ApiResponse::ok(members))
}

pub async fn get_member(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let member = members::get_member(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(member))
}

pub async fn get_member_tickets(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let tickets = entitlements::list_tickets(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(tickets))
}

pub async fn get_active_membership(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let membership = entitlements::active_membership(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(membership))
}

pub async fn get_member_sales(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let sales = entitlements::member_sales(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(sales))
}

pub async fn get_member_bookings(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let bookings = pt::member_bookings(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(bookings))
}

pub async fn get_member_attendance(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let history = attendance::member_history(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(history))
}

pub async fn get_member_payments(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let events = payments::member_payment_events(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(events))
}
