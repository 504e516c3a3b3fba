use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path, Query},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::CheckInInput;
use crate::handlers::shared::ApiResponse;
use crate::services::{Caller, attendance};

#[derive(Debug, Deserialize)]
pub struct AttendanceQuery {
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

pub async fn check_in(
    state: Data<AppState>,
    caller: Caller,
    input: Json<CheckInInput>,
) -> Result<HttpResponse> {
    let record = attendance::check_in(&state, &caller, input.member_id).await?;
    Ok(ApiResponse::created(record))
}

pub async fn check_out(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let record = attendance::check_out(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(record))
}

pub async fn daily_attendance(
    state: Data<AppState>,
    caller: Caller,
    query: Query<AttendanceQuery>,
) -> Result<HttpResponse> {
    let date = query.date.unwrap_or_else(|| state.today());
    let records = attendance::daily(&state, &caller, date).await?;
    Ok(ApiResponse::ok(records))
}

pub async fn currently_in(
    state: Data<AppState>,
    caller: Caller,
    query: Query<AttendanceQuery>,
) -> Result<HttpResponse> {
    let date = query.date.unwrap_or_else(|| state.today());
    let records = attendance::currently_in(&state, &caller, date).await?;
    Ok(ApiResponse::ok(records))
}
