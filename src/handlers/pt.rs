use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path, Query},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{BookingInput, CompleteBookingInput, TrainerInput};
use crate::handlers::shared::ApiResponse;
use crate::services::{Caller, pt, trainers};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCompleted {
    pub trainer_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub completed: i64,
}

// Bookings

pub async fn book(
    state: Data<AppState>,
    caller: Caller,
    input: Json<BookingInput>,
) -> Result<HttpResponse> {
    let schedule = pt::book(&state, &caller, input.into_inner()).await?;
    Ok(ApiResponse::created(schedule))
}

pub async fn cancel_booking(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let schedule = pt::cancel(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(schedule))
}

pub async fn complete_booking(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
    input: Option<Json<CompleteBookingInput>>,
) -> Result<HttpResponse> {
    let input = input.map(Json::into_inner).unwrap_or_default();
    let completed = pt::complete_booking(&state, &caller, path.into_inner(), input).await?;
    Ok(ApiResponse::ok(completed))
}

pub async fn daily_schedule(
    state: Data<AppState>,
    caller: Caller,
    query: Query<DateQuery>,
) -> Result<HttpResponse> {
    let schedule = pt::daily_schedule(&state, &caller, query.date).await?;
    Ok(ApiResponse::ok(schedule))
}

// Trainers

pub async fn create_trainer(
    state: Data<AppState>,
    caller: Caller,
    input: Json<TrainerInput>,
) -> Result<HttpResponse> {
    let trainer = trainers::create_trainer(&state, &caller, input.into_inner()).await?;
    Ok(ApiResponse::created(trainer))
}

pub async fn list_trainers(state: Data<AppState>, _caller: Caller) -> Result<HttpResponse> {
    let trainers = trainers::list_trainers(&state).await?;
    Ok(ApiResponse::ok(trainers))
}

pub async fn get_trainer(
    state: Data<AppState>,
    _caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let trainer = trainers::get_trainer(&state, path.into_inner()).await?;
    Ok(ApiResponse::ok(trainer))
}

pub async fn update_trainer(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
    input: Json<TrainerInput>,
) -> Result<HttpResponse> {
    let trainer =
        trainers::update_trainer(&state, &caller, path.into_inner(), input.into_inner()).await?;
    Ok(ApiResponse::ok(trainer))
}

pub async fn delete_trainer(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    trainers::delete_trainer(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::message("Trainer deleted"))
}

pub async fn free_slots(
    state: Data<AppState>,
    _caller: Caller,
    path: Path<Uuid>,
    query: Query<DateQuery>,
) -> Result<HttpResponse> {
    let slots = pt::free_slots(&state, path.into_inner(), query.date).await?;
    Ok(ApiResponse::ok(slots))
}

pub async fn monthly_completed(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
    query: Query<MonthQuery>,
) -> Result<HttpResponse> {
    let trainer_id = path.into_inner();
    let completed =
        pt::trainer_monthly_completed(&state, &caller, trainer_id, query.year, query.month).await?;
    Ok(ApiResponse::ok(MonthlyCompleted {
        trainer_id,
        year: query.year,
        month: query.month,
        completed,
    }))
}
