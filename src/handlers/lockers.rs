use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path},
};

use crate::AppState;
use crate::database::models::{AssignLockerInput, MaintenanceInput};
use crate::handlers::shared::ApiResponse;
use crate::services::{Caller, lockers};

pub async fn list_lockers(state: Data<AppState>, caller: Caller) -> Result<HttpResponse> {
    let pool = lockers::list(&state, &caller).await?;
    Ok(ApiResponse::ok(pool))
}

pub async fn get_summary(state: Data<AppState>, caller: Caller) -> Result<HttpResponse> {
    let summary = lockers::summary(&state, &caller).await?;
    Ok(ApiResponse::ok(summary))
}

pub async fn get_locker(
    state: Data<AppState>,
    caller: Caller,
    path: Path<i32>,
) -> Result<HttpResponse> {
    let locker = lockers::find(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(locker))
}

pub async fn assign_locker(
    state: Data<AppState>,
    caller: Caller,
    path: Path<i32>,
    input: Json<AssignLockerInput>,
) -> Result<HttpResponse> {
    let locker = lockers::assign(&state, &caller, path.into_inner(), input.into_inner()).await?;
    Ok(ApiResponse::ok(locker))
}

pub async fn release_locker(
    state: Data<AppState>,
    caller: Caller,
    path: Path<i32>,
) -> Result<HttpResponse> {
    let locker = lockers::release(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(locker))
}

pub async fn set_maintenance(
    state: Data<AppState>,
    caller: Caller,
    path: Path<i32>,
    input: Json<MaintenanceInput>,
) -> Result<HttpResponse> {
    let locker =
        lockers::set_maintenance(&state, &caller, path.into_inner(), input.into_inner()).await?;
    Ok(ApiResponse::ok(locker))
}
