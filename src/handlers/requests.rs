use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path, Query},
};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{CreateRequestInput, RequestFilter};
use crate::handlers::shared::ApiResponse;
use crate::services::{Caller, requests};

pub async fn create_request(
    state: Data<AppState>,
    caller: Caller,
    input: Json<CreateRequestInput>,
) -> Result<HttpResponse> {
    let request = requests::create_request(&state, &caller, input.into_inner()).await?;
    Ok(ApiResponse::created(request))
}

pub async fn list_requests(
    state: Data<AppState>,
    caller: Caller,
    query: Query<RequestFilter>,
) -> Result<HttpResponse> {
    let requests = requests::list_requests(&state, &caller, query.into_inner()).await?;
    Ok(ApiResponse::ok(requests))
}

pub async fn get_request(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let request = requests::get_request(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(request))
}

pub async fn approve_request(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let decision = requests::approve(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(decision))
}

pub async fn reject_request(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let decision = requests::reject(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(decision))
}
