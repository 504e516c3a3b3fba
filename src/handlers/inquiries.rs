use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path, Query},
};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{InquiryFilter, InquiryInput, ReplyInput};
use crate::handlers::shared::ApiResponse;
use crate::services::{Caller, inquiries};

pub async fn create_inquiry(
    state: Data<AppState>,
    caller: Caller,
    input: Json<InquiryInput>,
) -> Result<HttpResponse> {
    let inquiry = inquiries::create_inquiry(&state, &caller, input.into_inner()).await?;
    Ok(ApiResponse::created(inquiry))
}

pub async fn list_inquiries(
    state: Data<AppState>,
    caller: Caller,
    query: Query<InquiryFilter>,
) -> Result<HttpResponse> {
    let inquiries = inquiries::list_inquiries(&state, &caller, query.into_inner()).await?;
    Ok(ApiResponse::ok(inquiries))
}

pub async fn get_inquiry(state: Data<AppState>, caller: Caller, path: Path<Uuid>) -> Result<HttpResponse> {
    let inquiry = inquiries::get_inquiry(&state, &caller, path.into_inner()).await?;
    Ok(ApiResponse::ok(inquiry))
}

pub async fn reply_inquiry(
    state: Data<AppState>,
    caller: Caller,
    path: Path<Uuid>,
    input: Json<ReplyInput>,
) -> Result<HttpResponse> {
    let inquiry =
        inquiries::reply_inquiry(&state, &caller, path.into_inner(), input.into_inner()).await?;
    Ok(ApiResponse::ok(inquiry))
}
