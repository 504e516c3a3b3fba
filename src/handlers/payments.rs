use actix_web::{
    HttpResponse, Result,
    web::{Data, Json},
};

use crate::AppState;
use crate::database::models::PaymentEventInput;
use crate::handlers::shared::ApiResponse;
use crate::services::{Caller, payments};

/// Gateway confirmation relay. Informational: no ticket is issued here.
pub async fn payment_webhook(
    state: Data<AppState>,
    caller: Caller,
    input: Json<PaymentEventInput>,
) -> Result<HttpResponse> {
    let event = payments::record_payment_event(&state, &caller, input.into_inner()).await?;
    Ok(ApiResponse::ok(event))
}
