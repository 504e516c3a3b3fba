use uuid::Uuid;

use crate::AppState;
use crate::database::models::{PaymentEvent, PaymentEventInput};
use crate::database::repositories::payment as payment_repo;
use crate::error::{AppError, AppResult};
use crate::services::auth::Caller;

/// Store a gateway confirmation. This never issues tickets; replays of the
/// same external id are absorbed.
pub async fn record_payment_event(
    state: &AppState,
    caller: &Caller,
    input: PaymentEventInput,
) -> AppResult<PaymentEvent> {
    caller.require_admin()?;
    if input.external_id.trim().is_empty() {
        return Err(AppError::ValidationError(
            "external id is required".to_string(),
        ));
    }
    if input.amount.is_some_and(|amount| amount < 0) {
        return Err(AppError::ValidationError(
            "amount must not be negative".to_string(),
        ));
    }

    let mut conn = state.pool.acquire().await?;
    let event = payment_repo::record_event(&mut conn, &input, state.now()).await?;
    log::info!(
        "Recorded payment event {} for member {}",
        event.external_id,
        event.member_id
    );
    Ok(event)
}

pub async fn member_payment_events(
    state: &AppState,
    caller: &Caller,
    member_id: Uuid,
) -> AppResult<Vec<PaymentEvent>> {
    caller.require_self_or_admin(member_id)?;
    let mut conn = state.pool.acquire().await?;
    Ok(payment_repo::list_for_member(&mut conn, member_id).await?)
}
