//! Member inquiries. Staff answer each one exactly once.

use uuid::Uuid;

use crate::AppState;
use crate::database::models::{Inquiry, InquiryFilter, InquiryInput, ReplyInput};
use crate::database::repositories::{inquiry as inquiry_repo, member as member_repo};
use crate::error::{AppError, AppResult};
use crate::services::auth::Caller;

pub async fn create_inquiry(state: &AppState, caller: &Caller, input: InquiryInput) -> AppResult<Inquiry> {
    let member_id = input.member_id.unwrap_or_else(|| caller.id());
    caller.require_self_or_admin(member_id)?;
    input.validate().map_err(AppError::ValidationError)?;

    let mut conn = state.pool.acquire().await?;
    if member_repo::find_by_id(&mut conn, member_id).await?.is_none() {
        return Err(AppError::not_found("member", member_id));
    }

    let inquiry = Inquiry::new(member_id, input, state.now());
    inquiry_repo::create_inquiry(&mut conn, &inquiry).await?;
    log::info!(
        "Member {} filed {} inquiry {}",
        member_id,
        inquiry.category,
        inquiry.id
    );
    Ok(inquiry)
}

/// Members only see their own inquiries.
pub async fn list_inquiries(
    state: &AppState,
    caller: &Caller,
    filter: InquiryFilter,
) -> AppResult<Vec<Inquiry>> {
    let member_id = match caller {
        Caller::Admin { .. } => filter.member_id,
        Caller::Member { id } => Some(*id),
    };
    let mut conn = state.pool.acquire().await?;
    Ok(inquiry_repo::list_inquiries(&mut conn, member_id, filter.status).await?)
}

pub async fn get_inquiry(state: &AppState, caller: &Caller, inquiry_id: Uuid) -> AppResult<Inquiry> {
    let mut conn = state.pool.acquire().await?;
    let inquiry = inquiry_repo::find_by_id(&mut conn, inquiry_id)
        .await?
        .ok_or_else(|| AppError::not_found("inquiry", inquiry_id))?;
    caller.require_self_or_admin(inquiry.member_id)?;
    Ok(inquiry)
}

pub async fn reply_inquiry(
    state: &AppState,
    caller: &Caller,
    inquiry_id: Uuid,
    input: ReplyInput,
) -> AppResult<Inquiry> {
    caller.require_admin()?;
    let reply = input.reply.trim();
    if reply.is_empty() {
        return Err(AppError::ValidationError("reply is required".to_string()));
    }

    let mut conn = state.pool.acquire().await?;
    if let Some(answered) =
        inquiry_repo::answer_inquiry(&mut conn, inquiry_id, reply, caller.id(), state.now()).await?
    {
        log::info!("Answered inquiry {}", inquiry_id);
        return Ok(answered);
    }

    match inquiry_repo::find_by_id(&mut conn, inquiry_id).await? {
        None => Err(AppError::not_found("inquiry", inquiry_id)),
        Some(existing) => Err(AppError::InvalidTransition(format!(
            "inquiry {} is already {}",
            inquiry_id, existing.status
        ))),
    }
}
