//! Check-in/check-out tracking. A member has at most one open session.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{AttendanceRecord, AttendanceView};
use crate::database::repositories::{attendance as attendance_repo, member as member_repo};
use crate::error::{AppError, AppResult};
use crate::services::auth::Caller;
use crate::services::status::day_start;

pub async fn check_in(state: &AppState, caller: &Caller, member_id: Uuid) -> AppResult<AttendanceRecord> {
    caller.require_self_or_admin(member_id)?;
    let mut conn = state.pool.acquire().await?;
    if member_repo::find_by_id(&mut conn, member_id).await?.is_none() {
        return Err(AppError::not_found("member", member_id));
    }

    let record = attendance_repo::check_in(&mut conn, member_id, state.now())
        .await
        .map_err(|e| {
            AppError::conflict_on_unique(e, format!("member {} is already checked in", member_id))
        })?;
    log::info!("Member {} checked in ({})", member_id, record.id);
    Ok(record)
}

pub async fn check_out(state: &AppState, caller: &Caller, record_id: Uuid) -> AppResult<AttendanceView> {
    let mut conn = state.pool.acquire().await?;
    let record = attendance_repo::find_by_id(&mut conn, record_id)
        .await?
        .ok_or_else(|| AppError::not_found("attendance record", record_id))?;
    caller.require_self_or_admin(record.member_id)?;

    let closed = attendance_repo::check_out(&mut conn, record_id, state.now())
        .await?
        .ok_or_else(|| {
            AppError::AlreadyClosed(format!("attendance record {} is already checked out", record_id))
        })?;
    log::info!(
        "Member {} checked out after {:?} minutes",
        closed.member_id,
        closed.duration().map(|d| d.num_minutes())
    );
    Ok(closed.view())
}

/// Members checked in on `date` who have not checked out.
pub async fn currently_in(state: &AppState, caller: &Caller, date: NaiveDate) -> AppResult<Vec<AttendanceRecord>> {
    Ok(daily(state, caller, date)
        .await?
        .into_iter()
        .map(|view| view.record)
        .filter(AttendanceRecord::is_open)
        .collect())
}

/// Every record whose check-in falls on `date`.
pub async fn daily(state: &AppState, caller: &Caller, date: NaiveDate) -> AppResult<Vec<AttendanceView>> {
    caller.require_admin()?;
    let from = day_start(date);
    let to = from + Duration::days(1);
    let mut conn = state.pool.acquire().await?;
    Ok(attendance_repo::list_between(&mut conn, from, to)
        .await?
        .into_iter()
        .map(AttendanceRecord::view)
        .collect())
}

pub async fn member_history(state: &AppState, caller: &Caller, member_id: Uuid) -> AppResult<Vec<AttendanceView>> {
    caller.require_self_or_admin(member_id)?;
    let mut conn = state.pool.acquire().await?;
    Ok(attendance_repo::list_for_member(&mut conn, member_id)
        .await?
        .into_iter()
        .map(AttendanceRecord::view)
        .collect())
}

pub async fn open_session(state: &AppState, caller: &Caller, member_id: Uuid) -> AppResult<Option<AttendanceRecord>> {
    caller.require_self_or_admin(member_id)?;
    let mut conn = state.pool.acquire().await?;
    Ok(attendance_repo::find_open_for_member(&mut conn, member_id).await?)
}
