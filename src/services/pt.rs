//! PT scheduler: trainer slot bookings and delivered sessions.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::AppState;
use crate::database::DatabaseTransaction;
use crate::database::models::{
    BookingInput, CompleteBookingInput, CompletedBooking, Schedule, ScheduleStatus, TimeSlot,
};
use crate::database::repositories::{
    member as member_repo, schedule as schedule_repo, ticket as ticket_repo,
    trainer as trainer_repo,
};
use crate::error::{AppError, AppResult};
use crate::services::auth::Caller;
use crate::services::entitlements;

/// Book a live slot. The partial unique index decides races: the loser gets
/// `Conflict`.
pub async fn book(state: &AppState, caller: &Caller, input: BookingInput) -> AppResult<Schedule> {
    caller.require_self_or_admin(input.member_id)?;
    let mut conn = state.pool.acquire().await?;

    if member_repo::find_by_id(&mut conn, input.member_id).await?.is_none() {
        return Err(AppError::not_found("member", input.member_id));
    }
    if trainer_repo::find_by_id(&mut conn, input.trainer_id).await?.is_none() {
        return Err(AppError::not_found("trainer", input.trainer_id));
    }

    let schedule = schedule_repo::create_booking(&mut conn, &input, state.now())
        .await
        .map_err(|e| {
            AppError::conflict_on_unique(
                e,
                format!(
                    "trainer {} is already booked on {} at {}",
                    input.trainer_id, input.date, input.time
                ),
            )
        })?;

    log::info!(
        "Booked trainer {} for member {} on {} at {}",
        schedule.trainer_id,
        schedule.member_id,
        schedule.date,
        schedule.time
    );
    Ok(schedule)
}

async fn find_booking(conn: &mut sqlx::SqliteConnection, schedule_id: Uuid) -> AppResult<Schedule> {
    schedule_repo::find_by_id(conn, schedule_id)
        .await?
        .ok_or_else(|| AppError::not_found("booking", schedule_id))
}

fn not_scheduled(schedule: &Schedule) -> AppError {
    AppError::InvalidTransition(format!(
        "booking {} is already {}",
        schedule.id, schedule.status
    ))
}

/// Cancel a scheduled booking, freeing its slot.
pub async fn cancel(state: &AppState, caller: &Caller, schedule_id: Uuid) -> AppResult<Schedule> {
    let mut conn = state.pool.acquire().await?;
    let schedule = find_booking(&mut conn, schedule_id).await?;
    caller.require_self_or_admin(schedule.member_id)?;

    let cancelled = schedule_repo::transition_from_scheduled(
        &mut conn,
        schedule_id,
        ScheduleStatus::Cancelled,
        state.now(),
    )
    .await?;
    match cancelled {
        Some(cancelled) => {
            log::info!("Cancelled booking {}", schedule_id);
            Ok(cancelled)
        }
        None => {
            let current = find_booking(&mut conn, schedule_id).await?;
            Err(not_scheduled(&current))
        }
    }
}

/// Mark a booking delivered, optionally drawing one session from a pack in
/// the same transaction. An exhausted pack leaves the booking scheduled.
pub async fn complete_booking(
    state: &AppState,
    caller: &Caller,
    schedule_id: Uuid,
    input: CompleteBookingInput,
) -> AppResult<CompletedBooking> {
    caller.require_admin()?;
    let now = state.now();

    let mut tx = DatabaseTransaction::begin(&state.pool).await?;
    let result: AppResult<CompletedBooking> = async {
        let booking = find_booking(&mut tx, schedule_id).await?;
        let Some(schedule) =
            schedule_repo::transition_from_scheduled(&mut tx, schedule_id, ScheduleStatus::Completed, now)
                .await?
        else {
            return Err(not_scheduled(&booking));
        };

        let ticket = match input.ticket_id {
            Some(ticket_id) => {
                let pack = ticket_repo::find_by_id(&mut tx, ticket_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("ticket", ticket_id))?;
                if pack.member_id != schedule.member_id {
                    return Err(AppError::ValidationError(format!(
                        "ticket {} does not belong to member {}",
                        ticket_id, schedule.member_id
                    )));
                }
                Some(entitlements::consume_on(&mut tx, ticket_id, now).await?)
            }
            None => None,
        };

        log::info!("Completed booking {}", schedule_id);
        Ok(CompletedBooking { schedule, ticket })
    }
    .await;
    DatabaseTransaction::finish(tx, result).await
}

pub async fn daily_schedule(state: &AppState, caller: &Caller, date: NaiveDate) -> AppResult<Vec<Schedule>> {
    caller.require_admin()?;
    let mut conn = state.pool.acquire().await?;
    Ok(schedule_repo::list_for_date(&mut conn, date).await?)
}

/// Slots on `date` that the trainer has no live booking for.
pub async fn free_slots(state: &AppState, trainer_id: Uuid, date: NaiveDate) -> AppResult<Vec<TimeSlot>> {
    let mut conn = state.pool.acquire().await?;
    if trainer_repo::find_by_id(&mut conn, trainer_id).await?.is_none() {
        return Err(AppError::not_found("trainer", trainer_id));
    }
    let taken: Vec<TimeSlot> = schedule_repo::list_for_date(&mut conn, date)
        .await?
        .into_iter()
        .filter(|s| s.trainer_id == trainer_id && s.status != ScheduleStatus::Cancelled)
        .map(|s| s.time)
        .collect();

    Ok(TimeSlot::ALL
        .iter()
        .copied()
        .filter(|slot| !taken.contains(slot))
        .collect())
}

pub async fn member_bookings(state: &AppState, caller: &Caller, member_id: Uuid) -> AppResult<Vec<Schedule>> {
    caller.require_self_or_admin(member_id)?;
    let mut conn = state.pool.acquire().await?;
    Ok(schedule_repo::list_for_member(&mut conn, member_id).await?)
}

/// First day of the month and first day of the following month.
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::ValidationError(format!("invalid month {}-{}", year, month));
    let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let to = if from.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((from, to))
}

pub async fn trainer_monthly_completed(
    state: &AppState,
    caller: &Caller,
    trainer_id: Uuid,
    year: i32,
    month: u32,
) -> AppResult<i64> {
    caller.require_admin()?;
    let (from, to) = month_bounds(year, month)?;
    let mut conn = state.pool.acquire().await?;
    if trainer_repo::find_by_id(&mut conn, trainer_id).await?.is_none() {
        return Err(AppError::not_found("trainer", trainer_id));
    }
    Ok(schedule_repo::count_completed_for_trainer(&mut conn, trainer_id, from, to).await?)
}
