//! Locker allocator over a fixed pool of numbered lockers.
//!
//! Every write is a compare-and-swap on the row's `version` (or an insert
//! guarded by the primary key for a never-used number), and the member's
//! back-reference is updated in the same transaction.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::AppState;
use crate::database::DatabaseTransaction;
use crate::database::models::{
    AssignLockerInput, Locker, LockerStatus, LockerSummary, LockerView, MaintenanceInput,
};
use crate::database::repositories::{
    locker::{self as locker_repo, LockerState},
    member as member_repo,
};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::services::auth::Caller;
use crate::services::entitlements::add_days;

pub fn validate_number(locker_number: i32, pool_size: i32) -> AppResult<()> {
    if (1..=pool_size).contains(&locker_number) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "locker number {} is outside 1..={}",
            locker_number, pool_size
        )))
    }
}

/// Persist `state` for a locker, inserting the row on first use.
async fn write_locker(
    conn: &mut SqliteConnection,
    locker_number: i32,
    current: Option<&Locker>,
    state: &LockerState,
    now: DateTime<Utc>,
) -> AppResult<Locker> {
    let lost_race = || AppError::Conflict(format!("locker {} was modified concurrently", locker_number));
    match current {
        None => locker_repo::insert_locker(conn, locker_number, state, now)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    lost_race()
                } else {
                    AppError::from(e)
                }
            }),
        Some(locker) => locker_repo::update_locker(conn, locker_number, locker.version, state, now)
            .await?
            .ok_or_else(lost_race),
    }
}

/// Drop the previous holder's back-reference, if it still points here.
async fn detach_holder(conn: &mut SqliteConnection, locker: &Locker) -> AppResult<()> {
    if let Some(holder) = locker.member_id {
        member_repo::clear_locker(conn, holder, locker.locker_number).await?;
    }
    Ok(())
}

/// Free the member's previous locker once its rental has lapsed. A rental
/// that is still running blocks the new assignment.
async fn vacate_lapsed(
    conn: &mut SqliteConnection,
    member_id: Uuid,
    held: i32,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let previous = locker_repo::find_by_number(conn, held)
        .await?
        .filter(|locker| locker.member_id == Some(member_id));
    let Some(previous) = previous else {
        // Stale back-reference, the locker no longer names this member
        member_repo::clear_locker(conn, member_id, held).await?;
        return Ok(());
    };

    match previous.effective_status(now) {
        LockerStatus::Expired => {
            detach_holder(conn, &previous).await?;
            let vacant = LockerState::vacant(LockerStatus::Available);
            write_locker(conn, held, Some(&previous), &vacant, now).await?;
            log::info!(
                "Vacated expired locker {} of member {} before reassignment",
                held,
                member_id
            );
            Ok(())
        }
        _ => Err(AppError::Conflict(format!(
            "member {} already holds locker {}",
            member_id, held
        ))),
    }
}

/// Assign on `conn`. Used directly by registration so the whole sign-up
/// shares one transaction.
pub async fn assign_on(
    conn: &mut SqliteConnection,
    pool_size: i32,
    locker_number: i32,
    member_id: Uuid,
    duration_days: i64,
    now: DateTime<Utc>,
) -> AppResult<Locker> {
    validate_number(locker_number, pool_size)?;
    if duration_days <= 0 {
        return Err(AppError::ValidationError(format!(
            "locker duration must be positive, got {}",
            duration_days
        )));
    }

    let member = member_repo::find_by_id(conn, member_id)
        .await?
        .ok_or_else(|| AppError::not_found("member", member_id))?;
    if let Some(held) = member.locker_number.filter(|n| member.has_locker && *n != locker_number) {
        vacate_lapsed(conn, member_id, held, now).await?;
    }

    let current = locker_repo::find_by_number(conn, locker_number).await?;
    if let Some(locker) = &current {
        match locker.effective_status(now) {
            LockerStatus::Occupied => {
                log::warn!(
                    "Locker {} is occupied by {:?}; refusing assignment to {}",
                    locker_number,
                    locker.member_id,
                    member_id
                );
                return Err(AppError::Conflict(format!(
                    "locker {} is occupied",
                    locker_number
                )));
            }
            LockerStatus::Maintenance => {
                return Err(AppError::Conflict(format!(
                    "locker {} is under maintenance",
                    locker_number
                )));
            }
            LockerStatus::Available | LockerStatus::Expired => detach_holder(conn, locker).await?,
        }
    }

    let start_date = now.date_naive();
    let state = LockerState {
        status: LockerStatus::Occupied,
        member_id: Some(member_id),
        start_date: Some(start_date),
        end_date: Some(add_days(start_date, duration_days)?),
    };
    let locker = write_locker(conn, locker_number, current.as_ref(), &state, now).await?;
    member_repo::set_locker(conn, member_id, locker_number).await?;

    log::info!(
        "Assigned locker {} to member {} until {:?}",
        locker_number,
        member_id,
        locker.end_date
    );
    Ok(locker)
}

pub async fn assign(
    state: &AppState,
    caller: &Caller,
    locker_number: i32,
    input: AssignLockerInput,
) -> AppResult<LockerView> {
    caller.require_admin()?;
    let now = state.now();

    let mut tx = DatabaseTransaction::begin(&state.pool).await?;
    let result = assign_on(
        &mut tx,
        state.config.locker_pool_size,
        locker_number,
        input.member_id,
        input.duration_days,
        now,
    )
    .await;
    Ok(DatabaseTransaction::finish(tx, result).await?.view(now))
}

/// Free a locker and clear its holder's flag. Releasing a locker that is
/// already free is a no-op.
pub async fn release(state: &AppState, caller: &Caller, locker_number: i32) -> AppResult<LockerView> {
    caller.require_admin()?;
    validate_number(locker_number, state.config.locker_pool_size)?;
    let now = state.now();

    let mut tx = DatabaseTransaction::begin(&state.pool).await?;
    let result: AppResult<Locker> = async {
        let Some(locker) = locker_repo::find_by_number(&mut tx, locker_number).await? else {
            return Ok(Locker::placeholder(locker_number, now));
        };
        match locker.status {
            LockerStatus::Available => Ok(locker),
            LockerStatus::Maintenance => Err(AppError::InvalidTransition(format!(
                "locker {} is under maintenance; end maintenance instead",
                locker_number
            ))),
            LockerStatus::Occupied | LockerStatus::Expired => {
                detach_holder(&mut tx, &locker).await?;
                let vacant = LockerState::vacant(LockerStatus::Available);
                let released = write_locker(&mut tx, locker_number, Some(&locker), &vacant, now).await?;
                log::info!(
                    "Released locker {} from member {:?}",
                    locker_number,
                    locker.member_id
                );
                Ok(released)
            }
        }
    }
    .await;
    Ok(DatabaseTransaction::finish(tx, result).await?.view(now))
}

/// Toggle maintenance. Entering it evicts any holder; leaving it always
/// lands on `available`.
pub async fn set_maintenance(
    state: &AppState,
    caller: &Caller,
    locker_number: i32,
    input: MaintenanceInput,
) -> AppResult<LockerView> {
    caller.require_admin()?;
    validate_number(locker_number, state.config.locker_pool_size)?;
    let now = state.now();

    let mut tx = DatabaseTransaction::begin(&state.pool).await?;
    let result = async {
        let current = locker_repo::find_by_number(&mut tx, locker_number).await?;
        let in_maintenance = current
            .as_ref()
            .is_some_and(|locker| locker.status == LockerStatus::Maintenance);

        if input.enabled == in_maintenance {
            return Ok(current.unwrap_or_else(|| Locker::placeholder(locker_number, now)));
        }

        let target = if input.enabled {
            if let Some(locker) = &current {
                detach_holder(&mut tx, locker).await?;
            }
            LockerStatus::Maintenance
        } else {
            LockerStatus::Available
        };
        let locker = write_locker(
            &mut tx,
            locker_number,
            current.as_ref(),
            &LockerState::vacant(target),
            now,
        )
        .await?;
        log::info!("Locker {} is now {}", locker_number, target);
        Ok::<_, AppError>(locker)
    }
    .await;
    Ok(DatabaseTransaction::finish(tx, result).await?.view(now))
}

pub async fn find(state: &AppState, caller: &Caller, locker_number: i32) -> AppResult<LockerView> {
    caller.require_admin()?;
    validate_number(locker_number, state.config.locker_pool_size)?;
    let now = state.now();
    let mut conn = state.pool.acquire().await?;
    Ok(locker_repo::find_by_number(&mut conn, locker_number)
        .await?
        .unwrap_or_else(|| Locker::placeholder(locker_number, now))
        .view(now))
}

/// The whole pool in number order; never-used numbers appear as available.
pub async fn list(state: &AppState, caller: &Caller) -> AppResult<Vec<LockerView>> {
    caller.require_admin()?;
    let now = state.now();
    let mut conn = state.pool.acquire().await?;
    let stored = locker_repo::list_stored(&mut conn).await?;
    Ok(fill_pool(stored, state.config.locker_pool_size, now))
}

pub async fn summary(state: &AppState, caller: &Caller) -> AppResult<LockerSummary> {
    let views = list(state, caller).await?;
    Ok(LockerSummary::from_views(&views))
}

/// Merge stored rows (sorted by number) with placeholders for the gaps.
pub fn fill_pool(stored: Vec<Locker>, pool_size: i32, now: DateTime<Utc>) -> Vec<LockerView> {
    let mut stored = stored
        .into_iter()
        .filter(|locker| (1..=pool_size).contains(&locker.locker_number))
        .peekable();

    (1..=pool_size)
        .map(|number| match stored.next_if(|locker| locker.locker_number == number) {
            Some(locker) => locker.view(now),
            None => Locker::placeholder(number, now).view(now),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn occupied(number: i32, end: NaiveDate) -> Locker {
        Locker {
            locker_number: number,
            status: LockerStatus::Occupied,
            member_id: Some(Uuid::new_v4()),
            start_date: Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            end_date: Some(end),
            version: 3,
            updated_at: now(),
        }
    }

    #[test]
    fn test_validate_number_bounds() {
        assert!(validate_number(1, 200).is_ok());
        assert!(validate_number(200, 200).is_ok());
        assert!(matches!(validate_number(0, 200), Err(AppError::ValidationError(_))));
        assert!(matches!(validate_number(201, 200), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_fill_pool_synthesizes_placeholders() {
        let stored = vec![
            occupied(2, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()),
            occupied(4, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
            occupied(9, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()),
        ];

        let views = fill_pool(stored, 5, now());

        let statuses: Vec<_> = views.iter().map(|v| (v.locker_number, v.status)).collect();
        assert_eq!(
            statuses,
            vec![
                (1, LockerStatus::Available),
                (2, LockerStatus::Occupied),
                (3, LockerStatus::Available),
                (4, LockerStatus::Expired),
                (5, LockerStatus::Available),
            ]
        );
        assert_eq!(views[0].member_id, None);

        let summary = LockerSummary::from_views(&views);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.available, 3);
        assert_eq!(summary.occupied, 1);
        assert_eq!(summary.expired, 1);
    }
}
