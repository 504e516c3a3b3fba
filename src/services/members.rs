use uuid::Uuid;

use crate::AppState;
use crate::database::DatabaseTransaction;
use crate::database::models::{
    Member, MemberInput, Plan, PlanKind, Registration, RegistrationInput,
};
use crate::database::repositories::{locker as locker_repo, member as member_repo};
use crate::error::{AppError, AppResult};
use crate::services::auth::Caller;
use crate::services::entitlements::{self, TicketOrder};
use crate::services::lockers;

pub async fn register_member(state: &AppState, caller: &Caller, input: MemberInput) -> AppResult<Member> {
    caller.require_admin()?;
    input.validate().map_err(AppError::ValidationError)?;

    let member = Member::new(input, state.now());
    let mut conn = state.pool.acquire().await?;
    member_repo::create_member(&mut conn, &member).await?;
    log::info!("Registered member {} ({})", member.id, member.name);
    Ok(member)
}

fn plan_of_kind<'a>(state: &'a AppState, plan_id: Option<&str>, kind: PlanKind) -> AppResult<Option<&'a Plan>> {
    let Some(plan_id) = plan_id else {
        return Ok(None);
    };
    match state.catalog.find(plan_id) {
        Some(plan) if plan.kind == kind => Ok(Some(plan)),
        Some(plan) => Err(AppError::ValidationError(format!(
            "plan {} is a {} plan, expected {}",
            plan_id, plan.kind, kind
        ))),
        None => Err(AppError::ValidationError(format!("unknown plan {}", plan_id))),
    }
}

/// Sign up a member and sell the chosen plans in one transaction. A locker
/// plan goes through the allocator, so an occupied locker aborts the whole
/// registration.
pub async fn register_with_plans(
    state: &AppState,
    caller: &Caller,
    input: RegistrationInput,
) -> AppResult<Registration> {
    caller.require_admin()?;
    input.member.validate().map_err(AppError::ValidationError)?;

    let plans: Vec<&Plan> = [
        plan_of_kind(state, input.membership_plan_id.as_deref(), PlanKind::Membership)?,
        plan_of_kind(state, input.pt_plan_id.as_deref(), PlanKind::Pt)?,
    ]
    .into_iter()
    .flatten()
    .collect();
    let locker_plan = plan_of_kind(state, input.locker_plan_id.as_deref(), PlanKind::Locker)?;
    if input.locker_number.is_some() && locker_plan.is_none() {
        return Err(AppError::ValidationError(
            "a locker number needs a locker plan".to_string(),
        ));
    }

    let RegistrationInput {
        member,
        locker_number,
        start_date,
        payment_method,
        ..
    } = input;
    let now = state.now();
    let pool_size = state.config.locker_pool_size;
    let member = Member::new(member, now);

    let mut tx = DatabaseTransaction::begin(&state.pool).await?;
    let result: AppResult<Registration> = async {
        member_repo::create_member(&mut tx, &member).await?;

        let mut issuances = Vec::new();
        for plan in plans.iter().copied().chain(locker_plan) {
            let order = TicketOrder::new(plan, member.id, start_date, &payment_method);
            issuances.push(
                entitlements::issue_on(&mut tx, &order, state.catalog.validity_days(plan), now).await?,
            );
        }

        let locker = match locker_plan {
            Some(plan) => {
                let number = match locker_number {
                    Some(number) => number,
                    None => locker_repo::first_assignable(&mut tx, pool_size, now.date_naive())
                        .await?
                        .ok_or_else(|| AppError::Conflict("no locker is available".to_string()))?,
                };
                let locker = lockers::assign_on(
                    &mut tx,
                    pool_size,
                    number,
                    member.id,
                    state.catalog.validity_days(plan),
                    now,
                )
                .await?;
                Some(locker.view(now))
            }
            None => None,
        };

        // Re-read so the locker back-reference is reflected.
        let member = member_repo::find_by_id(&mut tx, member.id)
            .await?
            .ok_or_else(|| AppError::not_found("member", member.id))?;
        Ok(Registration {
            member,
            issuances,
            locker,
        })
    }
    .await;
    let registration = DatabaseTransaction::finish(tx, result).await?;

    log::info!(
        "Registered member {} with {} plan(s)",
        registration.member.id,
        registration.issuances.len()
    );
    Ok(registration)
}

pub async fn get_member(state: &AppState, caller: &Caller, member_id: Uuid) -> AppResult<Member> {
    caller.require_self_or_admin(member_id)?;
    let mut conn = state.pool.acquire().await?;
    member_repo::find_by_id(&mut conn, member_id)
        .await?
        .ok_or_else(|| AppError::not_found("member", member_id))
}

pub async fn list_members(state: &AppState, caller: &Caller) -> AppResult<Vec<Member>> {
    caller.require_admin()?;
    let mut conn = state.pool.acquire().await?;
    Ok(member_repo::list_members(&mut conn).await?)
}
