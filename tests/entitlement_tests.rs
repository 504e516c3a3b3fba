use pretty_assertions::assert_eq;

use gymkeeper::AppError;
use gymkeeper::database::models::{
    AssignTrainerInput, IssueTicketInput, PlanKind, RegistrationInput, Ticket,
};
use gymkeeper::database::repositories::ticket as ticket_repo;
use gymkeeper::services::{EntitlementStatus, entitlements, members};

mod common;
use common::{MockData, TestContext, date};

fn issue(member_id: uuid::Uuid, plan_id: &str) -> IssueTicketInput {
    IssueTicketInput {
        member_id,
        plan_id: plan_id.to_string(),
        start_date: date(2026, 1, 1),
        payment_method: "card".to_string(),
    }
}

#[actix_web::test]
async fn test_issue_membership_writes_ticket_and_sale() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;

    let issuance = entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(member.id, "health-3m"))
        .await
        .unwrap();

    assert_eq!(issuance.ticket.end_date, date(2026, 4, 1));
    assert_eq!(issuance.ticket.remaining, 90);
    assert_eq!(issuance.ticket.kind, PlanKind::Membership);
    assert_eq!(issuance.sale.amount, 150_000);
    assert_eq!(issuance.sale.ticket_id, Some(issuance.ticket.id));

    let tickets = entitlements::list_tickets(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].days_remaining, 90);
    assert_eq!(tickets[0].status, EntitlementStatus::Active);

    let sales = entitlements::member_sales(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
}

#[actix_web::test]
async fn test_pt_pack_gets_nominal_window_and_session_count() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;

    let issuance = entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(member.id, "pt-10"))
        .await
        .unwrap();

    assert_eq!(issuance.ticket.end_date, date(2026, 6, 30));
    assert_eq!(issuance.ticket.total_sessions, 10);
    assert_eq!(issuance.ticket.used_sessions, 0);
    assert_eq!(issuance.ticket.remaining, 10);
}

#[actix_web::test]
async fn test_issue_for_unknown_member_leaves_no_sale() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();

    let result =
        entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(uuid::Uuid::new_v4(), "health-3m")).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    assert_eq!(ctx.sale_count().await, 0);
}

#[actix_web::test]
async fn test_exhausted_pack_rejects_consumption_and_keeps_counters() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let pack = entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(member.id, "pt-10"))
        .await
        .unwrap()
        .ticket;

    for used in 1..=10 {
        let ticket = entitlements::record_session(&ctx.state, &ctx.admin, pack.id)
            .await
            .unwrap();
        assert_eq!(ticket.used_sessions, used);
        assert_eq!(ticket.remaining_sessions(), 10 - used);
    }

    let result = entitlements::consume_session(&ctx.state, &ctx.admin, pack.id).await;
    assert!(matches!(result, Err(AppError::InsufficientBalance(_))));

    let mut conn = ctx.pool.acquire().await.unwrap();
    let stored = ticket_repo::find_by_id(&mut conn, pack.id).await.unwrap().unwrap();
    assert_eq!(stored.used_sessions, 10);
    assert_eq!(stored.total_sessions, 10);
}

#[actix_web::test]
async fn test_racing_consumers_never_overdraw() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let pack = entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(member.id, "pt-10"))
        .await
        .unwrap()
        .ticket;
    for _ in 0..9 {
        entitlements::consume_session(&ctx.state, &ctx.admin, pack.id)
            .await
            .unwrap();
    }

    let (first, second) = tokio::join!(
        entitlements::consume_session(&ctx.state, &ctx.admin, pack.id),
        entitlements::consume_session(&ctx.state, &ctx.admin, pack.id),
    );
    let successes = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);

    let mut conn = ctx.pool.acquire().await.unwrap();
    let stored = ticket_repo::find_by_id(&mut conn, pack.id).await.unwrap().unwrap();
    assert_eq!(stored.used_sessions, 10);
}

#[actix_web::test]
async fn test_consuming_a_membership_is_a_validation_error() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let membership = entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(member.id, "health-3m"))
        .await
        .unwrap()
        .ticket;

    let result = entitlements::consume_session(&ctx.state, &ctx.admin, membership.id).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    let missing = entitlements::consume_session(&ctx.state, &ctx.admin, uuid::Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[actix_web::test]
async fn test_status_follows_the_clock() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(member.id, "health-3m"))
        .await
        .unwrap();

    ctx.advance_days(85);
    let view = entitlements::active_membership(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.status, EntitlementStatus::Expiring);

    ctx.advance_days(5);
    let view = entitlements::active_membership(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert!(view.is_none());
}

#[actix_web::test]
async fn test_assign_trainer_only_on_pt_packs() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let trainer = ctx.trainer().await;
    let pack = entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(member.id, "pt-20"))
        .await
        .unwrap()
        .ticket;
    let locker = entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(member.id, "locker-1m"))
        .await
        .unwrap()
        .ticket;

    let assigned = entitlements::assign_trainer(
        &ctx.state,
        &ctx.admin,
        pack.id,
        AssignTrainerInput {
            trainer_id: trainer.id,
        },
    )
    .await
    .unwrap();
    assert_eq!(assigned.trainer_id, Some(trainer.id));
    assert_eq!(assigned.used_sessions, 0);

    let result = entitlements::assign_trainer(
        &ctx.state,
        &ctx.admin,
        locker.id,
        AssignTrainerInput {
            trainer_id: trainer.id,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[actix_web::test]
async fn test_members_cannot_issue_or_read_others() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let other = ctx.member().await;
    let caller = TestContext::as_member(&member);

    let result = entitlements::issue_ticket(&ctx.state, &caller, issue(member.id, "health-3m")).await;
    assert!(matches!(result, Err(AppError::PermissionDenied(_))));

    assert!(entitlements::list_tickets(&ctx.state, &caller, member.id).await.is_ok());
    let result = entitlements::list_tickets(&ctx.state, &caller, other.id).await;
    assert!(matches!(result, Err(AppError::PermissionDenied(_))));
}

#[actix_web::test]
async fn test_fix_degenerate_windows_is_idempotent() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let healthy = entitlements::issue_ticket(&ctx.state, &ctx.admin, issue(member.id, "health-6m"))
        .await
        .unwrap()
        .ticket;

    let degenerate = Ticket {
        id: uuid::Uuid::new_v4(),
        end_date: date(2025, 11, 1),
        start_date: date(2025, 11, 1),
        plan_name: "헬스 10개월".to_string(),
        plan_id: "health-10m".to_string(),
        ..healthy.clone()
    };
    let unknown = Ticket {
        id: uuid::Uuid::new_v4(),
        end_date: date(2025, 12, 1),
        start_date: date(2025, 12, 1),
        plan_name: "retired plan".to_string(),
        plan_id: "retired".to_string(),
        ..healthy.clone()
    };
    {
        let mut conn = ctx.pool.acquire().await.unwrap();
        ticket_repo::insert_ticket(&mut conn, &degenerate).await.unwrap();
        ticket_repo::insert_ticket(&mut conn, &unknown).await.unwrap();
    }

    let repairs = entitlements::fix_degenerate_windows(&ctx.state, &ctx.admin)
        .await
        .unwrap();
    assert_eq!(repairs.len(), 2);

    let mut conn = ctx.pool.acquire().await.unwrap();
    let fixed = ticket_repo::find_by_id(&mut conn, degenerate.id).await.unwrap().unwrap();
    assert_eq!(fixed.end_date, date(2026, 8, 28));
    assert_eq!(fixed.start_date, degenerate.start_date);
    assert_eq!(fixed.price, degenerate.price);
    let fallback = ticket_repo::find_by_id(&mut conn, unknown.id).await.unwrap().unwrap();
    assert_eq!(fallback.end_date, date(2026, 12, 1));
    let untouched = ticket_repo::find_by_id(&mut conn, healthy.id).await.unwrap().unwrap();
    assert_eq!(untouched.end_date, healthy.end_date);
    drop(conn);

    let second_pass = entitlements::fix_degenerate_windows(&ctx.state, &ctx.admin)
        .await
        .unwrap();
    assert!(second_pass.is_empty());
}

#[actix_web::test]
async fn test_registration_issues_every_chosen_plan() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();

    let registration = members::register_with_plans(
        &ctx.state,
        &ctx.admin,
        RegistrationInput {
            member: MockData::member(),
            membership_plan_id: Some("health-12m".to_string()),
            pt_plan_id: Some("pt-30".to_string()),
            locker_plan_id: Some("locker-3m".to_string()),
            locker_number: None,
            start_date: date(2026, 1, 1),
            payment_method: "cash".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(registration.issuances.len(), 3);
    let locker = registration.locker.unwrap();
    assert_eq!(locker.locker_number, 1);
    assert_eq!(locker.end_date, Some(date(2026, 4, 1)));
    assert!(registration.member.has_locker);
    assert_eq!(registration.member.locker_number, Some(1));

    let sales = entitlements::member_sales(&ctx.state, &ctx.admin, registration.member.id)
        .await
        .unwrap();
    assert_eq!(sales.iter().map(|s| s.amount).sum::<i64>(), 450_000 + 1_200_000 + 27_000);
}

#[actix_web::test]
async fn test_registration_rejects_mismatched_plan_kind() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();

    let result = members::register_with_plans(
        &ctx.state,
        &ctx.admin,
        RegistrationInput {
            member: MockData::member(),
            membership_plan_id: Some("pt-10".to_string()),
            pt_plan_id: None,
            locker_plan_id: None,
            locker_number: None,
            start_date: date(2026, 1, 1),
            payment_method: "cash".to_string(),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    let members = members::list_members(&ctx.state, &ctx.admin).await.unwrap();
    assert!(members.is_empty());
}
