use pretty_assertions::assert_eq;

use gymkeeper::{AppError, AppState, PlanCatalog};
use gymkeeper::database::models::{
    CreateRequestInput, PaymentEventInput, RequestFilter, RequestInput, RequestStatus, RequestType,
};
use gymkeeper::services::{entitlements, payments, requests};

mod common;
use common::{TestContext, date};

fn purchase(plan_id: &str) -> CreateRequestInput {
    CreateRequestInput {
        member_id: None,
        request: RequestInput::Purchase {
            plan_id: plan_id.to_string(),
        },
    }
}

#[actix_web::test]
async fn test_approving_a_purchase_issues_exactly_once() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let caller = TestContext::as_member(&member);

    let request = requests::create_request(&ctx.state, &caller, purchase("health-6m"))
        .await
        .unwrap();
    assert_eq!(request.member_id, member.id);
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.amount, Some(270_000));

    ctx.advance_days(3);
    let decision = requests::approve(&ctx.state, &ctx.admin, request.id)
        .await
        .unwrap();
    assert!(decision.side_effects_applied);
    assert_eq!(decision.request.status, RequestStatus::Approved);
    assert_eq!(decision.request.decided_by, Some(ctx.admin.id()));
    let issuance = decision.issuance.unwrap();
    assert_eq!(issuance.ticket.start_date, date(2026, 1, 4));
    assert_eq!(issuance.ticket.end_date, date(2026, 7, 3));
    assert_eq!(issuance.ticket.request_id, Some(request.id));
    assert_eq!(issuance.sale.amount, 270_000);

    match requests::approve(&ctx.state, &ctx.admin, request.id).await {
        Err(AppError::InvalidTransition(message)) => {
            assert!(message.contains(&issuance.ticket.id.to_string()))
        }
        other => panic!("expected InvalidTransition, got {:?}", other),
    }
    let result = requests::reject(&ctx.state, &ctx.admin, request.id).await;
    assert!(matches!(result, Err(AppError::InvalidTransition(_))));

    let tickets = entitlements::list_tickets(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(ctx.sale_count().await, 1);
    assert_eq!(ctx.sales_for_ticket(issuance.ticket.id).await, 1);
}

#[actix_web::test]
async fn test_approval_of_a_withdrawn_plan_leaves_no_trace() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let caller = TestContext::as_member(&member);

    let request = requests::create_request(&ctx.state, &caller, purchase("health-6m"))
        .await
        .unwrap();

    // The catalog changes before the request is decided
    let catalog = PlanCatalog::from_json(
        r#"[{"id": "day-pass", "name": "Day pass", "kind": "membership", "term": {"unit": "days", "value": 1}, "price": 10000}]"#,
        ctx.config.pt_validity_days,
    )
    .unwrap();
    let reduced = AppState::new(
        ctx.pool.clone(),
        ctx.state.clock.clone(),
        ctx.config.clone(),
        catalog,
    );

    let result = requests::approve(&reduced, &ctx.admin, request.id).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    let stored = requests::get_request(&ctx.state, &ctx.admin, request.id)
        .await
        .unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
    assert_eq!(stored.decided_by, None);
    assert_eq!(ctx.sale_count().await, 0);
    assert_eq!(ctx.ticket_count().await, 0);

    // Still decidable once the plan is back on offer
    let decision = requests::approve(&ctx.state, &ctx.admin, request.id)
        .await
        .unwrap();
    assert!(decision.issuance.is_some());
}

#[actix_web::test]
async fn test_concurrent_approvals_issue_once() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let caller = TestContext::as_member(&member);

    let request = requests::create_request(&ctx.state, &caller, purchase("pt-10"))
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        requests::approve(&ctx.state, &ctx.admin, request.id),
        requests::approve(&ctx.state, &ctx.admin, request.id),
    );
    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(AppError::InvalidTransition(_)) | Err(AppError::Conflict(_))
    )));

    assert_eq!(ctx.ticket_count().await, 1);
    assert_eq!(ctx.sale_count().await, 1);
}

#[actix_web::test]
async fn test_rejected_request_stays_rejected() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let caller = TestContext::as_member(&member);

    let request = requests::create_request(&ctx.state, &caller, purchase("pt-20"))
        .await
        .unwrap();
    let decision = requests::reject(&ctx.state, &ctx.admin, request.id)
        .await
        .unwrap();
    assert_eq!(decision.request.status, RequestStatus::Rejected);
    assert!(decision.request.status.is_terminal());
    assert!(decision.issuance.is_none());

    let result = requests::approve(&ctx.state, &ctx.admin, request.id).await;
    assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    let tickets = entitlements::list_tickets(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert!(tickets.is_empty());
}

#[actix_web::test]
async fn test_pause_and_refund_only_change_status() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let caller = TestContext::as_member(&member);

    let pause = requests::create_request(
        &ctx.state,
        &caller,
        CreateRequestInput {
            member_id: None,
            request: RequestInput::Pause {
                start: date(2026, 2, 1),
                end: date(2026, 2, 14),
                reason: "travel".to_string(),
            },
        },
    )
    .await
    .unwrap();
    let refund = requests::create_request(
        &ctx.state,
        &caller,
        CreateRequestInput {
            member_id: None,
            request: RequestInput::Refund {
                bank: "KB".to_string(),
                account: "123-456".to_string(),
                reason: "moving".to_string(),
            },
        },
    )
    .await
    .unwrap();

    for id in [pause.id, refund.id] {
        let decision = requests::approve(&ctx.state, &ctx.admin, id).await.unwrap();
        assert_eq!(decision.request.status, RequestStatus::Approved);
        assert!(!decision.side_effects_applied);
        assert!(decision.issuance.is_none());
    }
}

#[actix_web::test]
async fn test_request_validation() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let caller = TestContext::as_member(&member);

    let result = requests::create_request(&ctx.state, &caller, purchase("no-such-plan")).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    let backwards = CreateRequestInput {
        member_id: None,
        request: RequestInput::Pause {
            start: date(2026, 3, 1),
            end: date(2026, 2, 1),
            reason: "injury".to_string(),
        },
    };
    let result = requests::create_request(&ctx.state, &caller, backwards).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    let result = requests::approve(&ctx.state, &ctx.admin, uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[actix_web::test]
async fn test_decisions_are_admin_only_and_listing_is_scoped() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let other = ctx.member().await;
    let caller = TestContext::as_member(&member);

    let mine = requests::create_request(&ctx.state, &caller, purchase("health-3m"))
        .await
        .unwrap();
    requests::create_request(&ctx.state, &TestContext::as_member(&other), purchase("pt-10"))
        .await
        .unwrap();

    let result = requests::approve(&ctx.state, &caller, mine.id).await;
    assert!(matches!(result, Err(AppError::PermissionDenied(_))));

    let filter = RequestFilter {
        member_id: Some(other.id),
        ..Default::default()
    };
    let visible = requests::list_requests(&ctx.state, &caller, filter).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, mine.id);

    let all = requests::list_requests(&ctx.state, &ctx.admin, RequestFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    let purchases = RequestFilter {
        status: Some(RequestStatus::Pending),
        request_type: Some(RequestType::Purchase),
        ..Default::default()
    };
    assert_eq!(
        requests::list_requests(&ctx.state, &ctx.admin, purchases).await.unwrap().len(),
        2
    );

    let result = requests::create_request(
        &ctx.state,
        &caller,
        CreateRequestInput {
            member_id: Some(other.id),
            ..purchase("health-3m")
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::PermissionDenied(_))));
}

#[actix_web::test]
async fn test_payment_events_never_issue_tickets() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let event = PaymentEventInput {
        member_id: member.id,
        external_id: "pg_20260101_0001".to_string(),
        amount: Some(150_000),
    };

    let first = payments::record_payment_event(&ctx.state, &ctx.admin, event.clone())
        .await
        .unwrap();
    let replay = payments::record_payment_event(&ctx.state, &ctx.admin, event)
        .await
        .unwrap();
    assert_eq!(first.id, replay.id);

    let events = payments::member_payment_events(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    let tickets = entitlements::list_tickets(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert!(tickets.is_empty());

    let blank = PaymentEventInput {
        member_id: member.id,
        external_id: "  ".to_string(),
        amount: None,
    };
    let result = payments::record_payment_event(&ctx.state, &ctx.admin, blank).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));
}
