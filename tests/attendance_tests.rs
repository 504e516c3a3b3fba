use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

use gymkeeper::AppError;
use gymkeeper::services::attendance;

mod common;
use common::{TestContext, date};

#[actix_web::test]
async fn test_check_in_then_out_computes_duration() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;

    let record = attendance::check_in(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert!(record.is_open());

    ctx.clock.advance(Duration::minutes(95));
    let closed = attendance::check_out(&ctx.state, &ctx.admin, record.id)
        .await
        .unwrap();
    assert_eq!(closed.duration_minutes, Some(95));
    assert!(closed.record.check_out.is_some());

    let result = attendance::check_out(&ctx.state, &ctx.admin, record.id).await;
    assert!(matches!(result, Err(AppError::AlreadyClosed(_))));
}

#[actix_web::test]
async fn test_one_open_session_per_member() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;

    let first = attendance::check_in(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    let result = attendance::check_in(&ctx.state, &ctx.admin, member.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    attendance::check_out(&ctx.state, &ctx.admin, first.id)
        .await
        .unwrap();
    ctx.clock.advance(Duration::hours(3));
    let second = attendance::check_in(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();

    let open = attendance::open_session(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert_eq!(open.map(|r| r.id), Some(second.id));

    let history = attendance::member_history(&ctx.state, &ctx.admin, member.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
}

#[actix_web::test]
async fn test_currently_in_lists_open_records_for_the_day() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let stays = ctx.member().await;
    let leaves = ctx.member().await;

    attendance::check_in(&ctx.state, &ctx.admin, stays.id)
        .await
        .unwrap();
    let visit = attendance::check_in(&ctx.state, &ctx.admin, leaves.id)
        .await
        .unwrap();
    attendance::check_out(&ctx.state, &ctx.admin, visit.id)
        .await
        .unwrap();

    let inside = attendance::currently_in(&ctx.state, &ctx.admin, date(2026, 1, 1))
        .await
        .unwrap();
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].member_id, stays.id);

    let day = attendance::daily(&ctx.state, &ctx.admin, date(2026, 1, 1))
        .await
        .unwrap();
    assert_eq!(day.len(), 2);
    let next_day = attendance::daily(&ctx.state, &ctx.admin, date(2026, 1, 2))
        .await
        .unwrap();
    assert!(next_day.is_empty());

    // A session left open overnight does not count as inside the next day
    ctx.clock.set(Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).unwrap());
    let inside = attendance::currently_in(&ctx.state, &ctx.admin, date(2026, 1, 2))
        .await
        .unwrap();
    assert!(inside.is_empty());
}

#[actix_web::test]
async fn test_members_check_in_only_themselves() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let member = ctx.member().await;
    let other = ctx.member().await;
    let caller = TestContext::as_member(&member);

    let own = attendance::check_in(&ctx.state, &caller, member.id).await.unwrap();
    let result = attendance::check_in(&ctx.state, &caller, other.id).await;
    assert!(matches!(result, Err(AppError::PermissionDenied(_))));

    let theirs = attendance::check_in(&ctx.state, &ctx.admin, other.id)
        .await
        .unwrap();
    let result = attendance::check_out(&ctx.state, &caller, theirs.id).await;
    assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    attendance::check_out(&ctx.state, &caller, own.id).await.unwrap();

    let result = attendance::daily(&ctx.state, &caller, date(2026, 1, 1)).await;
    assert!(matches!(result, Err(AppError::PermissionDenied(_))));
}

#[actix_web::test]
async fn test_unknown_ids_are_not_found() {
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();

    let result = attendance::check_in(&ctx.state, &ctx.admin, uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    let result = attendance::check_out(&ctx.state, &ctx.admin, uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
