//! End-to-end fan-out from published events to cache, storage, and mail.

use fuelwatch::domain::ports::StatisticsRepository;
use fuelwatch::domain::{
    PriceProposalEvaluated, ReportStatus, UserBanned, UserRegistered, UserUnlocked,
};
use fuelwatch::test_support::fixtures::{locked_account, pending_report, proposal, user};
use rstest::rstest;

mod support;

use support::{DELIVERY_DEADLINE, World, fixed_now, quiet_settings};

#[rstest]
#[tokio::test]
async fn ban_invalidates_cache_clears_reports_and_notifies() {
    let world = World::new();
    let banned = user("banned@example.com");
    let bystander = user("bystander@example.com");
    world.register(&banned, locked_account(banned.clone(), fixed_now()));
    let first = pending_report(banned.id);
    let second = pending_report(banned.id);
    let unrelated = pending_report(bystander.id);
    for report in [&first, &second, &unrelated] {
        world.reports.insert(report.clone());
    }
    world
        .seed_cache(&[
            "users-list:page-1",
            "user-info:banned@example.com",
            "user-stats:banned@example.com",
            "user-info:bystander@example.com",
        ])
        .await;
    let services = world.start(&quiet_settings());

    let report = services
        .dispatcher()
        .publish(UserBanned {
            user: banned.clone(),
            admin: world.admin.clone(),
            reason: "fabricated prices".to_owned(),
            duration_days: Some(30),
        })
        .await;
    assert_eq!(report.invoked, 3);
    assert_eq!(report.failed, 0);

    assert!(!world.cached("users-list:page-1").await);
    assert!(!world.cached("user-info:banned@example.com").await);
    assert!(!world.cached("user-stats:banned@example.com").await);
    assert!(world.cached("user-info:bystander@example.com").await);

    for id in [first.id, second.id] {
        let resolved = world.reports.get(id).expect("report stored");
        assert_eq!(resolved.status, ReportStatus::Accepted);
        assert_eq!(resolved.reviewed_by, Some(world.admin.id));
        assert_eq!(resolved.reviewed_at, Some(fixed_now()));
    }
    let untouched = world.reports.get(unrelated.id).expect("report stored");
    assert_eq!(untouched.status, ReportStatus::Pending);

    let sent = world.transport.wait_for(1, DELIVERY_DEADLINE).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, banned.email);
    services.shutdown().await;
}

#[rstest]
#[tokio::test]
async fn registration_then_verdicts_maintain_statistics() {
    let world = World::new();
    let author = user("author@example.com");
    let services = world.start(&quiet_settings());
    let dispatcher = services.dispatcher();

    dispatcher
        .publish(UserRegistered {
            user: author.clone(),
            confirmation_token: "c0nf1rm".to_owned(),
        })
        .await;
    for accepted in [true, false, true] {
        dispatcher
            .publish(PriceProposalEvaluated {
                proposal: proposal(author.clone()),
                accepted,
            })
            .await;
    }

    let stats = world
        .statistics
        .find(&author.id)
        .await
        .expect("read")
        .expect("initialised at registration");
    assert_eq!(stats.total_proposals, 3);
    assert_eq!(stats.approved_proposals, 2);
    assert_eq!(stats.rejected_proposals, 1);
    assert_eq!(stats.acceptance_rate, 66.67);

    let sent = world.transport.wait_for(4, DELIVERY_DEADLINE).await;
    assert_eq!(sent.len(), 4);
    assert!(sent[0].body.contains("c0nf1rm"));
    services.shutdown().await;
}

#[rstest]
#[tokio::test]
async fn rejected_verdict_keeps_station_and_ranking_entries() {
    let world = World::new();
    let author = user("author@example.com");
    let evaluated = proposal(author.clone());
    let station_key = format!("station:{}", evaluated.station_id);
    world
        .seed_cache(&[
            "user-stats:author@example.com",
            "top-users:weekly",
            station_key.as_str(),
        ])
        .await;
    let services = world.start(&quiet_settings());

    let report = services
        .dispatcher()
        .publish(PriceProposalEvaluated {
            proposal: evaluated,
            accepted: false,
        })
        .await;

    // No statistics record exists for the author; the update is skipped.
    assert_eq!(report.failed, 0);
    assert!(!world.cached("user-stats:author@example.com").await);
    assert!(world.cached("top-users:weekly").await);
    assert!(world.cached(&station_key).await);
    services.shutdown().await;
}

#[rstest]
#[tokio::test]
async fn unban_with_unknown_admin_still_notifies() {
    let world = World::new();
    let restored = user("restored@example.com");
    let services = world.start(&quiet_settings());

    let report = services
        .dispatcher()
        .publish(UserUnlocked {
            user: restored.clone(),
            admin: fuelwatch::test_support::fixtures::admin(),
        })
        .await;

    assert_eq!(report.invoked, 2);
    let sent = world.transport.wait_for(1, DELIVERY_DEADLINE).await;
    assert_eq!(sent[0].recipient, restored.email);
    let stats = services.shutdown().await;
    assert_eq!(stats.delivered, 1);
}
