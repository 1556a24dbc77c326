//! Connection-gate behaviour against a real store and fake collaborators.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bailiff_moderation::{
    ConnectionGateway, Decision, ModerationConfig, MuteCache, RecheckOutcome, RejectReason,
    ResolutionEngine, Scheduler, TokioScheduler,
};
use bailiff_store::PunishmentStore;
use bailiff_types::{PlayerId, PunishmentKind};
use chrono::{TimeDelta, Utc};

use common::{core_config, memory_harness, punishment, Gateway, Harness, Roster, SlowStore};

fn slow_harness(delay: Duration) -> Harness<SlowStore> {
    Harness::new(SlowStore::new(delay), core_config())
}

#[tokio::test]
async fn test_resolve_on_connect_clean_history_accepts() {
    let h = memory_harness();
    let player = PlayerId::random();
    h.store
        .save(punishment(PunishmentKind::Warn, player, None, "core"))
        .await
        .unwrap();

    let decision = h.engine.resolve_on_connect(player).await;

    assert_eq!(decision, Decision::Accept);
    assert!(h.cache.is_muted(player).is_none());
    assert_eq!(h.scheduler.pending(), 0);
}

#[tokio::test]
async fn test_resolve_on_connect_temp_ban_rejects_with_issuer_name() {
    let h = memory_harness();
    let moderator = h.roster.add("Moderator");
    let player = PlayerId::random();
    let ban = punishment(PunishmentKind::TempBan, player, Some(moderator), "core")
        .with_expiry(Utc::now() + TimeDelta::days(7));
    h.store.save(ban.clone()).await.unwrap();

    let decision = h.engine.resolve_on_connect(player).await;

    match &decision {
        Decision::Reject { reason, message } => {
            assert_eq!(*reason, RejectReason::Banned(ban.id));
            assert!(message.starts_with("You have been temporarily banned from Arena"));
            assert!(message.contains("Reason: rule breaking"));
            assert!(message.contains("Issued by: Moderator"));
            assert!(message.contains("Expires: "));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(!decision.is_accepted());
}

#[tokio::test]
async fn test_resolve_on_connect_console_ban_names_console() {
    let h = memory_harness();
    let player = PlayerId::random();
    h.store
        .save(punishment(PunishmentKind::Ban, player, None, "core"))
        .await
        .unwrap();

    let decision = h.engine.resolve_on_connect(player).await;

    assert!(decision.message().unwrap().contains("Issued by: Console"));
}

#[tokio::test]
async fn test_resolve_on_connect_other_service_ban_accepts() {
    let h = memory_harness();
    let player = PlayerId::random();
    h.store
        .save(punishment(PunishmentKind::Ban, player, None, "lobby"))
        .await
        .unwrap();
    h.store
        .save(punishment(PunishmentKind::Mute, player, None, "lobby"))
        .await
        .unwrap();

    let decision = h.engine.resolve_on_connect(player).await;

    assert_eq!(decision, Decision::Accept);
    assert!(h.cache.is_muted(player).is_none());
}

#[tokio::test]
async fn test_resolve_on_connect_expired_and_pardoned_bans_accept() {
    let h = memory_harness();
    let player = PlayerId::random();
    let now = Utc::now();
    let expired = punishment(PunishmentKind::TempBan, player, None, "core")
        .with_issued_at(now - TimeDelta::days(3))
        .with_expiry(now - TimeDelta::days(1));
    let mut pardoned = punishment(PunishmentKind::Ban, player, None, "core");
    pardoned.pardon(None, now);
    h.store.save(expired).await.unwrap();
    h.store.save(pardoned).await.unwrap();

    assert_eq!(h.engine.resolve_on_connect(player).await, Decision::Accept);
}

#[tokio::test]
async fn test_resolve_on_connect_banned_and_muted_caches_mute() {
    let h = memory_harness();
    let player = PlayerId::random();
    let mute = punishment(PunishmentKind::Mute, player, None, "core");
    h.store.save(mute.clone()).await.unwrap();
    h.store
        .save(punishment(PunishmentKind::Ban, player, None, "core"))
        .await
        .unwrap();

    let decision = h.engine.resolve_on_connect(player).await;

    assert!(!decision.is_accepted());
    assert_eq!(h.cache.is_muted(player), Some(mute));
}

#[tokio::test]
async fn test_resolve_on_connect_drops_stale_cached_mute() {
    let h = memory_harness();
    let player = PlayerId::random();
    h.coordinator
        .issue(punishment(PunishmentKind::Mute, player, None, "core"))
        .await
        .unwrap();
    assert!(h.cache.is_muted(player).is_some());

    // Lifted behind the cache's back, e.g. by another server.
    h.store
        .set_inactive(player, PunishmentKind::Mute, "core", None)
        .await
        .unwrap();
    h.engine.resolve_on_connect(player).await;

    assert!(h.cache.is_muted(player).is_none());
    assert!(h.cache.is_empty());
}

#[tokio::test]
async fn test_resolve_on_connect_twice_is_idempotent() {
    let h = memory_harness();
    let player = PlayerId::random();
    h.store
        .save(
            punishment(PunishmentKind::TempBan, player, None, "core")
                .with_expiry(Utc::now() + TimeDelta::hours(2)),
        )
        .await
        .unwrap();
    h.store
        .save(punishment(PunishmentKind::Mute, player, None, "core"))
        .await
        .unwrap();

    let first = h.engine.resolve_on_connect(player).await;
    let cached = h.cache.is_muted(player);
    let second = h.engine.resolve_on_connect(player).await;

    assert_eq!(first, second);
    assert_eq!(h.cache.is_muted(player), cached);
    assert_eq!(h.cache.len(), 1);
}

#[tokio::test]
async fn test_resolve_on_connect_store_failure_rejects_and_keeps_cache() {
    let h = memory_harness();
    let player = PlayerId::random();
    h.coordinator
        .issue(punishment(PunishmentKind::Mute, player, None, "core"))
        .await
        .unwrap();

    h.store.set_available(false);
    let decision = h.engine.resolve_on_connect(player).await;

    assert_eq!(
        decision,
        Decision::Reject {
            reason: RejectReason::StoreFailure,
            message: "Error joining, please try again.".into(),
        }
    );
    assert!(h.cache.is_muted(player).is_some(), "cache must be left alone");
    assert_eq!(h.scheduler.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resolve_on_connect_slow_store_admits_provisionally() {
    let h = slow_harness(Duration::from_secs(10));
    let player = PlayerId::random();
    h.store
        .inner
        .save(punishment(PunishmentKind::Ban, player, None, "core"))
        .await
        .unwrap();

    let started = tokio::time::Instant::now();
    let decision = h.engine.resolve_on_connect(player).await;

    assert_eq!(decision, Decision::Provisional);
    assert!(decision.is_accepted());
    assert!(started.elapsed() < Duration::from_secs(6));
    assert_eq!(h.scheduler.pending(), 1);
    let delay = h.scheduler.delays()[0];
    assert!(delay >= Duration::from_millis(1_000) && delay <= Duration::from_millis(1_250));
}

#[tokio::test(start_paused = true)]
async fn test_deferred_recheck_kicks_banned_player() {
    let h = slow_harness(Duration::from_secs(10));
    let moderator = h.roster.add("Moderator");
    let player = PlayerId::random();
    let ban = punishment(PunishmentKind::TempBan, player, Some(moderator), "core")
        .with_expiry(Utc::now() + TimeDelta::days(1));
    h.store.inner.save(ban).await.unwrap();

    assert_eq!(h.engine.resolve_on_connect(player).await, Decision::Provisional);
    h.gateway.join(player);
    h.scheduler.run_all().await;

    let kicks = h.gateway.kicks();
    assert_eq!(kicks.len(), 1);
    assert_eq!(kicks[0].0, player);
    assert!(kicks[0].1.contains("Issued by: Moderator"));
}

#[tokio::test(start_paused = true)]
async fn test_deferred_recheck_after_disconnect_does_nothing() {
    let h = slow_harness(Duration::from_secs(10));
    let player = PlayerId::random();
    h.store
        .inner
        .save(punishment(PunishmentKind::Ban, player, None, "core"))
        .await
        .unwrap();
    h.store
        .inner
        .save(punishment(PunishmentKind::Mute, player, None, "core"))
        .await
        .unwrap();

    assert_eq!(h.engine.resolve_on_connect(player).await, Decision::Provisional);
    // Never joined (or already left) by the time the check fires.
    h.scheduler.run_all().await;

    assert!(h.gateway.kicks().is_empty());
    assert!(h.cache.is_muted(player).is_none());
}

#[tokio::test]
async fn test_recheck_outcomes() {
    let h = memory_harness();
    let clean = PlayerId::random();
    let muted = PlayerId::random();
    let banned = PlayerId::random();
    let gone = PlayerId::random();
    h.store
        .save(punishment(PunishmentKind::Mute, muted, None, "core"))
        .await
        .unwrap();
    let ban = punishment(PunishmentKind::Ban, banned, None, "core");
    h.store.save(ban.clone()).await.unwrap();
    for p in [clean, muted, banned] {
        h.gateway.join(p);
    }

    assert_eq!(h.engine.recheck(clean).await, RecheckOutcome::Clean);
    assert_eq!(h.engine.recheck(muted).await, RecheckOutcome::Muted);
    assert!(h.cache.is_muted(muted).is_some());
    assert_eq!(h.engine.recheck(banned).await, RecheckOutcome::Kicked(ban.id));
    assert!(!h.gateway.is_connected(banned));
    assert_eq!(h.engine.recheck(gone).await, RecheckOutcome::Disconnected);
}

#[tokio::test]
async fn test_recheck_store_failure_does_nothing() {
    let h = memory_harness();
    let player = PlayerId::random();
    h.store
        .save(punishment(PunishmentKind::Ban, player, None, "core"))
        .await
        .unwrap();
    h.gateway.join(player);
    h.store.set_available(false);

    assert_eq!(h.engine.recheck(player).await, RecheckOutcome::Failed);
    assert!(h.gateway.kicks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_tokio_scheduler_runs_deferred_recheck() {
    let store = Arc::new(SlowStore::new(Duration::from_secs(8)));
    let gateway = Arc::new(Gateway::default());
    let engine = ResolutionEngine::new(
        Arc::clone(&store),
        Arc::new(Roster::default()),
        Arc::clone(&gateway),
        Arc::new(TokioScheduler) as Arc<dyn Scheduler>,
        MuteCache::new(),
        ModerationConfig {
            login_timeout_secs: 2,
            ..core_config()
        },
    );
    let player = PlayerId::random();
    store
        .inner
        .save(punishment(PunishmentKind::Ban, player, None, "core"))
        .await
        .unwrap();

    assert_eq!(engine.resolve_on_connect(player).await, Decision::Provisional);
    gateway.join(player);
    assert!(gateway.kicks().is_empty());

    // Delay (<= 1.25s) plus the slow fetch (8s).
    tokio::time::sleep(Duration::from_secs(15)).await;

    assert_eq!(gateway.kicks().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unmute_during_lookup_is_not_undone_by_gate() {
    let h = Harness::new(SlowStore::late(Duration::from_millis(500)), core_config());
    let player = PlayerId::random();
    h.coordinator
        .issue(punishment(PunishmentKind::Mute, player, None, "core"))
        .await
        .unwrap();

    let (decision, unmuted) = tokio::join!(h.engine.resolve_on_connect(player), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let lifted = h.coordinator.unmute(player, None).await.unwrap();
        assert!(h.cache.is_muted(player).is_none());
        lifted
    });

    assert_eq!(decision, Decision::Accept);
    assert!(unmuted);
    assert!(h.cache.is_muted(player).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_mute_during_lookup_is_not_dropped_by_gate() {
    let h = Harness::new(SlowStore::late(Duration::from_millis(500)), core_config());
    let player = PlayerId::random();

    let (decision, mute) = tokio::join!(h.engine.resolve_on_connect(player), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.coordinator
            .issue(punishment(PunishmentKind::Mute, player, None, "core"))
            .await
            .unwrap()
    });

    assert_eq!(decision, Decision::Accept);
    assert_eq!(h.cache.is_muted(player), Some(mute));
}

#[tokio::test(start_paused = true)]
async fn test_unmute_during_deferred_lookup_is_not_undone() {
    let h = Harness::new(SlowStore::late(Duration::from_secs(2)), core_config());
    let player = PlayerId::random();
    h.gateway.join(player);
    h.coordinator
        .issue(punishment(PunishmentKind::Mute, player, None, "core"))
        .await
        .unwrap();

    let (outcome, _) = tokio::join!(h.engine.recheck(player), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.coordinator.unmute(player, None).await.unwrap()
    });

    // The lookup still saw the mute; only the cache write was skipped.
    assert_eq!(outcome, RecheckOutcome::Muted);
    assert!(h.cache.is_muted(player).is_none());
}
