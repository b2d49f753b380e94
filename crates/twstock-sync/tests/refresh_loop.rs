//! RefreshController 통합 테스트 (tokio 가상 시간 사용).

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MockProvider;
use tokio::time::Instant;
use twstock_core::Dataset;
use twstock_data::MemoryPreferenceStore;
use twstock_sync::{RefreshConfig, RefreshController, SyncEngine};

fn setup(latency: Duration) -> (Arc<MockProvider>, Arc<SyncEngine>) {
    let provider = Arc::new(MockProvider::sample().with_latency(latency));
    let engine = Arc::new(SyncEngine::new(
        provider.clone(),
        Arc::new(MemoryPreferenceStore::new()),
    ));
    (provider, engine)
}

#[tokio::test(start_paused = true)]
async fn test_continuous_cadence() {
    let (provider, engine) = setup(Duration::from_millis(100));
    let controller = RefreshController::new(
        engine.clone(),
        RefreshConfig::continuous(Duration::from_millis(5000)),
    );
    let mut snapshots = engine.subscribe_snapshot();

    let start = Instant::now();
    assert!(controller.activate());

    let mut published_at = Vec::new();
    for _ in 0..3 {
        snapshots.changed().await.unwrap();
        published_at.push(start.elapsed());
    }

    // 주기 100ms + 대기 5000ms
    let tolerance = Duration::from_millis(50);
    assert!(published_at[0] <= Duration::from_millis(100) + tolerance);
    for pair in published_at.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(
            gap >= Duration::from_millis(5100) - tolerance
                && gap <= Duration::from_millis(5100) + tolerance,
            "unexpected gap {gap:?}"
        );
    }

    assert!(controller.deactivate().await);
    assert!(!controller.is_active());

    let calls = provider.calls(Dataset::Detail);
    let cycle = engine.snapshot().unwrap().cycle;
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(provider.calls(Dataset::Detail), calls);
    assert_eq!(engine.snapshot().unwrap().cycle, cycle);
}

#[tokio::test(start_paused = true)]
async fn test_activate_is_idempotent_while_running() {
    let (provider, engine) = setup(Duration::from_millis(100));
    let controller =
        RefreshController::new(engine, RefreshConfig::continuous(Duration::from_secs(5)));

    assert!(controller.activate());
    assert!(!controller.activate());
    assert!(controller.is_active());

    tokio::time::sleep(Duration::from_millis(500)).await;
    // 루프가 하나뿐이므로 한 번만 조회
    assert_eq!(provider.calls(Dataset::Detail), 1);

    assert!(controller.deactivate().await);
    assert!(!controller.deactivate().await);
}

#[tokio::test(start_paused = true)]
async fn test_once_per_activation_runs_single_cycle() {
    let (provider, engine) = setup(Duration::from_millis(100));
    let controller = RefreshController::new(engine.clone(), RefreshConfig::once_per_activation());

    assert!(controller.activate());
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(provider.calls(Dataset::Detail), 1);
    assert_eq!(engine.snapshot().unwrap().cycle, 1);
    assert!(!controller.is_active());
    // 이미 끝난 루프는 실행 중이 아님
    assert!(!controller.deactivate().await);

    // 다시 활성화하면 한 번 더 실행
    assert!(controller.activate());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(provider.calls(Dataset::Detail), 2);
    assert_eq!(engine.snapshot().unwrap().cycle, 2);
}

#[tokio::test(start_paused = true)]
async fn test_deactivate_lets_in_flight_cycle_finish() {
    let (provider, engine) = setup(Duration::from_millis(1000));
    let controller = RefreshController::new(
        engine.clone(),
        RefreshConfig::continuous(Duration::from_secs(5)),
    );

    controller.activate();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(engine.snapshot().is_none());

    let start = Instant::now();
    assert!(controller.deactivate().await);

    // 진행 중이던 주기는 끝까지 실행되어 발행됨
    assert!(start.elapsed() >= Duration::from_millis(450));
    assert_eq!(engine.snapshot().unwrap().cycle, 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(provider.calls(Dataset::Detail), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_is_retried_next_interval() {
    let (provider, engine) = setup(Duration::from_millis(100));
    provider.set_failing(Dataset::Detail, true);
    let controller = RefreshController::new(
        engine.clone(),
        RefreshConfig::continuous(Duration::from_secs(5)),
    );

    controller.activate();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(engine.snapshot().is_none());
    assert!(controller.is_active());

    provider.set_failing(Dataset::Detail, false);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(provider.calls(Dataset::Detail), 2);
    assert_eq!(engine.snapshot().unwrap().cycle, 2);

    controller.deactivate().await;
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_loop() {
    let (provider, engine) = setup(Duration::from_millis(100));
    {
        let controller = RefreshController::new(
            engine.clone(),
            RefreshConfig::continuous(Duration::from_secs(5)),
        );
        controller.activate();
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(provider.calls(Dataset::Detail), 1);
}
