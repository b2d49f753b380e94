//! 조회 → 정렬 → 발행 동기화 엔진.
//!
//! 엔진 상태(현재 스냅샷, 정렬 순서)는 `watch` 채널로 노출됩니다.
//! 각 발행은 전체 값을 교체하므로 구독자는 항상 완성된 이전 값 또는 새 값만 봅니다.
//!
//! # 동작
//!
//! - 한 주기 안의 세 조회는 동시에 실행되고, 세 조회가 모두 끝날 때까지 기다립니다.
//! - 하나라도 실패하면 아무것도 발행하지 않으며 이전 스냅샷이 유지됩니다.
//! - 여러 주기가 겹치면 마지막으로 완료된 주기의 스냅샷이 남습니다.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, watch, Mutex};
use tracing::Instrument;
use twstock_core::{
    cycle_span, Dataset, Snapshot, SortOrder, StockValuation, TwStockError, TwStockResult,
};
use twstock_data::{PreferenceStore, StockDataProvider};

use crate::stats::CycleStats;

/// 데이터셋 요청당 기본 타임아웃.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// 이벤트 채널 버퍼 크기.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 구독자에게 전달되는 엔진 이벤트.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// 새 스냅샷 발행
    CyclePublished { cycle: u64, stats: CycleStats },
    /// 주기 실패 (이전 스냅샷 유지)
    CycleFailed { cycle: u64, error: TwStockError },
    /// 정렬 순서 변경
    SortOrderChanged { from: SortOrder, to: SortOrder },
}

/// 시세 동기화 엔진.
pub struct SyncEngine {
    provider: Arc<dyn StockDataProvider>,
    preferences: Arc<dyn PreferenceStore>,
    fetch_timeout: Duration,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    sort_tx: watch::Sender<SortOrder>,
    events_tx: broadcast::Sender<SyncEvent>,
    cycle_seq: AtomicU64,
    // 정렬 토글의 읽기-수정-저장을 직렬화
    toggle_lock: Mutex<()>,
}

impl SyncEngine {
    /// 새 엔진을 생성합니다. I/O는 하지 않습니다.
    pub fn new(
        provider: Arc<dyn StockDataProvider>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (sort_tx, _) = watch::channel(SortOrder::Original);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            provider,
            preferences,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            snapshot_tx,
            sort_tx,
            events_tx,
            cycle_seq: AtomicU64::new(0),
            toggle_lock: Mutex::new(()),
        }
    }

    /// 데이터셋 요청 타임아웃을 설정합니다.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// 저장된 정렬 순서를 로드합니다.
    ///
    /// 저장된 값이 없거나 저장소를 읽을 수 없으면 `Original`을 사용합니다.
    /// 조회 주기는 시작하지 않습니다.
    pub fn load_sort_order(&self) -> SortOrder {
        let order = match self.preferences.load_sort_order() {
            Ok(Some(order)) => order,
            Ok(None) => SortOrder::Original,
            Err(e) => {
                tracing::warn!(error = %e, "정렬 순서 로드 실패, ORIGINAL 사용");
                SortOrder::Original
            }
        };

        self.sort_tx.send_replace(order);
        tracing::info!(sort_order = %order, "정렬 순서 로드");
        order
    }

    /// 한 번의 조회 → 정렬 → 발행 주기를 실행합니다.
    ///
    /// 세 데이터셋을 동시에 조회하고 모두 끝날 때까지 기다립니다.
    /// 하나라도 실패하면 에러를 반환하고 스냅샷은 바뀌지 않습니다.
    pub async fn run_cycle(&self) -> TwStockResult<Arc<Snapshot>> {
        let cycle = self.cycle_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let span = cycle_span!("sync_cycle", cycle);

        async move {
            let start = Instant::now();
            tracing::debug!(provider = self.provider.provider_name(), "주기 시작");

            let (valuations, averages, details) = tokio::join!(
                self.fetch(Dataset::Valuation, self.provider.fetch_valuations()),
                self.fetch(Dataset::Average, self.provider.fetch_averages()),
                self.fetch(Dataset::Detail, self.provider.fetch_details()),
            );

            let (valuations, averages, details) = match (valuations, averages, details) {
                (Ok(v), Ok(a), Ok(d)) => (v, a, d),
                (Err(error), _, _) | (_, Err(error), _) | (_, _, Err(error)) => {
                    tracing::error!(error = %error, "주기 실패, 이전 스냅샷 유지");
                    let _ = self.events_tx.send(SyncEvent::CycleFailed {
                        cycle,
                        error: error.clone(),
                    });
                    return Err(error);
                }
            };

            // 조회 도중 토글된 순서도 반영되도록 조회 완료 후에 읽음
            let order = *self.sort_tx.borrow();
            let snapshot = Arc::new(Snapshot::new(
                cycle,
                order,
                order.apply(details),
                order.apply(averages),
                order.apply(valuations),
            ));

            self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));

            let stats = CycleStats::from_snapshot(&snapshot, start.elapsed());
            stats.log_summary();
            let _ = self.events_tx.send(SyncEvent::CyclePublished { cycle, stats });

            Ok(snapshot)
        }
        .instrument(span)
        .await
    }

    /// 소비자 요청에 의한 즉시 갱신.
    pub async fn refresh_now(&self) -> TwStockResult<Arc<Snapshot>> {
        self.run_cycle().await
    }

    /// 정렬 순서를 토글하고 새 주기를 실행합니다.
    ///
    /// 현재 순서와 같은 순서를 요청하면 `Original`로 돌아갑니다.
    /// 새 순서는 주기 시작 전에 저장되며, 저장 실패는 경고만 남깁니다.
    pub async fn toggle_sort(&self, requested: SortOrder) -> TwStockResult<Arc<Snapshot>> {
        {
            let _guard = self.toggle_lock.lock().await;
            let from = *self.sort_tx.borrow();
            let to = from.toggled(requested);

            if let Err(e) = self.preferences.save_sort_order(to) {
                tracing::warn!(error = %e, sort_order = %to, "정렬 순서 저장 실패");
            }
            self.sort_tx.send_replace(to);

            tracing::info!(from = %from, to = %to, requested = %requested, "정렬 순서 변경");
            let _ = self.events_tx.send(SyncEvent::SortOrderChanged { from, to });
        }

        self.run_cycle().await
    }

    /// 마지막으로 발행된 스냅샷. 첫 주기가 성공하기 전에는 `None`.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    /// 현재 정렬 순서.
    pub fn sort_order(&self) -> SortOrder {
        *self.sort_tx.borrow()
    }

    /// 스냅샷 구독.
    pub fn subscribe_snapshot(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.snapshot_tx.subscribe()
    }

    /// 정렬 순서 구독.
    pub fn subscribe_sort_order(&self) -> watch::Receiver<SortOrder> {
        self.sort_tx.subscribe()
    }

    /// 엔진 이벤트 구독.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events_tx.subscribe()
    }

    /// 현재 스냅샷에서 종목코드로 가치지표를 찾습니다.
    pub fn find_valuation(&self, code: &str) -> Option<StockValuation> {
        self.snapshot_tx
            .borrow()
            .as_ref()
            .and_then(|s| s.find_valuation(code).cloned())
    }

    /// 타임아웃을 적용해 한 데이터셋을 조회합니다.
    async fn fetch<T, F>(&self, dataset: Dataset, fut: F) -> TwStockResult<Vec<T>>
    where
        F: Future<Output = TwStockResult<Vec<T>>>,
    {
        let result = match tokio::time::timeout(self.fetch_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(TwStockError::Timeout(format!(
                "{} 조회가 {:?} 안에 끝나지 않았습니다",
                dataset, self.fetch_timeout
            ))),
        };

        match &result {
            Ok(records) => tracing::debug!(dataset = %dataset, count = records.len(), "조회 완료"),
            Err(e) => tracing::warn!(dataset = %dataset, error = %e, "조회 실패"),
        }
        result
    }
}
