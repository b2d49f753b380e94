//! TWSE 시세 동기화 엔진.
//!
//! 이 crate는 세 데이터셋을 동시에 조회해 하나의 스냅샷으로 발행하는 엔진을 제공합니다:
//! - 동시 조회 → 정렬 → 원자적 발행 주기 (`SyncEngine`)
//! - 3단 정렬 토글과 설정 저장
//! - 활성화 신호에 묶인 주기적 갱신 루프 (`RefreshController`)

pub mod engine;
pub mod refresh;
pub mod stats;

pub use engine::{SyncEngine, SyncEvent, DEFAULT_FETCH_TIMEOUT};
pub use refresh::{RefreshConfig, RefreshController, RefreshMode};
pub use stats::CycleStats;
