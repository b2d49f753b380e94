//! 동기화 주기 통계.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use twstock_core::{Snapshot, SortOrder};

/// 한 번의 성공한 주기 통계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    /// 주기 번호
    pub cycle: u64,
    /// 적용된 정렬 순서
    pub sort_order: SortOrder,
    /// 일별 거래 정보 건수
    pub details: usize,
    /// 월평균가 건수
    pub averages: usize,
    /// 가치지표 건수
    pub valuations: usize,
    /// 조회부터 발행까지 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CycleStats {
    /// 발행된 스냅샷에서 통계를 만듭니다.
    pub fn from_snapshot(snapshot: &Snapshot, elapsed: Duration) -> Self {
        Self {
            cycle: snapshot.cycle,
            sort_order: snapshot.sort_order,
            details: snapshot.details.len(),
            averages: snapshot.averages.len(),
            valuations: snapshot.valuations.len(),
            elapsed,
        }
    }

    /// 세 데이터셋의 총 레코드 수
    pub fn total(&self) -> usize {
        self.details + self.averages + self.valuations
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            cycle = self.cycle,
            sort_order = %self.sort_order,
            details = self.details,
            averages = self.averages,
            valuations = self.valuations,
            total = self.total(),
            elapsed = format!("{:.2}s", self.elapsed.as_secs_f64()),
            "스냅샷 발행"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_snapshot() {
        let snapshot = Snapshot::new(7, SortOrder::Descending, vec![], vec![], vec![]);
        let stats = CycleStats::from_snapshot(&snapshot, Duration::from_millis(250));

        assert_eq!(stats.cycle, 7);
        assert_eq!(stats.sort_order, SortOrder::Descending);
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.elapsed, Duration::from_millis(250));
    }
}
