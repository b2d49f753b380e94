//! 원자적으로 발행되는 시세 스냅샷.
//!
//! 세 목록은 길이나 위치가 서로 맞는다는 보장이 없습니다.
//! 목록 간 대응은 항상 종목코드로 찾아야 하며 인덱스로 짝지으면 안 됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::record::{StockAverage, StockCode, StockDetail, StockValuation};
use super::sort::SortOrder;

/// 한 번의 동기화 주기로 만들어진 불변 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 생성한 주기 번호 (1부터 증가)
    pub cycle: u64,
    /// 적용된 정렬 순서
    pub sort_order: SortOrder,
    /// 발행 시각
    pub published_at: DateTime<Utc>,
    /// 일별 거래 정보
    pub details: Vec<StockDetail>,
    /// 종가 및 월평균가
    pub averages: Vec<StockAverage>,
    /// 가치지표
    pub valuations: Vec<StockValuation>,
}

/// 종목코드로 조인한 한 종목의 행.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRow<'a> {
    pub detail: &'a StockDetail,
    pub average: Option<&'a StockAverage>,
    pub valuation: Option<&'a StockValuation>,
}

impl StockRow<'_> {
    pub fn code(&self) -> &str {
        self.detail.code()
    }
}

impl Snapshot {
    /// 정렬된 세 목록으로 스냅샷을 만듭니다.
    pub fn new(
        cycle: u64,
        sort_order: SortOrder,
        details: Vec<StockDetail>,
        averages: Vec<StockAverage>,
        valuations: Vec<StockValuation>,
    ) -> Self {
        Self {
            cycle,
            sort_order,
            published_at: Utc::now(),
            details,
            averages,
            valuations,
        }
    }

    /// 세 목록이 모두 비었는지 여부.
    pub fn is_empty(&self) -> bool {
        self.details.is_empty() && self.averages.is_empty() && self.valuations.is_empty()
    }

    /// 세 목록의 레코드 수 합계.
    pub fn len(&self) -> usize {
        self.details.len() + self.averages.len() + self.valuations.len()
    }

    /// 코드가 일치하는 첫 번째 가치지표를 찾습니다.
    ///
    /// 상세 조회용 단건 검색이므로 선형 탐색으로 충분합니다.
    pub fn find_valuation(&self, code: &str) -> Option<&StockValuation> {
        find_by_code(&self.valuations, code)
    }

    /// 코드가 일치하는 첫 번째 일별 거래 정보를 찾습니다.
    pub fn find_detail(&self, code: &str) -> Option<&StockDetail> {
        find_by_code(&self.details, code)
    }

    /// 코드가 일치하는 첫 번째 월평균가를 찾습니다.
    pub fn find_average(&self, code: &str) -> Option<&StockAverage> {
        find_by_code(&self.averages, code)
    }

    /// 일별 거래 정보 순서대로 세 목록을 종목코드로 조인합니다.
    ///
    /// 보조 목록에 같은 코드가 여러 번 있으면 첫 번째 레코드를 사용합니다.
    pub fn rows(&self) -> Vec<StockRow<'_>> {
        let averages = index_by_code(&self.averages);
        let valuations = index_by_code(&self.valuations);

        self.details
            .iter()
            .map(|detail| StockRow {
                detail,
                average: averages.get(detail.code()).copied(),
                valuation: valuations.get(detail.code()).copied(),
            })
            .collect()
    }
}

fn find_by_code<'a, T: StockCode>(items: &'a [T], code: &str) -> Option<&'a T> {
    items.iter().find(|item| item.code() == code)
}

fn index_by_code<T: StockCode>(items: &[T]) -> HashMap<&str, &T> {
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        index.entry(item.code()).or_insert(item);
    }
    index
}
