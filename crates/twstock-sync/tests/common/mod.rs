//! 동기화 테스트용 공통 헬퍼.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use twstock_core::{
    Dataset, StockAverage, StockDetail, StockValuation, TwStockError, TwStockResult,
};
use twstock_data::StockDataProvider;

pub fn detail(code: &str, close: &str, change: &str) -> StockDetail {
    StockDetail {
        code: code.to_string(),
        name: format!("종목{code}"),
        trade_volume: "1000".to_string(),
        trade_value: "100000".to_string(),
        opening_price: close.to_string(),
        highest_price: close.to_string(),
        lowest_price: close.to_string(),
        closing_price: close.to_string(),
        change: change.to_string(),
        transaction: "10".to_string(),
    }
}

pub fn average(code: &str, close: &str, monthly: &str) -> StockAverage {
    StockAverage {
        code: code.to_string(),
        name: format!("종목{code}"),
        closing_price: close.to_string(),
        monthly_average_price: monthly.to_string(),
    }
}

pub fn valuation(code: &str, pe: &str) -> StockValuation {
    StockValuation {
        code: code.to_string(),
        name: format!("종목{code}"),
        pe_ratio: pe.to_string(),
        dividend_yield: "2.5".to_string(),
        pb_ratio: "1.1".to_string(),
    }
}

pub fn codes<T: twstock_core::StockCode>(items: &[T]) -> Vec<String> {
    items.iter().map(|i| i.code().to_string()).collect()
}

#[derive(Default)]
struct MockState {
    details: Vec<StockDetail>,
    averages: Vec<StockAverage>,
    valuations: Vec<StockValuation>,
    // 조회마다 하나씩 꺼내 쓰는 (지연, 응답) 큐. 비면 기본 응답
    detail_script: VecDeque<(Duration, Vec<StockDetail>)>,
    latency: HashMap<Dataset, Duration>,
    failing: HashSet<Dataset>,
    calls: HashMap<Dataset, usize>,
}

/// 지연/실패를 주입할 수 있는 메모리 데이터 제공자.
#[derive(Default)]
pub struct MockProvider {
    state: Mutex<MockState>,
}

impl MockProvider {
    /// 2330, 2317 순서로 응답하는 기본 제공자.
    pub fn sample() -> Self {
        Self::with_records(
            vec![detail("2330", "605", "+5"), detail("2317", "398", "-2")],
            vec![average("2330", "605", "598"), average("2317", "398", "401")],
            vec![valuation("2330", "25.3"), valuation("2317", "")],
        )
    }

    pub fn with_records(
        details: Vec<StockDetail>,
        averages: Vec<StockAverage>,
        valuations: Vec<StockValuation>,
    ) -> Self {
        Self {
            state: Mutex::new(MockState {
                details,
                averages,
                valuations,
                ..Default::default()
            }),
        }
    }

    /// 모든 데이터셋에 같은 지연을 설정합니다.
    pub fn with_latency(self, latency: Duration) -> Self {
        for dataset in Dataset::ALL {
            self.set_latency(dataset, latency);
        }
        self
    }

    pub fn set_latency(&self, dataset: Dataset, latency: Duration) {
        self.state.lock().unwrap().latency.insert(dataset, latency);
    }

    pub fn set_failing(&self, dataset: Dataset, failing: bool) {
        let mut state = self.state.lock().unwrap();
        if failing {
            state.failing.insert(dataset);
        } else {
            state.failing.remove(&dataset);
        }
    }

    /// 다음 일별 거래 정보 조회의 지연과 응답을 예약합니다.
    pub fn push_detail_response(&self, latency: Duration, details: Vec<StockDetail>) {
        self.state
            .lock()
            .unwrap()
            .detail_script
            .push_back((latency, details));
    }

    pub fn calls(&self, dataset: Dataset) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(&dataset)
            .copied()
            .unwrap_or(0)
    }

    fn begin(&self, dataset: Dataset) -> (Duration, bool) {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(dataset).or_insert(0) += 1;
        let latency = state.latency.get(&dataset).copied().unwrap_or_default();
        (latency, state.failing.contains(&dataset))
    }

    async fn respond<T: Clone>(
        &self,
        dataset: Dataset,
        latency: Duration,
        failing: bool,
        records: Vec<T>,
    ) -> TwStockResult<Vec<T>> {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if failing {
            return Err(TwStockError::Network(format!("{dataset}: 503 Service Unavailable")));
        }
        Ok(records)
    }
}

#[async_trait]
impl StockDataProvider for MockProvider {
    async fn fetch_valuations(&self) -> TwStockResult<Vec<StockValuation>> {
        let (latency, failing) = self.begin(Dataset::Valuation);
        let records = self.state.lock().unwrap().valuations.clone();
        self.respond(Dataset::Valuation, latency, failing, records).await
    }

    async fn fetch_averages(&self) -> TwStockResult<Vec<StockAverage>> {
        let (latency, failing) = self.begin(Dataset::Average);
        let records = self.state.lock().unwrap().averages.clone();
        self.respond(Dataset::Average, latency, failing, records).await
    }

    async fn fetch_details(&self) -> TwStockResult<Vec<StockDetail>> {
        let (mut latency, failing) = self.begin(Dataset::Detail);
        let records = {
            let mut state = self.state.lock().unwrap();
            match state.detail_script.pop_front() {
                Some((scripted, records)) => {
                    latency = scripted;
                    records
                }
                None => state.details.clone(),
            }
        };
        self.respond(Dataset::Detail, latency, failing, records).await
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
