//! 시세 데이터 Provider 모듈.
//!
//! ## TWSE Open API
//! - `TwseApiClient`: 대만증권거래소 Open API 클라이언트 (인증 불필요)
//! - 가치지표(BWIBBU_ALL), 월평균가(STOCK_DAY_AVG_ALL), 일별 거래 정보(STOCK_DAY_ALL)

pub mod twse_api;

pub use twse_api::TwseApiClient;

use async_trait::async_trait;
use twstock_core::{StockAverage, StockDetail, StockValuation, TwStockResult};

/// 세 데이터셋 조회 추상화.
///
/// 각 메서드는 독립적으로 호출되며, 동기화 엔진이 세 호출을 동시에 실행합니다.
///
/// # Errors
///
/// - `TwStockError::Network`: 연결 실패 또는 비정상 HTTP 상태
/// - `TwStockError::Timeout`: 요청 시간 초과
/// - `TwStockError::Decode`: 응답 본문 파싱 실패
#[async_trait]
pub trait StockDataProvider: Send + Sync {
    /// 가치지표 전종목 조회.
    async fn fetch_valuations(&self) -> TwStockResult<Vec<StockValuation>>;

    /// 종가 및 월평균가 전종목 조회.
    async fn fetch_averages(&self) -> TwStockResult<Vec<StockAverage>>;

    /// 일별 거래 정보 전종목 조회.
    async fn fetch_details(&self) -> TwStockResult<Vec<StockDetail>>;

    /// 로깅용 Provider 이름.
    fn provider_name(&self) -> &str;
}
