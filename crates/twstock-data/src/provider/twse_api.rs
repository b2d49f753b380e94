//! TWSE Open API 클라이언트.
//!
//! 대만증권거래소(TWSE) Open API에서 전종목 일별 데이터를 조회합니다.
//! 인증이 필요 없으며, 각 엔드포인트는 평평한 JSON 객체 배열을 반환합니다.
//!
//! # 지원 데이터
//!
//! - 가치지표 (PER, 배당수익률, PBR)
//! - 종가 및 월평균가
//! - 일별 거래 정보 (OHLC, 거래량, 거래대금, 체결 건수)
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use twstock_core::ApiConfig;
//! use twstock_data::provider::TwseApiClient;
//!
//! let client = TwseApiClient::new(&ApiConfig::default())?;
//! let details = client.fetch_details().await?;
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use twstock_core::{
    ApiConfig, Dataset, StockAverage, StockCode, StockDetail, StockValuation, TwStockError,
    TwStockResult,
};

use super::StockDataProvider;

/// 에러 메시지에 포함할 응답 본문 최대 길이.
const MAX_ERROR_BODY: usize = 200;

/// TWSE Open API 클라이언트.
///
/// 내부 `reqwest::Client`는 연결 풀을 공유하므로 복제 비용이 작습니다.
#[derive(Debug, Clone)]
pub struct TwseApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl TwseApiClient {
    /// 설정으로 새 클라이언트를 생성합니다.
    ///
    /// 요청 타임아웃은 데이터셋 요청마다 적용됩니다.
    pub fn new(config: &ApiConfig) -> TwStockResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TwStockError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.base_url),
        })
    }

    /// 기본 URL을 교체합니다 (테스트 서버 등).
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    /// 현재 기본 URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 데이터셋 전체 URL.
    pub fn url_for(&self, dataset: Dataset) -> String {
        format!("{}{}", self.base_url, dataset.path())
    }

    /// 데이터셋 조회 및 디코딩.
    ///
    /// 코드가 비어 있는 레코드는 조인/정렬 키가 없으므로 버립니다.
    async fn request<T>(&self, dataset: Dataset) -> TwStockResult<Vec<T>>
    where
        T: DeserializeOwned + StockCode,
    {
        let url = self.url_for(dataset);

        tracing::debug!(dataset = %dataset, url = %url, "TWSE API 요청");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| transport_error(dataset, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TwStockError::Network(format!(
                "TWSE API 오류 [{}]: {} - {}",
                dataset,
                status,
                truncate(&body, MAX_ERROR_BODY)
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(dataset, e))?;

        let records: Vec<T> = serde_json::from_str(&body)
            .map_err(|e| TwStockError::Decode(format!("{} 응답 파싱 실패: {}", dataset, e)))?;

        let total = records.len();
        let records: Vec<T> = records
            .into_iter()
            .filter(|r| !r.code().trim().is_empty())
            .collect();

        if records.len() != total {
            tracing::warn!(
                dataset = %dataset,
                dropped = total - records.len(),
                "종목코드가 없는 레코드 제외"
            );
        }

        tracing::debug!(dataset = %dataset, count = records.len(), "TWSE API 조회 완료");
        Ok(records)
    }
}

#[async_trait]
impl StockDataProvider for TwseApiClient {
    async fn fetch_valuations(&self) -> TwStockResult<Vec<StockValuation>> {
        self.request(Dataset::Valuation).await
    }

    async fn fetch_averages(&self) -> TwStockResult<Vec<StockAverage>> {
        self.request(Dataset::Average).await
    }

    async fn fetch_details(&self) -> TwStockResult<Vec<StockDetail>> {
        self.request(Dataset::Detail).await
    }

    fn provider_name(&self) -> &str {
        "TWSE"
    }
}

/// reqwest 에러를 도메인 에러로 변환.
fn transport_error(dataset: Dataset, err: reqwest::Error) -> TwStockError {
    if err.is_timeout() {
        TwStockError::Timeout(format!("{} 요청 시간 초과: {}", dataset, err))
    } else if err.is_decode() {
        TwStockError::Decode(format!("{} 응답 읽기 실패: {}", dataset, err))
    } else {
        TwStockError::Network(format!("{} 요청 실패: {}", dataset, err))
    }
}

/// 기본 URL 끝에 `/`를 보장.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
