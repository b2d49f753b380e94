//! 시세 동기화 시스템의 에러 타입.
//!
//! 데이터 수집, 디코딩, 설정 저장 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TwStockError {
    /// 네트워크 에러 (연결 실패, 비정상 HTTP 상태)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 요청 시간 초과
    #[error("시간 초과: {0}")]
    Timeout(String),

    /// 응답 디코딩 에러
    #[error("디코딩 에러: {0}")]
    Decode(String),

    /// 설정 저장소 에러
    #[error("설정 저장소 에러: {0}")]
    Persistence(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 시세 동기화 작업을 위한 Result 타입.
pub type TwStockResult<T> = Result<T, TwStockError>;

impl TwStockError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 엔진은 자동으로 재시도하지 않으며, 다음 주기가 재시도 역할을 합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TwStockError::Network(_) | TwStockError::Timeout(_))
    }
}

impl From<serde_json::Error> for TwStockError {
    fn from(err: serde_json::Error) -> Self {
        TwStockError::Decode(err.to_string())
    }
}

impl From<config::ConfigError> for TwStockError {
    fn from(err: config::ConfigError) -> Self {
        TwStockError::Config(err.to_string())
    }
}
