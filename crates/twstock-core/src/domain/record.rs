//! TWSE Open API 데이터셋 레코드.
//!
//! 모든 필드는 수신한 그대로의 문자열입니다. 숫자 해석은 표시 계층
//! ([`crate::domain::trend`])에서만 수행합니다.
//!
//! JSON 필드명은 TWSE 응답과 정확히 일치해야 합니다.

use serde::{Deserialize, Serialize};

use crate::error::{TwStockError, TwStockResult};

/// 종목코드 접근자.
///
/// 정렬과 코드 기준 조인에 사용되는 공통 기능입니다.
pub trait StockCode {
    /// 종목코드 (예: "2330")
    fn code(&self) -> &str;
}

/// TWSE 데이터셋 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dataset {
    /// PER/배당수익률/PBR (BWIBBU_ALL)
    Valuation,
    /// 종가 및 월평균가 (STOCK_DAY_AVG_ALL)
    Average,
    /// 일별 거래 정보 (STOCK_DAY_ALL)
    Detail,
}

impl Dataset {
    /// 모든 데이터셋.
    pub const ALL: [Dataset; 3] = [Dataset::Valuation, Dataset::Average, Dataset::Detail];

    /// 기본 URL 기준 상대 경로.
    pub fn path(&self) -> &'static str {
        match self {
            Dataset::Valuation => "exchangeReport/BWIBBU_ALL",
            Dataset::Average => "exchangeReport/STOCK_DAY_AVG_ALL",
            Dataset::Detail => "exchangeReport/STOCK_DAY_ALL",
        }
    }

    /// 로그용 이름.
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Valuation => "valuation",
            Dataset::Average => "average",
            Dataset::Detail => "detail",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 일별 거래 정보 (`exchangeReport/STOCK_DAY_ALL`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDetail {
    /// 종목코드
    #[serde(rename = "Code")]
    pub code: String,
    /// 종목명
    #[serde(rename = "Name", default)]
    pub name: String,
    /// 거래량 (주)
    #[serde(rename = "TradeVolume", default)]
    pub trade_volume: String,
    /// 거래대금
    #[serde(rename = "TradeValue", default)]
    pub trade_value: String,
    /// 시가
    #[serde(rename = "OpeningPrice", default)]
    pub opening_price: String,
    /// 고가
    #[serde(rename = "HighestPrice", default)]
    pub highest_price: String,
    /// 저가
    #[serde(rename = "LowestPrice", default)]
    pub lowest_price: String,
    /// 종가
    #[serde(rename = "ClosingPrice", default)]
    pub closing_price: String,
    /// 전일대비
    #[serde(rename = "Change", default)]
    pub change: String,
    /// 체결 건수
    #[serde(rename = "Transaction", default)]
    pub transaction: String,
}

/// 종가 및 월평균가 (`exchangeReport/STOCK_DAY_AVG_ALL`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAverage {
    /// 종목코드
    #[serde(rename = "Code")]
    pub code: String,
    /// 종목명
    #[serde(rename = "Name", default)]
    pub name: String,
    /// 종가
    #[serde(rename = "ClosingPrice", default)]
    pub closing_price: String,
    /// 월평균가
    #[serde(rename = "MonthlyAveragePrice", default)]
    pub monthly_average_price: String,
}

/// 가치지표 (`exchangeReport/BWIBBU_ALL`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockValuation {
    /// 종목코드
    #[serde(rename = "Code")]
    pub code: String,
    /// 종목명
    #[serde(rename = "Name", default)]
    pub name: String,
    /// PER
    #[serde(rename = "PEratio", default)]
    pub pe_ratio: String,
    /// 배당수익률 (%)
    #[serde(rename = "DividendYield", default)]
    pub dividend_yield: String,
    /// PBR
    #[serde(rename = "PBratio", default)]
    pub pb_ratio: String,
}

impl StockCode for StockDetail {
    fn code(&self) -> &str {
        &self.code
    }
}

impl StockCode for StockAverage {
    fn code(&self) -> &str {
        &self.code
    }
}

impl StockCode for StockValuation {
    fn code(&self) -> &str {
        &self.code
    }
}

/// 표시용 자리표시자.
pub const NOT_PROVIDED: &str = "N/A";

/// 빈 값이면 [`NOT_PROVIDED`]를, 아니면 원래 값을 반환합니다.
pub fn display_or_placeholder(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_PROVIDED
    } else {
        trimmed
    }
}

/// 사용자가 입력한 종목코드를 검증합니다.
///
/// 앞뒤 공백은 제거하며, 비어 있거나 영숫자가 아닌 문자가 있으면 `InvalidInput`.
pub fn parse_stock_code(input: &str) -> TwStockResult<&str> {
    let code = input.trim();
    if code.is_empty() {
        return Err(TwStockError::InvalidInput("종목코드가 비어 있습니다".to_string()));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TwStockError::InvalidInput(format!(
            "잘못된 종목코드: {}",
            code
        )));
    }
    Ok(code)
}
