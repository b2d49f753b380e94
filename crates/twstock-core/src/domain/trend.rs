//! 가격 추세 분류.
//!
//! 문자열 필드를 `Decimal`로 해석해 종가와 월평균가, 전일대비 등락을 비교합니다.
//! 해석할 수 없는 값은 `Unknown`으로 분류합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::record::{StockAverage, StockDetail};

/// 종가와 월평균가의 관계.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AverageTrend {
    /// 종가 > 월평균가
    Above,
    /// 종가 < 월평균가
    Below,
    /// 종가 == 월평균가
    Level,
    Unknown,
}

/// 전일대비 등락 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeDirection {
    Up,
    Down,
    Flat,
    Unknown,
}

/// 한 종목의 가격 추세.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTrend {
    pub versus_average: AverageTrend,
    pub change: ChangeDirection,
}

impl PriceTrend {
    /// 일별 거래 정보와 (있다면) 같은 코드의 월평균가로 추세를 계산합니다.
    ///
    /// 종가는 일별 거래 정보의 값을 사용합니다.
    pub fn classify(detail: &StockDetail, average: Option<&StockAverage>) -> Self {
        let versus_average = match average {
            Some(avg) => closing_vs_average(&detail.closing_price, &avg.monthly_average_price),
            None => AverageTrend::Unknown,
        };

        Self {
            versus_average,
            change: change_direction(&detail.change),
        }
    }
}

/// 종가와 월평균가를 비교합니다.
pub fn closing_vs_average(closing: &str, monthly_average: &str) -> AverageTrend {
    match (parse_price(closing), parse_price(monthly_average)) {
        (Some(close), Some(avg)) => match close.cmp(&avg) {
            Ordering::Greater => AverageTrend::Above,
            Ordering::Less => AverageTrend::Below,
            Ordering::Equal => AverageTrend::Level,
        },
        _ => AverageTrend::Unknown,
    }
}

/// 전일대비 값의 부호로 등락 방향을 판단합니다.
pub fn change_direction(change: &str) -> ChangeDirection {
    match parse_price(change) {
        Some(v) if v > Decimal::ZERO => ChangeDirection::Up,
        Some(v) if v < Decimal::ZERO => ChangeDirection::Down,
        Some(_) => ChangeDirection::Flat,
        None => ChangeDirection::Unknown,
    }
}

/// 가격 문자열을 Decimal로 파싱 (쉼표, 앞의 `+` 제거).
pub fn parse_price(s: &str) -> Option<Decimal> {
    let cleaned = s.trim().replace(',', "");
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}
