//! 종목코드 기준 정렬 순서.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::record::StockCode;

/// 종목코드 기준 정렬 순서.
///
/// 직렬화 이름(`ORIGINAL`, `ASC`, `DESC`)은 설정 저장소에 그대로 기록됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// 수신 순서 유지
    #[default]
    #[serde(rename = "ORIGINAL")]
    Original,
    /// 코드 오름차순
    #[serde(rename = "ASC")]
    Ascending,
    /// 코드 내림차순
    #[serde(rename = "DESC")]
    Descending,
}

impl SortOrder {
    /// 저장소 표기.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Original => "ORIGINAL",
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }

    /// 3단 토글.
    ///
    /// 현재 순서와 같은 순서를 다시 요청하면 `Original`로 돌아갑니다.
    pub fn toggled(self, requested: SortOrder) -> SortOrder {
        if self == requested {
            SortOrder::Original
        } else {
            requested
        }
    }

    /// 목록을 종목코드 문자열 기준으로 정렬합니다.
    ///
    /// 안정 정렬이므로 같은 코드의 레코드는 수신 순서를 유지합니다.
    pub fn apply<T: StockCode>(&self, mut items: Vec<T>) -> Vec<T> {
        match self {
            SortOrder::Original => {}
            SortOrder::Ascending => items.sort_by(|a, b| a.code().cmp(b.code())),
            SortOrder::Descending => items.sort_by(|a, b| b.code().cmp(a.code())),
        }
        items
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" | "none" => Ok(SortOrder::Original),
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}
