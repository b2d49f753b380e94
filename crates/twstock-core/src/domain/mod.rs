//! 시세 뷰어의 도메인 모델.
//!
//! - [`record`]: TWSE 데이터셋 레코드 (일별 시세, 월평균가, 가치지표)
//! - [`sort`]: 종목코드 기준 3단 정렬 순서
//! - [`snapshot`]: 원자적으로 발행되는 세 목록의 묶음과 코드 기준 조인
//! - [`trend`]: 종가/등락 기반 가격 추세 분류

pub mod record;
pub mod snapshot;
pub mod sort;
pub mod trend;

pub use record::*;
pub use snapshot::*;
pub use sort::*;
pub use trend::*;
