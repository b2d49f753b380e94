//! # TwStock Core
//!
//! 대만증권거래소(TWSE) 일별 시세 뷰어의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일별 시세/평균가/가치지표 레코드
//! - 정렬 순서 및 스냅샷
//! - 종목코드 기준 조인 및 가격 추세 분류
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
