//! 외부 데이터 소스 및 사용자 설정 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - TWSE Open API 클라이언트 (세 데이터셋 조회)
//! - 정렬 순서를 보존하는 설정 저장소 (파일, 메모리)

pub mod preference;
pub mod provider;

pub use preference::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use provider::{StockDataProvider, TwseApiClient};
