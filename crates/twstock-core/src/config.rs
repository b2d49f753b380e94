//! 설정 관리.
//!
//! TOML 파일과 `TWSTOCK__` 접두사 환경 변수에서 애플리케이션 설정을 로드합니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{TwStockError, TwStockResult};

/// TWSE Open API 기본 URL.
pub const DEFAULT_BASE_URL: &str = "https://openapi.twse.com.tw/v1/";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// TWSE API 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 동기화 주기 설정
    #[serde(default)]
    pub sync: SyncSettings,
    /// 사용자 설정 저장소
    #[serde(default)]
    pub preferences: PreferencesConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// TWSE API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// REST API 기본 URL (끝의 `/` 포함)
    pub base_url: String,
    /// 데이터셋 요청당 타임아웃 (밀리초)
    pub request_timeout_ms: u64,
    /// 연결 타임아웃 (밀리초)
    pub connect_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
        }
    }
}

impl ApiConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// 연결 타임아웃을 Duration으로 반환
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// 동기화 주기 설정.
///
/// `refresh_mode`는 `continuous` 또는 `once-per-activation` 입니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    /// 갱신 모드
    pub refresh_mode: String,
    /// continuous 모드의 주기 간 대기 시간 (밀리초)
    pub poll_interval_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            refresh_mode: "continuous".to_string(),
            poll_interval_ms: 5_000,
        }
    }
}

impl SyncSettings {
    /// 주기 간 대기 시간을 Duration으로 반환
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// 사용자 설정 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreferencesConfig {
    /// 설정 파일 경로
    pub path: PathBuf,
    /// 정렬 순서 저장 키
    pub sort_order_key: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("twstock-prefs.json"),
            sort_order_key: "sort_order".to_string(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load(path: Option<&Path>) -> TwStockResult<Self> {
        let defaults = AppConfig::default();
        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.request_timeout_ms", defaults.api.request_timeout_ms)?
            .set_default("api.connect_timeout_ms", defaults.api.connect_timeout_ms)?
            .set_default("sync.refresh_mode", defaults.sync.refresh_mode)?
            .set_default("sync.poll_interval_ms", defaults.sync.poll_interval_ms)?
            .set_default(
                "preferences.path",
                defaults.preferences.path.to_string_lossy().into_owned(),
            )?
            .set_default("preferences.sort_order_key", defaults.preferences.sort_order_key)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("TWSTOCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> TwStockResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(TwStockError::Config("api.base_url이 비어 있습니다".to_string()));
        }
        if self.api.request_timeout_ms == 0 {
            return Err(TwStockError::Config(
                "api.request_timeout_ms는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.sync.refresh_mode == "continuous" && self.sync.poll_interval_ms == 0 {
            return Err(TwStockError::Config(
                "continuous 모드에서 sync.poll_interval_ms는 0보다 커야 합니다".to_string(),
            ));
        }
        if !matches!(
            self.sync.refresh_mode.as_str(),
            "continuous" | "once-per-activation"
        ) {
            return Err(TwStockError::Config(format!(
                "알 수 없는 sync.refresh_mode: {}",
                self.sync.refresh_mode
            )));
        }
        if self.preferences.sort_order_key.is_empty() {
            return Err(TwStockError::Config(
                "preferences.sort_order_key가 비어 있습니다".to_string(),
            ));
        }
        Ok(())
    }
}
