//! 주기적 갱신 루프.
//!
//! 소비자가 보내는 명시적 활성화/비활성화 신호에 따라 동기화 주기를 실행합니다.
//!
//! - `OncePerActivation`: 활성화될 때마다 한 번 실행하고 다음 신호(또는 정렬 토글)까지 대기
//! - `Continuous`: 주기 완료 후 고정 간격만큼 쉬고 다시 실행 (지터/백오프 없음)
//!
//! 비활성화 시 진행 중인 주기는 끝까지 실행되지만, 새 주기는 예약되지 않습니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use twstock_core::{SyncSettings, TwStockError, TwStockResult};

use crate::engine::SyncEngine;

/// 갱신 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshMode {
    /// 활성화당 한 번
    OncePerActivation,
    /// 고정 간격 반복
    Continuous,
}

impl fmt::Display for RefreshMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshMode::OncePerActivation => f.write_str("once-per-activation"),
            RefreshMode::Continuous => f.write_str("continuous"),
        }
    }
}

impl FromStr for RefreshMode {
    type Err = TwStockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "once-per-activation" => Ok(RefreshMode::OncePerActivation),
            "continuous" => Ok(RefreshMode::Continuous),
            other => Err(TwStockError::Config(format!("알 수 없는 갱신 모드: {}", other))),
        }
    }
}

/// 갱신 루프 설정.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub mode: RefreshMode,
    /// continuous 모드에서 주기 완료 후 다음 주기까지의 대기 시간
    pub poll_interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            mode: RefreshMode::Continuous,
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl RefreshConfig {
    pub fn once_per_activation() -> Self {
        Self {
            mode: RefreshMode::OncePerActivation,
            ..Default::default()
        }
    }

    pub fn continuous(poll_interval: Duration) -> Self {
        Self {
            mode: RefreshMode::Continuous,
            poll_interval,
        }
    }

    /// 애플리케이션 설정의 `[sync]` 섹션에서 생성합니다.
    pub fn from_settings(settings: &SyncSettings) -> TwStockResult<Self> {
        Ok(Self {
            mode: settings.refresh_mode.parse()?,
            poll_interval: settings.poll_interval(),
        })
    }
}

struct ActiveLoop {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// 갱신 루프 제어기.
///
/// 컨트롤러가 drop 되면 실행 중인 루프도 취소됩니다.
pub struct RefreshController {
    engine: Arc<SyncEngine>,
    config: RefreshConfig,
    active: Mutex<Option<ActiveLoop>>,
}

impl RefreshController {
    pub fn new(engine: Arc<SyncEngine>, config: RefreshConfig) -> Self {
        Self {
            engine,
            config,
            active: Mutex::new(None),
        }
    }

    pub fn config(&self) -> RefreshConfig {
        self.config
    }

    /// 활성화 신호.
    ///
    /// 루프가 이미 실행 중이면 아무것도 하지 않고 `false`를 반환합니다.
    /// tokio 런타임 안에서 호출해야 합니다.
    pub fn activate(&self) -> bool {
        let mut active = match self.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(current) = active.as_ref() {
            if !current.handle.is_finished() && !current.shutdown.is_cancelled() {
                tracing::debug!("갱신 루프가 이미 실행 중");
                return false;
            }
        }

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.engine),
            self.config,
            shutdown.clone(),
        ));

        tracing::info!(
            mode = %self.config.mode,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "갱신 루프 활성화"
        );
        *active = Some(ActiveLoop { shutdown, handle });
        true
    }

    /// 비활성화 신호.
    ///
    /// 루프에 취소를 알리고 종료될 때까지 기다립니다. 진행 중인 주기는 중단하지 않습니다.
    /// 실행 중인 루프가 없었으면 (이미 끝난 once 루프 포함) `false`를 반환합니다.
    pub async fn deactivate(&self) -> bool {
        let current = match self.active.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        let Some(ActiveLoop { shutdown, handle }) = current else {
            return false;
        };

        let was_running = !handle.is_finished() && !shutdown.is_cancelled();
        shutdown.cancel();
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "갱신 루프 종료 실패");
        }

        if was_running {
            tracing::info!("갱신 루프 비활성화");
        }
        was_running
    }

    /// 루프가 실행 중인지 여부.
    pub fn is_active(&self) -> bool {
        let active = match self.active.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        active
            .as_ref()
            .is_some_and(|a| !a.handle.is_finished() && !a.shutdown.is_cancelled())
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        let active = match self.active.get_mut() {
            Ok(active) => active.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(active) = active {
            active.shutdown.cancel();
        }
    }
}

/// 갱신 루프 본체.
async fn run_loop(engine: Arc<SyncEngine>, config: RefreshConfig, shutdown: CancellationToken) {
    let mut iteration = 0u64;

    loop {
        if shutdown.is_cancelled() {
            break;
        }

        iteration += 1;
        // 주기 자체는 취소와 경쟁시키지 않음 (진행 중 주기는 끝까지 실행)
        match engine.run_cycle().await {
            Ok(snapshot) => {
                tracing::debug!(iteration, cycle = snapshot.cycle, "갱신 주기 완료");
            }
            Err(e) => {
                tracing::error!(iteration, error = %e, "갱신 주기 실패, 다음 주기에서 재시도");
            }
        }

        if config.mode == RefreshMode::OncePerActivation {
            break;
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(config.poll_interval) => {}
        }
    }

    tracing::debug!(iterations = iteration, "갱신 루프 종료");
}
