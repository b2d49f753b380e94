//! TWSE 시세 동기화 CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use twstock_core::{
    display_or_placeholder, init_logging, parse_stock_code, AppConfig, AverageTrend,
    ChangeDirection, LogConfig, PriceTrend, Snapshot, SortOrder, NOT_PROVIDED,
};
use twstock_data::{FilePreferenceStore, TwseApiClient};
use twstock_sync::{RefreshConfig, RefreshController, SyncEngine, SyncEvent};

#[derive(Parser)]
#[command(name = "twstock")]
#[command(about = "TWSE 일별 시세 동기화 도구", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로 (TOML)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// 로그 레벨 (설정 파일보다 우선, 예: "debug", "twstock_sync=trace")
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 한 번 동기화하고 종목 목록 출력
    Snapshot {
        /// 출력할 최대 행 수
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// 갱신 루프 실행 (Ctrl-C로 종료)
    Watch,

    /// 정렬 순서 토글 (asc, desc, original)
    Sort {
        order: SortOrder,

        /// 출력할 최대 행 수
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// 종목코드로 가치지표 조회
    Lookup { code: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // 설정 로드
    let config = AppConfig::load(cli.config.as_deref()).context("설정 로드 실패")?;

    // 로깅 초기화
    let mut log_config = LogConfig::from_app_config(&config.logging);
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {e}"))?;

    tracing::info!(base_url = %config.api.base_url, "TwStock 시작");

    let provider = TwseApiClient::new(&config.api).context("API 클라이언트 생성 실패")?;
    let preferences = FilePreferenceStore::from_config(&config.preferences);
    let engine = Arc::new(
        SyncEngine::new(Arc::new(provider), Arc::new(preferences))
            .with_fetch_timeout(config.api.request_timeout()),
    );
    engine.load_sort_order();

    match cli.command {
        Commands::Snapshot { limit } => {
            let snapshot = engine.run_cycle().await.context("동기화 실패")?;
            print_rows(&snapshot, limit);
        }
        Commands::Sort { order, limit } => {
            let snapshot = engine.toggle_sort(order).await.context("동기화 실패")?;
            println!("정렬 순서: {}", engine.sort_order());
            print_rows(&snapshot, limit);
        }
        Commands::Lookup { code } => {
            let code = parse_stock_code(&code)?;
            engine.run_cycle().await.context("동기화 실패")?;
            match engine.find_valuation(code) {
                Some(v) => {
                    println!("{} {}", v.code, v.name);
                    println!("  PER: {}", display_or_placeholder(&v.pe_ratio));
                    println!("  배당수익률: {}", display_or_placeholder(&v.dividend_yield));
                    println!("  PBR: {}", display_or_placeholder(&v.pb_ratio));
                }
                None => println!("{code}: 가치지표 없음"),
            }
        }
        Commands::Watch => {
            let refresh = RefreshConfig::from_settings(&config.sync).context("갱신 설정 오류")?;
            let controller = RefreshController::new(Arc::clone(&engine), refresh);
            let mut events = engine.subscribe_events();

            controller.activate();
            tracing::info!(mode = %refresh.mode, "=== 감시 모드 시작 ===");

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 감시 종료 중...");
                        break;
                    }
                    event = events.recv() => match event {
                        Ok(event) => print_event(&event),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "이벤트 수신 지연");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }

            controller.deactivate().await;
        }
    }

    tracing::info!("TwStock 종료");
    Ok(())
}

fn print_event(event: &SyncEvent) {
    match event {
        SyncEvent::CyclePublished { cycle, stats } => println!(
            "[#{cycle}] 발행: 일별 {} / 월평균 {} / 가치지표 {} ({}, {:.2}s)",
            stats.details,
            stats.averages,
            stats.valuations,
            stats.sort_order,
            stats.elapsed.as_secs_f64()
        ),
        SyncEvent::CycleFailed { cycle, error } => println!("[#{cycle}] 실패: {error}"),
        SyncEvent::SortOrderChanged { from, to } => println!("정렬 변경: {from} -> {to}"),
    }
}

fn print_rows(snapshot: &Snapshot, limit: usize) {
    println!(
        "#{} {} ({}종목, 정렬 {})",
        snapshot.cycle,
        snapshot.published_at.format("%Y-%m-%d %H:%M:%S"),
        snapshot.details.len(),
        snapshot.sort_order
    );

    for row in snapshot.rows().into_iter().take(limit) {
        let trend = PriceTrend::classify(row.detail, row.average);
        let monthly = row
            .average
            .map(|a| display_or_placeholder(&a.monthly_average_price))
            .unwrap_or(NOT_PROVIDED);

        println!(
            "{:<8}{:<12}{:>10} {:>8}{} {:>10}{}",
            row.code(),
            row.detail.name,
            display_or_placeholder(&row.detail.closing_price),
            display_or_placeholder(&row.detail.change),
            change_marker(trend.change),
            monthly,
            average_marker(trend.versus_average),
        );
    }
}

fn change_marker(direction: ChangeDirection) -> &'static str {
    match direction {
        ChangeDirection::Up => "▲",
        ChangeDirection::Down => "▼",
        ChangeDirection::Flat => "-",
        ChangeDirection::Unknown => " ",
    }
}

fn average_marker(trend: AverageTrend) -> &'static str {
    match trend {
        AverageTrend::Above => "↑",
        AverageTrend::Below => "↓",
        AverageTrend::Level => "=",
        AverageTrend::Unknown => " ",
    }
}
