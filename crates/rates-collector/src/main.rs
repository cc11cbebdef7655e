//! BTC 시세 캐시 데몬 CLI.

use clap::{Parser, Subcommand};
use rates_collector::{
    build_provider, CollectorConfig, CycleOutcome, PollSettings, Poller, TokioTicker,
};
use rates_data::{CacheWriter, RedisStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rates-collector")]
#[command(about = "BTC fiat rate cache daemon", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 데몬 모드: 주기적으로 시세를 조회해 캐시 갱신
    Daemon,

    /// 한 번만 조회해 캐시 갱신
    Once {
        /// 주기 통계를 JSON 형식으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 캐시된 시세 출력
    Show {
        /// JSON 형식으로 출력
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rates_collector={level},rates_data={level}",
                    level = cli.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Rates Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(
        redis_url = %config.redis.url,
        redis_db = config.redis.db,
        provider = %config.provider.kind,
        "설정 로드 완료"
    );

    // Redis 연결 풀 (연결은 첫 사용 시 생성)
    let store = RedisStore::connect(&config.redis)?;
    if let Err(e) = store.health_check().await {
        tracing::warn!(error = %e, "Redis 연결 확인 실패, 다음 주기에 재시도");
    }

    let writer = CacheWriter::new(store).with_empty_fields_policy(config.cache.empty_fields);

    match cli.command {
        Commands::Daemon => {
            let provider = build_provider(&config.provider)?;
            let mut poller = Poller::new(provider, writer, TokioTicker, PollSettings::from(&config));

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("종료 신호 수신, 데몬 종료 중...");
                }
                result = poller.run() => {
                    result?;
                }
            }
        }
        Commands::Once { json } => {
            let provider = build_provider(&config.provider)?;
            let mut poller = Poller::new(provider, writer, TokioTicker, PollSettings::from(&config));
            let outcome = poller.run_cycle().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(poller.stats())?);
            }
            if !matches!(outcome, CycleOutcome::Updated { .. }) {
                return Err(format!("1회 수집 실패: {:?}", outcome).into());
            }
            tracing::info!(?outcome, "1회 수집 완료");
        }
        Commands::Show { json } => {
            let entry = writer.read(&config.cache.key).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                match entry.ttl_secs {
                    Some(ttl) => println!("{} (ttl {}s)", entry.key, ttl),
                    None => println!("{} (no ttl)", entry.key),
                }
                for (code, price) in &entry.fields {
                    println!("  {:<4} {}", code, price);
                }
            }
        }
    }

    tracing::info!("Rates Collector 종료");

    Ok(())
}
