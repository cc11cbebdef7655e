//! 시세 폴링 루프.
//!
//! 조회 → 캐시 기록 → 대기를 반복합니다. 대기는 `Ticker`를 통해 이루어지므로
//! 테스트에서는 가짜 ticker로 정해진 횟수만 실행할 수 있습니다.

use crate::config::CollectorConfig;
use crate::error::CollectorError;
use crate::stats::PollStats;
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;
use rates_data::{CacheStore, CacheWriter, RateProvider};
use std::str::FromStr;
use std::time::{Duration, Instant};

/// 조회/기록 실패 시 루프 동작.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// 로그만 남기고 다음 주기 계속
    #[default]
    Continue,
    /// 에러를 반환하고 루프 종료
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            other => Err(CollectorError::Config(format!(
                "unknown failure policy: {}",
                other
            ))),
        }
    }
}

/// 한 주기의 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// 캐시 갱신 완료
    Updated { fields: usize },
    /// 시세 조회 실패 (캐시는 그대로)
    FetchFailed,
    /// 캐시 기록 실패
    CacheFailed,
}

/// 주기 사이의 대기.
#[async_trait]
pub trait Ticker: Send {
    async fn wait(&mut self, period: Duration);
}

/// tokio 타이머 기반 ticker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTicker;

#[async_trait]
impl Ticker for TokioTicker {
    async fn wait(&mut self, period: Duration) {
        tokio::time::sleep(period).await;
    }
}

/// 폴링 루프 설정.
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub key: String,
    pub ttl_secs: u64,
    pub interval: Duration,
    pub failure_policy: FailurePolicy,
}

impl From<&CollectorConfig> for PollSettings {
    fn from(config: &CollectorConfig) -> Self {
        Self {
            key: config.cache.key.clone(),
            ttl_secs: config.cache.ttl_secs,
            interval: config.poll.interval(),
            failure_policy: config.poll.failure_policy,
        }
    }
}

/// 시세 제공자와 캐시 기록기를 묶어 주기적으로 실행합니다.
pub struct Poller<S, T = TokioTicker> {
    provider: Box<dyn RateProvider>,
    writer: CacheWriter<S>,
    ticker: T,
    settings: PollSettings,
    stats: PollStats,
}

impl<S: CacheStore, T: Ticker> Poller<S, T> {
    pub fn new(
        provider: Box<dyn RateProvider>,
        writer: CacheWriter<S>,
        ticker: T,
        settings: PollSettings,
    ) -> Self {
        Self {
            provider,
            writer,
            ticker,
            settings,
            stats: PollStats::new(),
        }
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    pub fn writer(&self) -> &CacheWriter<S> {
        &self.writer
    }

    /// 조회와 캐시 기록을 한 번 실행합니다.
    ///
    /// `FailurePolicy::Continue`에서는 실패도 `Ok`로 반환하며,
    /// 실패한 주기는 기존 캐시 항목을 건드리지 않습니다.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let start = Instant::now();
        self.stats.cycles += 1;

        let (outcome, failure) = match self.provider.fetch().await {
            Ok(rates) => {
                match self
                    .writer
                    .write_rates(&self.settings.key, self.settings.ttl_secs, &rates)
                    .await
                {
                    Ok(()) => {
                        self.stats.updated += 1;
                        self.stats.last_updated_at = Some(Utc::now());
                        (CycleOutcome::Updated { fields: rates.len() }, None)
                    }
                    Err(e) => {
                        self.stats.cache_errors += 1;
                        tracing::error!(key = %self.settings.key, error = %e, "캐시 갱신 실패");
                        (CycleOutcome::CacheFailed, Some(e))
                    }
                }
            }
            Err(e) => {
                self.stats.fetch_errors += 1;
                tracing::error!(provider = self.provider.name(), error = %e, "시세 조회 실패");
                (CycleOutcome::FetchFailed, Some(e))
            }
        };

        self.stats.last_elapsed = start.elapsed();
        self.stats.log_summary(self.provider.name());

        match failure {
            Some(e) if self.settings.failure_policy == FailurePolicy::Abort => Err(e.into()),
            _ => Ok(outcome),
        }
    }

    /// 정해진 횟수만큼 주기를 실행합니다 (주기 사이에만 대기).
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<()> {
        for i in 0..cycles {
            if i > 0 {
                self.ticker.wait(self.settings.interval).await;
            }
            self.run_cycle().await?;
        }
        Ok(())
    }

    /// 프로세스가 끝날 때까지 주기를 반복합니다.
    ///
    /// `FailurePolicy::Abort`에서만 에러와 함께 반환됩니다.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(
            provider = self.provider.name(),
            key = %self.settings.key,
            ttl_secs = self.settings.ttl_secs,
            interval_secs = self.settings.interval.as_secs(),
            "폴링 루프 시작"
        );

        loop {
            self.run_cycle().await?;
            self.ticker.wait(self.settings.interval).await;
        }
    }
}
