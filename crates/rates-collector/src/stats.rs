//! 폴링 통계 구조체.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// 폴링 루프 누적 통계
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollStats {
    /// 총 실행 주기 수
    pub cycles: usize,
    /// 캐시 갱신 성공 횟수
    pub updated: usize,
    /// 시세 조회 실패 횟수
    pub fetch_errors: usize,
    /// 캐시 기록 실패 횟수
    pub cache_errors: usize,
    /// 마지막 갱신 시각
    pub last_updated_at: Option<DateTime<Utc>>,
    /// 마지막 주기 소요 시간
    #[serde(skip)]
    pub last_elapsed: Duration,
}

impl PollStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            (self.updated as f64 / self.cycles as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, provider: &str) {
        tracing::info!(
            provider = provider,
            cycles = self.cycles,
            updated = self.updated,
            fetch_errors = self.fetch_errors,
            cache_errors = self.cache_errors,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.2}s", self.last_elapsed.as_secs_f64()),
            "폴링 주기 완료"
        );
    }
}
