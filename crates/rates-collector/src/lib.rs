//! BTC 법정화폐 시세 수집 데몬.
//!
//! 이 crate는 외부 시세 API를 주기적으로 조회해 Redis 해시에 TTL과 함께
//! 기록하는 바이너리를 제공합니다:
//! - 환경변수 기반 설정
//! - 조회 → 캐시 기록 → 대기 폴링 루프
//! - 주기별 통계 로그

pub mod config;
pub mod error;
pub mod poller;
pub mod source;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use poller::{CycleOutcome, FailurePolicy, PollSettings, Poller, Ticker, TokioTicker};
pub use source::build_provider;
pub use stats::PollStats;
