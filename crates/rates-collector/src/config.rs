//! 환경변수 기반 설정 모듈.

use crate::error::CollectorError;
use crate::poller::FailurePolicy;
use crate::Result;
use rates_data::{EmptyFieldsPolicy, ProviderKind, RedisConfig};
use std::str::FromStr;
use std::time::Duration;

/// 기본 캐시 키
pub const DEFAULT_CACHE_KEY: &str = "RATES:BTC";

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Redis 연결 설정
    pub redis: RedisConfig,
    /// 시세 제공자 설정
    pub provider: ProviderConfig,
    /// 캐시 항목 설정
    pub cache: CacheConfig,
    /// 폴링 루프 설정
    pub poll: PollConfig,
}

/// 시세 제공자 설정
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// 사용할 제공자
    pub kind: ProviderKind,
    /// HTTP 요청 타임아웃 (초)
    pub http_timeout_secs: u64,
    /// 제공자 URL 재정의
    pub base_url: Option<String>,
    /// CryptoCompare API 키
    pub api_key: Option<String>,
}

/// 캐시 항목 설정
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// 해시 키
    pub key: String,
    /// 항목 TTL (초)
    pub ttl_secs: u64,
    /// 빈 시세 집합일 때의 쓰기 정책
    pub empty_fields: EmptyFieldsPolicy,
}

/// 폴링 루프 설정
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// 수집 주기 (초)
    pub interval_secs: u64,
    /// 실패 시 동작
    pub failure_policy: FailurePolicy,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 키/값 조회 함수에서 설정 로드
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = get("REDIS_URL").ok_or_else(|| {
            CollectorError::Config("REDIS_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        let db = match get("REDIS_DB") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                CollectorError::Config(format!("REDIS_DB는 정수여야 합니다: {:?}", raw))
            })?,
            None => 0,
        };

        let redis = RedisConfig {
            url,
            db,
            ..RedisConfig::default()
        };

        let config = Self {
            redis,
            provider: ProviderConfig {
                kind: parse_or_default(&get, "RATES_PROVIDER")?,
                http_timeout_secs: env_var_parse(&get, "RATES_HTTP_TIMEOUT_SECS", 10),
                base_url: get("RATES_PROVIDER_URL"),
                api_key: get("CRYPTOCOMPARE_API_KEY"),
            },
            cache: CacheConfig {
                key: get("RATES_CACHE_KEY").unwrap_or_else(|| DEFAULT_CACHE_KEY.to_string()),
                ttl_secs: env_var_parse(&get, "RATES_CACHE_TTL_SECS", 600),
                empty_fields: parse_or_default(&get, "RATES_EMPTY_FIELDS")?,
            },
            poll: PollConfig {
                interval_secs: env_var_parse(&get, "RATES_POLL_INTERVAL_SECS", 30),
                failure_policy: parse_or_default(&get, "RATES_FAILURE_POLICY")?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cache.key.is_empty() {
            return Err(CollectorError::Config("RATES_CACHE_KEY가 비어 있습니다".into()));
        }
        if self.cache.ttl_secs == 0 {
            return Err(CollectorError::Config("RATES_CACHE_TTL_SECS는 0보다 커야 합니다".into()));
        }
        if self.provider.http_timeout_secs == 0 {
            return Err(CollectorError::Config(
                "RATES_HTTP_TIMEOUT_SECS는 0보다 커야 합니다".into(),
            ));
        }
        if self.poll.interval_secs == 0 {
            return Err(CollectorError::Config(
                "RATES_POLL_INTERVAL_SECS는 0보다 커야 합니다".into(),
            ));
        }
        Ok(())
    }
}

impl ProviderConfig {
    /// HTTP 타임아웃을 Duration으로 반환
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl PollConfig {
    /// 수집 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// 값을 파싱 (없으면 기본값, 파싱 실패 시 경고 후 기본값)
fn env_var_parse<T, F>(get: &F, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "숫자가 아닌 설정값, 기본값 사용");
            default
        }),
        None => default,
    }
}

/// 열거형 값 파싱 (없으면 기본값, 잘못된 값은 설정 에러)
fn parse_or_default<T, F>(get: &F, key: &str) -> Result<T>
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| CollectorError::Config(format!("{}: {}", key, e))),
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::from_lookup(lookup(&[("REDIS_URL", "localhost:6379")])).unwrap();

        assert_eq!(config.redis.url, "localhost:6379");
        assert_eq!(config.redis.db, 0);
        assert_eq!(config.redis.max_idle, 3);
        assert_eq!(config.redis.idle_timeout_secs, 240);
        assert_eq!(config.provider.kind, ProviderKind::Yadio);
        assert_eq!(config.provider.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.cache.key, "RATES:BTC");
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.cache.empty_fields, EmptyFieldsPolicy::Skip);
        assert_eq!(config.poll.interval(), Duration::from_secs(30));
        assert_eq!(config.poll.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_overrides() {
        let config = CollectorConfig::from_lookup(lookup(&[
            ("REDIS_URL", "redis://cache:6379"),
            ("REDIS_DB", "3"),
            ("RATES_PROVIDER", "cryptocompare"),
            ("RATES_CACHE_KEY", "RATES:TEST"),
            ("RATES_CACHE_TTL_SECS", "120"),
            ("RATES_POLL_INTERVAL_SECS", "5"),
            ("RATES_FAILURE_POLICY", "abort"),
            ("RATES_EMPTY_FIELDS", "write"),
            ("CRYPTOCOMPARE_API_KEY", "k"),
        ]))
        .unwrap();

        assert_eq!(config.redis.db, 3);
        assert_eq!(config.provider.kind, ProviderKind::CryptoCompare);
        assert_eq!(config.provider.api_key.as_deref(), Some("k"));
        assert_eq!(config.cache.key, "RATES:TEST");
        assert_eq!(config.cache.ttl_secs, 120);
        assert_eq!(config.cache.empty_fields, EmptyFieldsPolicy::Write);
        assert_eq!(config.poll.interval_secs, 5);
        assert_eq!(config.poll.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_missing_redis_url_is_fatal() {
        let result = CollectorConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(CollectorError::Config(_))));
    }

    #[test]
    fn test_invalid_redis_db_is_fatal() {
        let result = CollectorConfig::from_lookup(lookup(&[
            ("REDIS_URL", "localhost:6379"),
            ("REDIS_DB", "zero"),
        ]));
        assert!(matches!(result, Err(CollectorError::Config(msg)) if msg.contains("REDIS_DB")));
    }

    #[test]
    fn test_unknown_provider_is_fatal() {
        let result = CollectorConfig::from_lookup(lookup(&[
            ("REDIS_URL", "localhost:6379"),
            ("RATES_PROVIDER", "coingecko"),
        ]));
        assert!(matches!(result, Err(CollectorError::Config(_))));
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let result = CollectorConfig::from_lookup(lookup(&[
            ("REDIS_URL", "localhost:6379"),
            ("RATES_CACHE_TTL_SECS", "0"),
        ]));
        assert!(matches!(result, Err(CollectorError::Config(_))));
    }

    #[test]
    fn test_zero_http_timeout_is_rejected() {
        let result = CollectorConfig::from_lookup(lookup(&[
            ("REDIS_URL", "localhost:6379"),
            ("RATES_HTTP_TIMEOUT_SECS", "0"),
        ]));
        assert!(
            matches!(result, Err(CollectorError::Config(msg)) if msg.contains("RATES_HTTP_TIMEOUT_SECS"))
        );
    }

    #[test]
    fn test_malformed_number_falls_back_to_default() {
        let config = CollectorConfig::from_lookup(lookup(&[
            ("REDIS_URL", "localhost:6379"),
            ("RATES_CACHE_TTL_SECS", "10m"),
            ("RATES_POLL_INTERVAL_SECS", " 45 "),
        ]))
        .unwrap();

        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.poll.interval_secs, 45);
    }
}
