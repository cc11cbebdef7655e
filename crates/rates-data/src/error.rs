//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 시세 수집/캐시 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 외부 시세 API 호출 오류
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 요청 타임아웃
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 캐시 오류
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 연결 풀에서 연결을 얻지 못함
    #[error("Connection pool exhausted: {0}")]
    PoolExhausted(String),

    /// 잘못된 입력 (빈 키, 0 TTL 등)
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        DataError::CacheError(err.to_string())
    }
}

impl From<r2d2::Error> for DataError {
    fn from(err: r2d2::Error) -> Self {
        DataError::PoolExhausted(err.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
