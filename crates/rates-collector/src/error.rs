//! 에러 타입 정의.

use rates_data::DataError;
use std::fmt;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 설정 에러
    Config(String),
    /// 시세 조회/캐시 에러
    Data(DataError),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Data(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

impl From<DataError> for CollectorError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::ConfigError(msg) => Self::Config(msg),
            other => Self::Data(other),
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
