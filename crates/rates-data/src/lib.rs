//! 시세 수집 및 캐시.
//!
//! 이 crate는 다음을 제공합니다:
//! - 외부 API 시세 제공자 (Yadio, CryptoCompare)
//! - 경로 기반 JSON 숫자 접근자 (누락 시 0 채움)
//! - Redis 연결 풀과 해시 캐시 기록기

pub mod cache;
pub mod error;
pub mod json_path;
pub mod provider;
pub mod rates;
pub mod storage;

pub use error::{DataError, Result};
pub use rates::{format_price, RateSet};

pub use cache::{CacheWriter, CachedEntry, EmptyFieldsPolicy};
pub use provider::{
    CryptoCompareProvider, ProviderKind, RateProvider, YadioProvider, CROSS_RATE_CURRENCIES,
};
pub use storage::memory::MemoryStore;
pub use storage::redis::{RedisConfig, RedisStore};
pub use storage::{CacheStore, HashConnection};
