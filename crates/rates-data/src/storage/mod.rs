//! 캐시 저장소.
//!
//! `CacheStore`는 연결 하나를 빌려 `HashConnection` 작업을 실행하고,
//! 작업이 끝나면 (성공/실패와 무관하게) 연결을 반납합니다.

pub mod memory;
pub mod redis;

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// 해시 쓰기와 만료 설정을 지원하는 캐시 연결.
pub trait HashConnection {
    /// 여러 필드를 한 번의 명령으로 기록합니다 (`HSET key f1 v1 f2 v2 ...`).
    fn write_fields(&mut self, key: &str, fields: &[(String, String)]) -> Result<()>;

    /// 키의 만료 시간을 설정합니다. 키가 없으면 `false`.
    fn expire(&mut self, key: &str, ttl_secs: u64) -> Result<bool>;

    /// 해시의 모든 필드를 읽습니다. 키가 없으면 빈 맵.
    fn read_fields(&mut self, key: &str) -> Result<HashMap<String, String>>;

    /// 남은 TTL (초). 키가 없거나 만료가 설정되지 않았으면 `None`.
    fn ttl(&mut self, key: &str) -> Result<Option<u64>>;
}

/// 풀에서 연결을 빌려 작업을 실행하는 저장소.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn HashConnection) -> Result<T> + Send + 'static,
        T: Send + 'static;
}
