//! Redis 캐시 구현.
//!
//! r2d2 연결 풀 위에서 동작합니다. 연결은 처음 필요할 때 생성되고,
//! 빌릴 때마다 `PING`으로 상태를 확인합니다.

use super::{CacheStore, HashConnection};
use crate::error::{DataError, Result};
use async_trait::async_trait;
use redis::{Client, ConnectionInfo, IntoConnectionInfo};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, Span};

/// Redis 설정.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis 주소 (`redis://host:port` 또는 `host:port`)
    pub url: String,
    /// 데이터베이스 인덱스
    pub db: i64,
    /// 풀에 유지할 최대 연결 수
    pub max_idle: u32,
    /// 유휴 연결 정리 시간 (초)
    pub idle_timeout_secs: u64,
    /// 연결 대기 시간 (초)
    pub connection_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            db: 0,
            max_idle: 3,
            idle_timeout_secs: 240,
            connection_timeout_secs: 5,
        }
    }
}

impl RedisConfig {
    /// URL과 DB 인덱스를 합쳐 연결 정보를 만듭니다.
    ///
    /// 스킴이 없는 `host:port` 형식도 허용합니다.
    pub fn connection_info(&self) -> Result<ConnectionInfo> {
        let url = if self.url.contains("://") {
            self.url.clone()
        } else {
            format!("redis://{}", self.url)
        };

        let mut info = url
            .as_str()
            .into_connection_info()
            .map_err(|e| DataError::ConfigError(format!("invalid Redis URL {}: {}", self.url, e)))?;
        info.redis.db = self.db;
        Ok(info)
    }
}

/// Redis 연결 풀 래퍼.
///
/// 시작 시 한 번 생성해서 필요한 곳에 넘겨 사용합니다.
#[derive(Clone)]
pub struct RedisStore {
    pool: r2d2::Pool<Client>,
}

impl RedisStore {
    /// 연결 풀을 생성합니다. 실제 연결은 첫 사용 시점에 맺어집니다.
    pub fn connect(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.connection_info()?)?;

        let pool = r2d2::Pool::builder()
            .max_size(config.max_idle)
            .min_idle(Some(0))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .test_on_check_out(true)
            .build_unchecked(client);

        info!(
            db = config.db,
            max_idle = config.max_idle,
            idle_timeout_secs = config.idle_timeout_secs,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    /// Redis 상태를 확인합니다. 연결을 빌릴 때 `PING`이 실행됩니다.
    pub async fn health_check(&self) -> Result<bool> {
        self.with_connection(|_| Ok(true)).await
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn HashConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let span = Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let mut conn = pool.get()?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| DataError::CacheError(format!("cache task failed: {}", e)))?
    }
}

impl HashConnection for redis::Connection {
    fn write_fields(&mut self, key: &str, fields: &[(String, String)]) -> Result<()> {
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in fields {
            cmd.arg(field).arg(value);
        }
        cmd.query::<()>(self)?;
        Ok(())
    }

    fn expire(&mut self, key: &str, ttl_secs: u64) -> Result<bool> {
        let applied: bool = redis::cmd("EXPIRE").arg(key).arg(ttl_secs).query(self)?;
        Ok(applied)
    }

    fn read_fields(&mut self, key: &str) -> Result<HashMap<String, String>> {
        let fields: HashMap<String, String> = redis::cmd("HGETALL").arg(key).query(self)?;
        Ok(fields)
    }

    fn ttl(&mut self, key: &str) -> Result<Option<u64>> {
        // -2: 키 없음, -1: 만료 없음
        let ttl: i64 = redis::cmd("TTL").arg(key).query(self)?;
        Ok(u64::try_from(ttl).ok())
    }
}
