//! 시세 캐시 기록기.
//!
//! 키 하나에 필드들을 기록하고 만료 시간을 걸어 스스로 만료되는 캐시
//! 항목을 만듭니다. 필드 쓰기 실패는 경고만 남기고 만료 설정은 그대로
//! 진행하며, 만료 설정 실패만 호출자에게 반환합니다.

use crate::error::{DataError, Result};
use crate::rates::RateSet;
use crate::storage::CacheStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

/// 필드가 비어 있을 때의 쓰기 정책.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyFieldsPolicy {
    /// 필드 쓰기를 건너뛰고 만료만 설정
    #[default]
    Skip,
    /// 항상 필드 쓰기를 시도
    Write,
}

impl FromStr for EmptyFieldsPolicy {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "write" => Ok(Self::Write),
            other => Err(DataError::ConfigError(format!(
                "unknown empty fields policy: {}",
                other
            ))),
        }
    }
}

/// 캐시에서 읽어온 항목.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CachedEntry {
    pub key: String,
    pub fields: BTreeMap<String, String>,
    /// 남은 TTL (초)
    pub ttl_secs: Option<u64>,
}

/// `CacheStore` 위에서 동작하는 키/필드 캐시 기록기.
#[derive(Debug, Clone)]
pub struct CacheWriter<S> {
    store: S,
    empty_fields: EmptyFieldsPolicy,
}

impl<S: CacheStore> CacheWriter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            empty_fields: EmptyFieldsPolicy::default(),
        }
    }

    pub fn with_empty_fields_policy(mut self, policy: EmptyFieldsPolicy) -> Self {
        self.empty_fields = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 필드들을 기록하고 키에 TTL을 설정합니다.
    #[instrument(skip(self, fields), fields(field_count = fields.len()))]
    pub async fn update(
        &self,
        key: &str,
        ttl_secs: u64,
        fields: &BTreeMap<String, String>,
    ) -> Result<()> {
        if key.is_empty() {
            return Err(DataError::InvalidData("cache key must not be empty".into()));
        }
        if ttl_secs == 0 {
            return Err(DataError::InvalidData("ttl must be positive".into()));
        }

        let write_fields = !fields.is_empty() || self.empty_fields == EmptyFieldsPolicy::Write;
        let pairs: Vec<(String, String)> = fields
            .iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        let key = key.to_string();

        let applied = self
            .store
            .with_connection(move |conn| {
                if write_fields {
                    if let Err(e) = conn.write_fields(&key, &pairs) {
                        warn!(key = %key, error = %e, "HSET 실패, 만료 설정은 계속 진행");
                    }
                }
                conn.expire(&key, ttl_secs)
            })
            .await?;

        debug!(applied, ttl_secs, "캐시 갱신 완료");
        Ok(())
    }

    /// 시세 집합을 6자리 고정소수점 문자열로 기록합니다.
    pub async fn write_rates(&self, key: &str, ttl_secs: u64, rates: &RateSet) -> Result<()> {
        self.update(key, ttl_secs, &rates.to_fields()).await
    }

    /// 캐시 항목을 읽어옵니다. 키가 없으면 필드가 빈 항목을 반환합니다.
    pub async fn read(&self, key: &str) -> Result<CachedEntry> {
        let owned_key = key.to_string();
        let (fields, ttl_secs) = self
            .store
            .with_connection(move |conn| {
                let fields: HashMap<String, String> = conn.read_fields(&owned_key)?;
                let ttl = conn.ttl(&owned_key)?;
                Ok((fields, ttl))
            })
            .await?;

        Ok(CachedEntry {
            key: key.to_string(),
            fields: fields.into_iter().collect(),
            ttl_secs,
        })
    }
}
