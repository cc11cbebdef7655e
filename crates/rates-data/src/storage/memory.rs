//! 프로세스 내 메모리 캐시.
//!
//! Redis 없이 캐시 동작을 확인할 때 사용합니다.
//! TTL은 기록만 하고 시간이 지나도 줄어들지 않습니다.
//! 실패 주입과 호출 횟수 조회는 `test-util` 기능에서만 제공됩니다.

use super::{CacheStore, HashConnection};
use crate::error::{DataError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
struct MemoryEntry {
    fields: HashMap<String, String>,
    ttl_secs: Option<u64>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Mutex<HashMap<String, MemoryEntry>>,
    field_writes: AtomicUsize,
    expire_calls: AtomicUsize,
    fail_field_writes: AtomicBool,
    fail_expire: AtomicBool,
}

/// 메모리 기반 `CacheStore`.
///
/// 복제본은 같은 저장 공간을 공유합니다.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이후의 필드 쓰기를 실패시킵니다.
    #[cfg(any(test, feature = "test-util"))]
    pub fn set_fail_field_writes(&self, fail: bool) {
        self.inner.fail_field_writes.store(fail, Ordering::Relaxed);
    }

    /// 이후의 만료 설정을 실패시킵니다.
    #[cfg(any(test, feature = "test-util"))]
    pub fn set_fail_expire(&self, fail: bool) {
        self.inner.fail_expire.store(fail, Ordering::Relaxed);
    }

    /// 지금까지 시도된 필드 쓰기 횟수.
    #[cfg(any(test, feature = "test-util"))]
    pub fn field_write_count(&self) -> usize {
        self.inner.field_writes.load(Ordering::Relaxed)
    }

    /// 지금까지 시도된 만료 설정 횟수.
    #[cfg(any(test, feature = "test-util"))]
    pub fn expire_count(&self) -> usize {
        self.inner.expire_calls.load(Ordering::Relaxed)
    }
}

struct MemoryConnection<'a> {
    inner: &'a Inner,
    entries: &'a mut HashMap<String, MemoryEntry>,
}

impl HashConnection for MemoryConnection<'_> {
    fn write_fields(&mut self, key: &str, fields: &[(String, String)]) -> Result<()> {
        self.inner.field_writes.fetch_add(1, Ordering::Relaxed);

        if self.inner.fail_field_writes.load(Ordering::Relaxed) {
            return Err(DataError::CacheError("simulated HSET failure".to_string()));
        }
        if fields.is_empty() {
            return Err(DataError::CacheError(
                "wrong number of arguments for 'hset' command".to_string(),
            ));
        }

        let entry = self.entries.entry(key.to_string()).or_default();
        for (field, value) in fields {
            entry.fields.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    fn expire(&mut self, key: &str, ttl_secs: u64) -> Result<bool> {
        self.inner.expire_calls.fetch_add(1, Ordering::Relaxed);

        if self.inner.fail_expire.load(Ordering::Relaxed) {
            return Err(DataError::CacheError("simulated EXPIRE failure".to_string()));
        }

        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.ttl_secs = Some(ttl_secs);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read_fields(&mut self, key: &str) -> Result<HashMap<String, String>> {
        Ok(self
            .entries
            .get(key)
            .map(|entry| entry.fields.clone())
            .unwrap_or_default())
    }

    fn ttl(&mut self, key: &str) -> Result<Option<u64>> {
        Ok(self.entries.get(key).and_then(|entry| entry.ttl_secs))
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn HashConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut entries = self
            .inner
            .entries
            .lock()
            .map_err(|e| DataError::CacheError(format!("memory store poisoned: {}", e)))?;

        let mut conn = MemoryConnection {
            inner: &*self.inner,
            entries: &mut *entries,
        };
        f(&mut conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expire_on_missing_key_is_noop() {
        let store = MemoryStore::new();
        let applied = store
            .with_connection(|conn| conn.expire("missing", 60))
            .await
            .unwrap();

        assert!(!applied);
        assert_eq!(store.expire_count(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();

        store
            .with_connection(|conn| {
                conn.write_fields("k", &[("a".to_string(), "1".to_string())])
            })
            .await
            .unwrap();

        let fields = other
            .with_connection(|conn| conn.read_fields("k"))
            .await
            .unwrap();
        assert_eq!(fields["a"], "1");
    }

    #[tokio::test]
    async fn test_injected_failures_are_counted() {
        let store = MemoryStore::new();
        store.set_fail_field_writes(true);
        store.set_fail_expire(true);

        let write = store
            .with_connection(|conn| conn.write_fields("k", &[("a".to_string(), "1".to_string())]))
            .await;
        let expire = store.with_connection(|conn| conn.expire("k", 60)).await;

        assert!(matches!(write, Err(DataError::CacheError(_))));
        assert!(matches!(expire, Err(DataError::CacheError(_))));
        assert_eq!(store.field_write_count(), 1);
        assert_eq!(store.expire_count(), 1);

        store.set_fail_field_writes(false);
        store
            .with_connection(|conn| conn.write_fields("k", &[("a".to_string(), "1".to_string())]))
            .await
            .unwrap();
        assert_eq!(store.field_write_count(), 2);
    }
}
