//! 시세 캐시 모듈.

pub mod writer;

pub use writer::{CacheWriter, CachedEntry, EmptyFieldsPolicy};
