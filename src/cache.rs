//! 按 (提供商, 请求类型, ID) 缓存上游原始响应的键值存储。

use std::{
    fmt,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// 缓存键中的请求类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    /// 单曲。
    Song,
    /// 多首歌曲组成的列表。
    SongList,
    /// 精选集（歌单）。
    Collect,
    /// 专辑。
    Album,
}

impl RequestKind {
    /// 返回用于缓存键的字符串标签。
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Song => "song",
            Self::SongList => "song-list",
            Self::Collect => "collect",
            Self::Album => "album",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 缓存存储需要实现的接口。
///
/// 实现必须能在多个提供商与多个并发请求之间安全共享。
pub trait Cache: Send + Sync {
    /// 读取缓存，未命中或已过期时返回 `None`。
    fn get(&self, provider: &str, kind: RequestKind, id: &str) -> Option<Vec<u8>>;

    /// 写入缓存，`ttl` 之后该条目失效。
    fn set(&self, provider: &str, kind: RequestKind, id: &str, ttl: Duration, data: Vec<u8>);
}

type CacheKey = (String, RequestKind, String);

struct CacheEntry {
    data: Vec<u8>,
    /// `None` 表示有效期超出 `Instant` 的表示范围，永不过期。
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// 基于 `DashMap` 的进程内缓存。
///
/// 过期条目在读取到时移除，每次写入也会清理所有已过期的条目。
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl MemoryCache {
    /// 创建一个空缓存。
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前存储的条目数（包括尚未被清理的过期条目）。
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 缓存是否为空。
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Cache for MemoryCache {
    fn get(&self, provider: &str, kind: RequestKind, id: &str) -> Option<Vec<u8>> {
        let key = (provider.to_string(), kind, id.to_string());
        let now = Instant::now();

        if let Some(entry) = self.entries.get(&key) {
            if !entry.is_expired(now) {
                return Some(entry.data.clone());
            }
        } else {
            return None;
        }

        // 读锁已释放，再移除过期条目
        self.entries.remove_if(&key, |_, entry| entry.is_expired(now));
        tracing::debug!(provider, kind = %kind, id, "缓存条目已过期");
        None
    }

    fn set(&self, provider: &str, kind: RequestKind, id: &str, ttl: Duration, data: Vec<u8>) {
        let key = (provider.to_string(), kind, id.to_string());
        let now = Instant::now();
        // 读写可能使用不同的请求类型，不能只依赖读取时的清理
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let expires_at = now.checked_add(ttl);
        self.entries.insert(key, CacheEntry { data, expires_at });
    }
}
