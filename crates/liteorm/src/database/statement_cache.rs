use crate::error::{OrmError, OrmResult};
use rusqlite::{Connection, Statement};
use std::collections::{HashMap, VecDeque};

/// LRU cache of prepared statements keyed by exact SQL text.
pub(super) struct StatementCache<'c> {
    capacity: usize,
    map: HashMap<String, Statement<'c>>,
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

/// Whether a statement came from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StmtCacheLookup {
    Disabled,
    Hit,
    Miss,
}

impl StmtCacheLookup {
    pub(super) fn as_str(self) -> &'static str {
        match self {
            StmtCacheLookup::Disabled => "off",
            StmtCacheLookup::Hit => "hit",
            StmtCacheLookup::Miss => "miss",
        }
    }
}

/// Snapshot of statement cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Statements currently cached
    pub len: usize,
    pub capacity: usize,
}

impl<'c> StatementCache<'c> {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached statement for `sql`, preparing and caching it on a miss.
    pub(super) fn get_or_prepare(
        &mut self,
        conn: &'c Connection,
        sql: &str,
    ) -> OrmResult<(&mut Statement<'c>, StmtCacheLookup)> {
        let lookup = if self.map.contains_key(sql) {
            self.hits += 1;
            self.touch(sql);
            StmtCacheLookup::Hit
        } else {
            let stmt = conn.prepare(sql).map_err(OrmError::from_db_error)?;
            self.misses += 1;
            self.map.insert(sql.to_string(), stmt);
            self.order.push_back(sql.to_string());
            self.evict_if_needed();
            StmtCacheLookup::Miss
        };

        let stmt = self
            .map
            .get_mut(sql)
            .ok_or_else(|| OrmError::Other(format!("statement evicted before use: {sql}")))?;
        Ok((stmt, lookup))
    }

    pub(super) fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub(super) fn stats(&self) -> StatementCacheStats {
        StatementCacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.map.len(),
            capacity: self.capacity,
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k.as_str() == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn evict_if_needed(&mut self) {
        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            tracing::debug!(target: "liteorm.cache", sql = %oldest, "evicting statement");
            let _ = self.map.remove(&oldest);
        }
    }
}
