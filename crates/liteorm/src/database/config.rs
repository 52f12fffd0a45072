use std::time::Duration;

/// Configuration for [`crate::Database`].
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Prepared statement cache configuration.
    pub statement_cache: StatementCacheConfig,
    /// Statements slower than this are logged at WARN.
    pub slow_query_threshold: Option<Duration>,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub log_max_sql_length: Option<usize>,
}

/// Prepared statement cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementCacheConfig {
    pub enabled: bool,
    pub capacity: usize,
}

impl Default for StatementCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 128,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            statement_cache: StatementCacheConfig::default(),
            slow_query_threshold: None,
            log_max_sql_length: Some(200),
        }
    }
}

impl DatabaseConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable prepared statement caching with the given capacity.
    ///
    /// A capacity of zero disables the cache.
    pub fn statement_cache(mut self, cap: usize) -> Self {
        self.statement_cache = StatementCacheConfig {
            enabled: cap > 0,
            capacity: cap,
        };
        self
    }

    /// Disable prepared statement caching.
    pub fn no_statement_cache(mut self) -> Self {
        self.statement_cache.enabled = false;
        self
    }

    /// Set slow query threshold.
    pub fn slow_threshold(mut self, duration: Duration) -> Self {
        self.slow_query_threshold = Some(duration);
        self
    }

    /// Set maximum logged SQL length.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.log_max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.log_max_sql_length = None;
        self
    }

    pub(crate) fn cache_enabled(&self) -> bool {
        self.statement_cache.enabled && self.statement_cache.capacity > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DatabaseConfig::default();
        assert!(config.cache_enabled());
        assert_eq!(config.statement_cache.capacity, 128);
        assert_eq!(config.log_max_sql_length, Some(200));
        assert!(config.slow_query_threshold.is_none());
    }

    #[test]
    fn zero_capacity_disables_cache() {
        assert!(!DatabaseConfig::new().statement_cache(0).cache_enabled());
        assert!(!DatabaseConfig::new().no_statement_cache().cache_enabled());
        assert!(DatabaseConfig::new().statement_cache(4).cache_enabled());
    }
}
