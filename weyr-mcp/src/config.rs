//! Server configuration from the environment

use std::env;

use weyr_jordan::BlockOrder;
use weyr_plugin::DEFAULT_EXACT_LIMIT;

pub const LOG_VAR: &str = "WEYR_LOG";
pub const EXACT_LIMIT_VAR: &str = "WEYR_EXACT_LIMIT";
pub const BLOCK_ORDER_VAR: &str = "WEYR_BLOCK_ORDER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// tracing filter directive
    pub log_filter: String,
    pub exact_limit: usize,
    pub block_order: BlockOrder,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            exact_limit: DEFAULT_EXACT_LIMIT,
            block_order: BlockOrder::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults
    /// with a note on stderr, since logging is not installed yet.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_filter = lookup(LOG_VAR)
            .or_else(|| lookup("RUST_LOG"))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        let exact_limit = match lookup(EXACT_LIMIT_VAR) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    eprintln!("Ignoring {}={:?}: expected a positive integer", EXACT_LIMIT_VAR, raw);
                    defaults.exact_limit
                }
            },
            None => defaults.exact_limit,
        };

        let block_order = match lookup(BLOCK_ORDER_VAR) {
            Some(raw) => BlockOrder::from_str(&raw).unwrap_or_else(|| {
                eprintln!("Ignoring {}={:?}: expected descending or ascending", BLOCK_ORDER_VAR, raw);
                defaults.block_order
            }),
            None => defaults.block_order,
        };

        Self { log_filter, exact_limit, block_order }
    }
}
