// Runtime application state
// Owns the loaded configuration and the shared query engine

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::engine::Engine;

use super::Config;

/// Shared state constructed once at startup and passed to request handlers.
///
/// The engine is dependency-injected here rather than held as module-level
/// mutable state; "initialize once, reuse" is preserved by the `Arc`.
pub struct AppState {
    pub config: Config,
    pub engine: Arc<Engine>,
    /// Cached access-log flag for lock-free reads on the request path
    pub cached_access_log: AtomicBool,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        let access_log = config.logging.access_log;
        Self {
            config,
            engine,
            cached_access_log: AtomicBool::new(access_log),
        }
    }
}
