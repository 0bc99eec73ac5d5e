//! Process-wide engine configuration.
//!
//! Native imaging engines carry global tunables — operation cache size,
//! internal concurrency — that must be set once at process start and treated
//! as process-wide, never per-request. [`Runtime::init`] is the explicit,
//! idempotent initialization call: the first caller's config wins, later
//! calls get the already-initialized runtime back.

use std::sync::OnceLock;

/// Engine tunables applied once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on engine-held pixel memory, in bytes.
    pub cache_max_bytes: u64,
    /// Upper bound on cached operations.
    pub cache_max_ops: u32,
    /// Engine-internal threads per operation. Kept at 1 so application-level
    /// worker threads are the sole parallelism axis.
    pub concurrency: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_max_bytes: 100 * 1024 * 1024,
            cache_max_ops: 500,
            concurrency: 1,
        }
    }
}

/// Process-scoped engine context.
pub struct Runtime {
    config: EngineConfig,
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

impl Runtime {
    /// Initialize the process-wide runtime. Idempotent: only the first call's
    /// config takes effect.
    pub fn init(config: EngineConfig) -> &'static Runtime {
        RUNTIME.get_or_init(|| Runtime { config })
    }

    /// The current runtime, initializing with defaults if nothing has.
    pub fn get() -> &'static Runtime {
        Self::init(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
