use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::Error;

/// Settings for creating a [`Device`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(default))]
pub struct DeviceConfig {
    /// Worker threads; zero uses one per available core.
    pub threads: usize,
}

/// Compute resource that runs ensemble dispatches.
///
/// Wraps a dedicated thread pool. Cloning is cheap and shares the pool, which
/// is shut down when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Device {
    pool: Arc<ThreadPool>,
}

impl Device {
    /// Creates a device with its own thread pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if the thread pool cannot be created.
    pub fn new(config: DeviceConfig) -> Result<Self, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("cohort-worker-{i}"))
            .build()?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `op` inside the pool, so parallel iterators use its workers.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}
