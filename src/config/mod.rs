//! Configuration surface for the buffer pool core.
//!
//! The core itself takes a single tunable, `num_frames`, directly at construction.
//! This module exists so that the one tunable can also be layered from the process
//! environment the way the rest of the database's config modules do, instead of every
//! embedder hand-rolling an `env::var` lookup.

use crate::common::constants::DEFAULT_NUM_FRAMES;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Environment variable prefix used by [`BufferPoolConfig::from_env`], e.g.
/// `CLOCKPOOL_NUM_FRAMES=256`.
pub const ENV_PREFIX: &str = "CLOCKPOOL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BufferPoolConfig {
    /// Number of fixed-size frames the pool allocates. Must be >= 1.
    pub num_frames: usize,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            num_frames: DEFAULT_NUM_FRAMES,
        }
    }
}

impl BufferPoolConfig {
    pub fn new(num_frames: usize) -> Self {
        Self { num_frames }
    }

    /// Layers `CLOCKPOOL_NUM_FRAMES` (if set) over the default pool size.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("num_frames", DEFAULT_NUM_FRAMES as i64)?
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        settings.try_deserialize()
    }
}
