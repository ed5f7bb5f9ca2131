//! Diagnostic message constants and tuning defaults, kept in one place so that
//! panics/log lines read consistently across the buffer pool core.

/// Raised (as a panic) only on internal misuse: the hash index was asked to insert
/// a key that already has a binding. The manager's call sites guarantee this never
/// happens through the public API.
pub const DUPLICATE_HASH_KEY_MSG: &str =
    "hash index: attempted to insert a key that already has a binding";

/// Raised (as a panic) only on internal misuse: the hash index was asked to remove
/// a key that has no binding.
pub const HASH_KEY_NOT_FOUND_MSG: &str = "hash index: attempted to remove an absent key";

/// `num_frames` must be at least 1 for the pool to be usable.
pub const ZERO_SIZED_POOL_MSG: &str = "buffer pool: num_frames must be >= 1";

/// The load factor the source scales `num_frames` by to size the hash index's
/// bucket count (preserved verbatim from the original `((bufs * 1.2) as int)`).
pub const HASH_BUCKET_LOAD_FACTOR: f64 = 1.2;

/// Fallback pool size used by [`crate::config::BufferPoolConfig::from_env`] when
/// no override is present in the environment.
pub const DEFAULT_NUM_FRAMES: usize = 64;
