//! The buffer manager: owns the page pool, the frame descriptor table, and
//! the hash index, and implements the clock replacement algorithm.

pub mod buffer_pool_manager;

pub use buffer_pool_manager::{BufferManager, BufferManagerBuilder, PageHandle};
