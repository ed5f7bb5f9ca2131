use crate::storage::frame::FrameId;
use crate::storage::page::PageNo;
use thiserror::Error;

/// Convenience alias for results returned by public buffer pool operations.
pub type Result<T> = std::result::Result<T, BufferPoolError>;

/// A snapshot of a frame's descriptor flags at the moment an error was raised,
/// so the fault can be reproduced without re-reading (possibly already mutated) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSnapshot {
    pub valid: bool,
    pub dirty: bool,
    pub ref_bit: bool,
    pub pin_count: usize,
}

/// The caller-visible faults of the buffer pool core.
///
/// `HashNotFound` is deliberately absent: it is an internal, expected signal of the
/// hash index (see [`crate::storage::hash_index`]) and never escapes a public operation.
#[derive(Debug, Error)]
pub enum BufferPoolError {
    /// `BufferManager::new`/`BufferManagerBuilder::build` was asked for a pool
    /// of zero frames.
    #[error("{}", crate::common::constants::ZERO_SIZED_POOL_MSG)]
    ZeroSizedPool,

    /// Every frame is pinned; `alloc_buf` could not find a victim after two full
    /// clock sweeps.
    #[error("buffer exceeded: all {num_frames} frames are pinned")]
    BufferExceeded { num_frames: usize },

    /// `unpin_page` was called on a page whose pin count was already zero.
    #[error(
        "page not pinned: file={filename:?} page_no={page_no} frame_no={frame_no} flags={flags:?}"
    )]
    PageNotPinned {
        filename: String,
        page_no: PageNo,
        frame_no: FrameId,
        flags: FrameSnapshot,
    },

    /// `flush_file` encountered a still-pinned page belonging to the target file.
    #[error(
        "page pinned: file={filename:?} page_no={page_no} frame_no={frame_no} flags={flags:?}"
    )]
    PagePinned {
        filename: String,
        page_no: PageNo,
        frame_no: FrameId,
        flags: FrameSnapshot,
    },

    /// `flush_file` encountered a descriptor tagged with the target file but marked
    /// invalid — an integrity violation that should not occur through the public API.
    #[error("bad buffer: frame_no={frame_no} flags={flags:?}")]
    BadBuffer {
        frame_no: FrameId,
        flags: FrameSnapshot,
    },

    /// The backing `File` store failed to perform an I/O operation.
    #[error("file store error: {0}")]
    File(#[from] crate::storage::file::FileError),
}
