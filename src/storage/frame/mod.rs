//! The frame descriptor table: per-frame occupancy and replacement-policy
//! metadata, dense-indexed by [`FrameId`].

mod frame_descriptor;

pub use frame_descriptor::{FrameDescriptor, FrameDescriptorTable};

/// Index of a frame in `[0, num_frames)`. A plain `usize` alias, not a newtype:
/// the hash index and descriptor table both use it as a dense array index and
/// nothing more — the hash index stores `FrameId`, not references.
pub type FrameId = usize;
