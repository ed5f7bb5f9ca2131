use super::FrameId;
use crate::common::error::FrameSnapshot;
use crate::storage::file::FileRef;
use crate::storage::page::PageNo;

/// One frame's replacement-policy and occupancy state.
///
/// Invariant maintained by every mutation path in this module and in
/// [`crate::storage::buffer`]: `valid = false` implies `pin_count == 0`,
/// `dirty == false`, `ref_bit == false`, and `file`/`page_no` are cleared.
#[derive(Debug)]
pub struct FrameDescriptor<'f> {
    frame_no: FrameId,
    valid: bool,
    file: Option<FileRef<'f>>,
    page_no: PageNo,
    pin_count: usize,
    dirty: bool,
    ref_bit: bool,
}

impl<'f> FrameDescriptor<'f> {
    fn invalid(frame_no: FrameId) -> Self {
        Self {
            frame_no,
            valid: false,
            file: None,
            page_no: PageNo::INVALID,
            pin_count: 0,
            dirty: false,
            ref_bit: false,
        }
    }

    pub fn frame_no(&self) -> FrameId {
        self.frame_no
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn file(&self) -> Option<FileRef<'f>> {
        self.file
    }

    pub fn page_no(&self) -> PageNo {
        self.page_no
    }

    pub fn pin_count(&self) -> usize {
        self.pin_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn ref_bit(&self) -> bool {
        self.ref_bit
    }

    pub fn set_ref_bit(&mut self, value: bool) {
        self.ref_bit = value;
    }

    pub fn set_dirty(&mut self, value: bool) {
        self.dirty = value;
    }

    pub fn increment_pin_count(&mut self) {
        self.pin_count += 1;
    }

    /// Decrements the pin count. Returns `false` (and leaves state untouched) if
    /// the pin count was already zero — the caller translates that into
    /// `PageNotPinned`.
    #[must_use]
    pub fn decrement_pin_count(&mut self) -> bool {
        if self.pin_count == 0 {
            return false;
        }
        self.pin_count -= 1;
        true
    }

    /// Transitions this descriptor to valid state with `pin_count = 1`,
    /// `dirty = false`, `ref_bit = false`.
    pub fn set(&mut self, file: FileRef<'f>, page_no: PageNo) {
        self.valid = true;
        self.file = Some(file);
        self.page_no = page_no;
        self.pin_count = 1;
        self.dirty = false;
        self.ref_bit = false;
    }

    /// Resets to the unoccupied state.
    pub fn clear(&mut self) {
        self.valid = false;
        self.file = None;
        self.page_no = PageNo::INVALID;
        self.pin_count = 0;
        self.dirty = false;
        self.ref_bit = false;
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            valid: self.valid,
            dirty: self.dirty,
            ref_bit: self.ref_bit,
            pin_count: self.pin_count,
        }
    }
}

/// A dense array of `num_frames` descriptors, indexed by [`FrameId`].
#[derive(Debug)]
pub struct FrameDescriptorTable<'f> {
    frames: Vec<FrameDescriptor<'f>>,
}

impl<'f> FrameDescriptorTable<'f> {
    pub fn new(num_frames: usize) -> Self {
        let frames = (0..num_frames).map(FrameDescriptor::invalid).collect();
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, frame_no: FrameId) -> &FrameDescriptor<'f> {
        &self.frames[frame_no]
    }

    pub fn get_mut(&mut self, frame_no: FrameId) -> &mut FrameDescriptor<'f> {
        &mut self.frames[frame_no]
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameDescriptor<'f>> {
        self.frames.iter()
    }

    pub fn valid_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_valid()).count()
    }
}
