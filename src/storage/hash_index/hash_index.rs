use crate::common::constants::{DUPLICATE_HASH_KEY_MSG, HASH_BUCKET_LOAD_FACTOR, HASH_KEY_NOT_FOUND_MSG};
use crate::storage::file::FileRef;
use crate::storage::frame::FrameId;
use crate::storage::page::PageNo;
use std::collections::HashMap;

/// A chained hash map from `(file identity, page number)` to [`FrameId`].
///
/// "Lookup miss" is the expected, non-exceptional path on a `read_page` miss, so
/// [`HashIndex::lookup`] returns a plain `Option` rather than a `Result` — a
/// miss here is handled entirely within [`crate::storage::buffer`] and never
/// surfaced as a public error.
///
/// `insert` of a duplicate key and `remove` of an absent key are both internal
/// misuse the manager's own call sites never trigger (it always checks `lookup`
/// first), so they panic rather than return a `Result` nobody would handle.
pub struct HashIndex<'f> {
    bindings: HashMap<(FileRef<'f>, PageNo), FrameId>,
}

impl<'f> HashIndex<'f> {
    /// `num_frames` sizes the initial bucket reservation to roughly
    /// `HASH_BUCKET_LOAD_FACTOR * num_frames`, following the
    /// `((bufs * 1.2) as int * 2) / 2 + 1` bucket-count formula.
    pub fn new(num_frames: usize) -> Self {
        let capacity = (num_frames as f64 * HASH_BUCKET_LOAD_FACTOR) as usize + 1;
        Self {
            bindings: HashMap::with_capacity(capacity),
        }
    }

    pub fn lookup(&self, file: FileRef<'f>, page_no: PageNo) -> Option<FrameId> {
        self.bindings.get(&(file, page_no)).copied()
    }

    pub fn insert(&mut self, file: FileRef<'f>, page_no: PageNo, frame: FrameId) {
        let previous = self.bindings.insert((file, page_no), frame);
        assert!(previous.is_none(), "{DUPLICATE_HASH_KEY_MSG}");
    }

    pub fn remove(&mut self, file: FileRef<'f>, page_no: PageNo) {
        let removed = self.bindings.remove(&(file, page_no));
        assert!(removed.is_some(), "{HASH_KEY_NOT_FOUND_MSG}");
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
