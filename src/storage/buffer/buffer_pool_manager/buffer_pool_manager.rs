//! The buffer manager: owns the page pool, the frame descriptor table, and the
//! hash index, and implements the clock replacement algorithm that ties them
//! together.

use crate::common::constants::DEFAULT_NUM_FRAMES;
use crate::common::error::{BufferPoolError, Result};
use crate::config::BufferPoolConfig;
use crate::storage::file::{File, FileRef};
use crate::storage::frame::{FrameDescriptorTable, FrameId};
use crate::storage::page::{Page, PageNo};
use log::{debug, trace, warn};
use std::fmt::Write as _;

/// A lightweight, `Copy` stand-in for a borrowed `&Page`. A raw reference into
/// `buf_pool` can't outlive calls that might evict the frame it points at, so
/// callers carry this instead and exchange it for a real borrow via
/// [`BufferManager::page`]/[`BufferManager::page_mut`] at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHandle {
    frame_no: FrameId,
    page_no: PageNo,
}

impl PageHandle {
    pub fn frame_no(&self) -> FrameId {
        self.frame_no
    }

    pub fn page_no(&self) -> PageNo {
        self.page_no
    }
}

/// The fixed-size buffer pool: `num_frames` page slots, a parallel descriptor
/// table, a hash index resolving `(file, page_no)` to a frame, and the clock
/// hand that drives victim selection.
#[derive(Debug)]
pub struct BufferManager<'f> {
    num_frames: usize,
    buf_pool: Vec<Page>,
    descriptors: FrameDescriptorTable<'f>,
    hash_index: crate::storage::hash_index::HashIndex<'f>,
    clock_hand: FrameId,
}

/// Fluent builder for a [`BufferManager`], currently wrapping the single
/// `num_frames` tunable this core exposes.
#[derive(Default)]
pub struct BufferManagerBuilder {
    num_frames: Option<usize>,
}

impl BufferManagerBuilder {
    pub fn num_frames(&mut self, num_frames: usize) -> &mut Self {
        self.num_frames = Some(num_frames);
        self
    }

    /// Builds the manager, falling back to [`DEFAULT_NUM_FRAMES`] if
    /// `num_frames` was never set.
    pub fn build<'f>(&self) -> Result<BufferManager<'f>> {
        BufferManager::new(self.num_frames.unwrap_or(DEFAULT_NUM_FRAMES))
    }
}

impl<'f> BufferManager<'f> {
    /// Allocates the pool, descriptor table, and hash index for `num_frames`
    /// frames. Fails if `num_frames` is zero.
    pub fn new(num_frames: usize) -> Result<Self> {
        if num_frames == 0 {
            return Err(BufferPoolError::ZeroSizedPool);
        }
        Ok(Self {
            num_frames,
            buf_pool: (0..num_frames).map(|_| Page::default()).collect(),
            descriptors: FrameDescriptorTable::new(num_frames),
            hash_index: crate::storage::hash_index::HashIndex::new(num_frames),
            clock_hand: num_frames - 1,
        })
    }

    pub fn builder() -> BufferManagerBuilder {
        BufferManagerBuilder::default()
    }

    /// Builds a manager from a [`BufferPoolConfig`], e.g. one produced by
    /// [`BufferPoolConfig::from_env`].
    pub fn from_config(config: &BufferPoolConfig) -> Result<Self> {
        Self::new(config.num_frames)
    }

    /// Number of frames the pool was constructed with.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    fn advance_clock(&mut self) {
        self.clock_hand = (self.clock_hand + 1) % self.num_frames;
    }

    /// Finds a frame suitable for (re)use, evicting its current occupant if
    /// any. The returned frame is invalid, unpinned, and unmapped.
    fn alloc_buf(&mut self) -> Result<FrameId> {
        self.advance_clock();
        let mut swept = 0usize;
        loop {
            let frame_no = self.clock_hand;
            let desc = self.descriptors.get(frame_no);
            let valid = desc.is_valid();
            let ref_bit = desc.ref_bit();
            let pinned = desc.pin_count() > 0;

            if valid && (ref_bit || pinned) {
                if ref_bit {
                    self.descriptors.get_mut(frame_no).set_ref_bit(false);
                    trace!("alloc_buf: frame {frame_no} given a second chance, clearing ref_bit");
                } else {
                    trace!("alloc_buf: frame {frame_no} pinned, skipping");
                }
                self.advance_clock();
                swept += 1;
                if swept == 2 * self.num_frames - 1 {
                    warn!(
                        "alloc_buf: no victim found after {swept} steps, all {} frames pinned",
                        self.num_frames
                    );
                    return Err(BufferPoolError::BufferExceeded {
                        num_frames: self.num_frames,
                    });
                }
                continue;
            }

            if valid {
                let file = desc.file();
                let page_no = desc.page_no();
                let dirty = desc.is_dirty();
                if dirty {
                    if let Some(file_ref) = file {
                        file_ref.get().write_page(&self.buf_pool[frame_no])?;
                    }
                }
                if let Some(file_ref) = file {
                    self.hash_index.remove(file_ref, page_no);
                }
                self.descriptors.get_mut(frame_no).clear();
                debug!(
                    "alloc_buf: evicted frame {frame_no} (file={:?}, page_no={page_no}, was_dirty={dirty})",
                    file.map(|f| f.filename().to_string())
                );
            }
            return Ok(frame_no);
        }
    }

    /// Looks up or fetches `(file, page_no)`, pinning it.
    pub fn read_page(&mut self, file: &'f dyn File, page_no: PageNo) -> Result<PageHandle> {
        let file_ref = FileRef::new(file);
        if let Some(frame_no) = self.hash_index.lookup(file_ref, page_no) {
            let desc = self.descriptors.get_mut(frame_no);
            desc.set_ref_bit(true);
            desc.increment_pin_count();
            trace!(
                "read_page hit: file={:?} page_no={page_no} frame_no={frame_no} pin_count={}",
                file.filename(),
                desc.pin_count()
            );
            return Ok(PageHandle { frame_no, page_no });
        }

        debug!("read_page miss: file={:?} page_no={page_no}", file.filename());
        let frame_no = self.alloc_buf()?;
        let page = file.read_page(page_no)?;
        self.buf_pool[frame_no] = page;
        self.hash_index.insert(file_ref, page_no, frame_no);
        self.descriptors.get_mut(frame_no).set(file_ref, page_no);
        Ok(PageHandle { frame_no, page_no })
    }

    /// Decrements the pin count on `(file, page_no)`, marking it dirty if
    /// requested. A no-op if the page isn't mapped.
    pub fn unpin_page(&mut self, file: &'f dyn File, page_no: PageNo, dirty: bool) -> Result<()> {
        let file_ref = FileRef::new(file);
        let Some(frame_no) = self.hash_index.lookup(file_ref, page_no) else {
            trace!("unpin_page: no binding for file={:?} page_no={page_no}, ignoring", file.filename());
            return Ok(());
        };

        let desc = self.descriptors.get_mut(frame_no);
        if !desc.decrement_pin_count() {
            let flags = desc.snapshot();
            warn!("unpin_page: page already unpinned, file={:?} page_no={page_no} frame_no={frame_no}", file.filename());
            return Err(BufferPoolError::PageNotPinned {
                filename: file.filename().to_string(),
                page_no,
                frame_no,
                flags,
            });
        }
        if dirty {
            desc.set_dirty(true);
        }
        Ok(())
    }

    /// Allocates a fresh page in `file` and installs it in the pool.
    pub fn alloc_page(&mut self, file: &'f dyn File) -> Result<(PageNo, PageHandle)> {
        let page = file.allocate_page()?;
        let page_no = page.page_number();
        let frame_no = self.alloc_buf()?;
        self.buf_pool[frame_no] = page;
        let file_ref = FileRef::new(file);
        self.hash_index.insert(file_ref, page_no, frame_no);
        self.descriptors.get_mut(frame_no).set(file_ref, page_no);
        debug!("alloc_page: file={:?} page_no={page_no} frame_no={frame_no}", file.filename());
        Ok((page_no, PageHandle { frame_no, page_no }))
    }

    /// Evicts `(file, page_no)` from the pool (if resident) and asks `file`
    /// to delete it. No pin-count check: disposing a pinned page is a caller
    /// contract violation, but it's surfaced at `warn!` for diagnosability
    /// rather than rejected outright.
    pub fn dispose_page(&mut self, file: &'f dyn File, page_no: PageNo) -> Result<()> {
        let file_ref = FileRef::new(file);
        if let Some(frame_no) = self.hash_index.lookup(file_ref, page_no) {
            let desc = self.descriptors.get_mut(frame_no);
            if desc.pin_count() > 0 {
                warn!(
                    "dispose_page: disposing still-pinned page, file={:?} page_no={page_no} frame_no={frame_no} pin_count={}",
                    file.filename(),
                    desc.pin_count()
                );
            }
            desc.clear();
            self.hash_index.remove(file_ref, page_no);
        }
        file.delete_page(page_no)?;
        Ok(())
    }

    /// Writes back and evicts every valid frame belonging to `file`. Stops at
    /// the first offending frame; earlier frames in the sweep remain flushed
    /// (this is not a transactional operation).
    pub fn flush_file(&mut self, file: &'f dyn File) -> Result<()> {
        let file_ref = FileRef::new(file);
        self.advance_clock();
        for _ in 0..self.num_frames {
            let frame_no = self.clock_hand;
            let desc = self.descriptors.get(frame_no);
            if desc.file() == Some(file_ref) {
                let page_no = desc.page_no();
                let pin_count = desc.pin_count();
                let valid = desc.is_valid();
                let dirty = desc.is_dirty();

                if pin_count != 0 {
                    let flags = desc.snapshot();
                    warn!("flush_file: page still pinned, file={:?} page_no={page_no} frame_no={frame_no}", file.filename());
                    return Err(BufferPoolError::PagePinned {
                        filename: file.filename().to_string(),
                        page_no,
                        frame_no,
                        flags,
                    });
                }
                if !valid {
                    let flags = desc.snapshot();
                    warn!("flush_file: invalid frame tagged with file, frame_no={frame_no}");
                    return Err(BufferPoolError::BadBuffer { frame_no, flags });
                }
                if dirty {
                    file.write_page(&self.buf_pool[frame_no])?;
                }
                self.hash_index.remove(file_ref, page_no);
                self.descriptors.get_mut(frame_no).clear();
                debug!("flush_file: cleared frame {frame_no} (file={:?} page_no={page_no})", file.filename());
            }
            self.advance_clock();
        }
        Ok(())
    }

    /// Borrows the page behind `handle`. Debug-asserts the frame still holds
    /// that page and is still pinned.
    pub fn page(&self, handle: &PageHandle) -> &Page {
        let desc = self.descriptors.get(handle.frame_no);
        debug_assert_eq!(desc.page_no(), handle.page_no, "stale PageHandle: frame has been reused");
        debug_assert!(desc.pin_count() > 0, "stale PageHandle: frame is fully unpinned");
        &self.buf_pool[handle.frame_no]
    }

    /// Mutably borrows the page behind `handle`. See [`Self::page`].
    pub fn page_mut(&mut self, handle: &PageHandle) -> &mut Page {
        let desc = self.descriptors.get(handle.frame_no);
        debug_assert_eq!(desc.page_no(), handle.page_no, "stale PageHandle: frame has been reused");
        debug_assert!(desc.pin_count() > 0, "stale PageHandle: frame is fully unpinned");
        &mut self.buf_pool[handle.frame_no]
    }

    /// Renders one line per frame plus a trailing valid-frame count.
    pub fn print_self(&self) -> String {
        let mut out = String::new();
        let mut valid_frames = 0usize;
        for desc in self.descriptors.iter() {
            let _ = writeln!(
                out,
                "FrameNo:{} valid={} file={} page_no={} pin_count={} dirty={} ref_bit={}",
                desc.frame_no(),
                desc.is_valid(),
                desc.file().map(|f| f.filename().to_string()).unwrap_or_else(|| "-".to_string()),
                desc.page_no(),
                desc.pin_count(),
                desc.is_dirty(),
                desc.ref_bit(),
            );
            if desc.is_valid() {
                valid_frames += 1;
            }
        }
        let _ = writeln!(out, "Total Number of Valid Frames:{valid_frames}");
        out
    }

    /// Same content as [`Self::print_self`], routed through `log::debug!`
    /// one line at a time so it composes with the ambient logging story
    /// instead of hard-coding stdout.
    pub fn log_self(&self) {
        for line in self.print_self().lines() {
            debug!("{line}");
        }
    }
}

impl<'f> Drop for BufferManager<'f> {
    /// Writes back every dirty valid frame on teardown. No pin-count check
    /// since `Drop::drop` cannot return a `Result`; a still-pinned frame is
    /// logged at `warn!` instead.
    fn drop(&mut self) {
        self.advance_clock();
        for _ in 0..self.num_frames {
            let frame_no = self.clock_hand;
            let desc = self.descriptors.get(frame_no);
            if desc.is_valid() {
                if desc.pin_count() > 0 {
                    warn!("shutdown: frame {frame_no} still pinned (pin_count={})", desc.pin_count());
                }
                if desc.is_dirty() {
                    if let Some(file_ref) = desc.file() {
                        if let Err(err) = file_ref.get().write_page(&self.buf_pool[frame_no]) {
                            warn!("shutdown: failed to flush frame {frame_no}: {err}");
                        }
                    }
                }
            }
            self.advance_clock();
        }
    }
}
