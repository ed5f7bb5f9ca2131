//! The external paged-file collaborator. Only the interface is part of the
//! buffer pool core's contract; the two implementations below are test/demo
//! scaffolding, not part of the contract itself.

mod in_memory;
mod paged_file;

pub use in_memory::InMemoryFile;
pub use paged_file::PagedFile;

use crate::storage::page::{Page, PageNo};
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file {filename:?}: page {page_no} not found")]
    PageNotFound { filename: String, page_no: PageNo },

    #[error("file {filename:?}: I/O error: {source}")]
    Io {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

/// The paged file store the buffer pool reads from and writes to.
///
/// Methods take `&self` rather than `&mut self`: implementations are expected to
/// manage their own interior mutability (e.g. a `RefCell`), mirroring how the
/// manager treats `File` as a non-owning, shared collaborator rather than
/// something it exclusively borrows mutably.
pub trait File {
    fn read_page(&self, page_no: PageNo) -> Result<Page, FileError>;
    fn write_page(&self, page: &Page) -> Result<(), FileError>;
    fn allocate_page(&self) -> Result<Page, FileError>;
    fn delete_page(&self, page_no: PageNo) -> Result<(), FileError>;
    fn filename(&self) -> &str;
}

/// Identifies a `File` by the identity of the reference, not its filename — two
/// distinct open files with equal filenames are distinct keys.
#[derive(Clone, Copy)]
pub struct FileRef<'f>(&'f dyn File);

impl<'f> FileRef<'f> {
    pub fn new(file: &'f dyn File) -> Self {
        FileRef(file)
    }

    pub fn filename(&self) -> &str {
        self.0.filename()
    }

    pub fn get(&self) -> &'f dyn File {
        self.0
    }

    fn addr(&self) -> *const u8 {
        self.0 as *const dyn File as *const u8
    }
}

impl PartialEq for FileRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for FileRef<'_> {}

impl Hash for FileRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl std::fmt::Debug for FileRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FileRef({:?})", self.filename())
    }
}
