use super::{File, FileError};
use crate::storage::page::{Page, PageNo, PAGE_SIZE};
use std::cell::RefCell;
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A minimal on-disk `File` implementation: pages are fixed-size slots appended
/// to a flat file, addressed by `page_no * PAGE_SIZE`. Free-page tracking and a
/// real on-disk page format aren't implemented — deleted pages are simply
/// zeroed and never reused, which is adequate for exercising the buffer pool
/// end-to-end but not a production page store.
pub struct PagedFile {
    name: String,
    handle: RefCell<fs::File>,
    next_page_no: RefCell<u32>,
}

impl PagedFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let handle = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .map_err(|source| FileError::Io {
                filename: path.display().to_string(),
                source,
            })?;
        let len = handle
            .metadata()
            .map_err(|source| FileError::Io {
                filename: path.display().to_string(),
                source,
            })?
            .len();
        let next_page_no = (len / PAGE_SIZE as u64) as u32;
        Ok(Self {
            name: path.display().to_string(),
            handle: RefCell::new(handle),
            next_page_no: RefCell::new(next_page_no),
        })
    }

    fn io_err(&self, source: std::io::Error) -> FileError {
        FileError::Io {
            filename: self.name.clone(),
            source,
        }
    }
}

impl File for PagedFile {
    fn read_page(&self, page_no: PageNo) -> Result<Page, FileError> {
        if page_no.0 >= *self.next_page_no.borrow() {
            return Err(FileError::PageNotFound {
                filename: self.name.clone(),
                page_no,
            });
        }
        let mut handle = self.handle.borrow_mut();
        let offset = page_no.0 as u64 * PAGE_SIZE as u64;
        handle.seek(SeekFrom::Start(offset)).map_err(|e| self.io_err(e))?;
        let mut data = [0u8; PAGE_SIZE];
        handle.read_exact(&mut data).map_err(|e| self.io_err(e))?;
        Ok(Page::from_bytes(page_no, data))
    }

    fn write_page(&self, page: &Page) -> Result<(), FileError> {
        let mut handle = self.handle.borrow_mut();
        let offset = page.page_number().0 as u64 * PAGE_SIZE as u64;
        handle.seek(SeekFrom::Start(offset)).map_err(|e| self.io_err(e))?;
        handle.write_all(page.data()).map_err(|e| self.io_err(e))?;
        handle.flush().map_err(|e| self.io_err(e))
    }

    fn allocate_page(&self) -> Result<Page, FileError> {
        let mut next = self.next_page_no.borrow_mut();
        let page_no = PageNo(*next);
        *next += 1;
        let page = Page::new(page_no);
        drop(next);
        self.write_page(&page)?;
        Ok(page)
    }

    fn delete_page(&self, page_no: PageNo) -> Result<(), FileError> {
        self.write_page(&Page::new(page_no))
    }

    fn filename(&self) -> &str {
        &self.name
    }
}
