use super::{File, FileError};
use crate::storage::page::{Page, PageNo};
use std::cell::RefCell;
use std::collections::HashMap;

/// A fast, no-I/O `File` test double backed by an in-memory map. Used by the
/// buffer pool's own unit tests where exercising real disk I/O would only add
/// noise.
pub struct InMemoryFile {
    name: String,
    pages: RefCell<HashMap<PageNo, Page>>,
    next_page_no: RefCell<u32>,
}

impl InMemoryFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: RefCell::new(HashMap::new()),
            next_page_no: RefCell::new(0),
        }
    }
}

impl File for InMemoryFile {
    fn read_page(&self, page_no: PageNo) -> Result<Page, FileError> {
        self.pages
            .borrow()
            .get(&page_no)
            .copied()
            .ok_or_else(|| FileError::PageNotFound {
                filename: self.name.clone(),
                page_no,
            })
    }

    fn write_page(&self, page: &Page) -> Result<(), FileError> {
        self.pages.borrow_mut().insert(page.page_number(), *page);
        Ok(())
    }

    fn allocate_page(&self) -> Result<Page, FileError> {
        let mut next = self.next_page_no.borrow_mut();
        let page_no = PageNo(*next);
        *next += 1;
        let page = Page::new(page_no);
        self.pages.borrow_mut().insert(page_no, page);
        Ok(page)
    }

    fn delete_page(&self, page_no: PageNo) -> Result<(), FileError> {
        self.pages.borrow_mut().remove(&page_no);
        Ok(())
    }

    fn filename(&self) -> &str {
        &self.name
    }
}
