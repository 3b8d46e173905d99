//! The pager: on-demand page cache over a file descriptor. `get_page`
//! services reads through the cache, `flush`/`close` write dirty pages
//! back. There is no eviction — the resident set is bounded by
//! `MAX_PAGES`, and every resident page is conservatively treated as
//! dirty and flushed on close.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};

use log::debug;

use crate::error::{DbError, DbResult};
use crate::page::{self, PageBuf, PAGE_SIZE};

pub const MAX_PAGES: usize = 100;

pub struct Pager {
    file: File,
    file_length: u64,
    pub num_pages: u32,
    cache: Vec<Option<Box<PageBuf>>>,
}

impl Pager {
    pub fn open(filename: &str) -> DbResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(filename)?;

        let file_length = file.metadata()?.len();
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(DbError::CorruptFile);
        }

        let num_pages = (file_length / PAGE_SIZE as u64) as u32;
        debug!("opened {filename} with {num_pages} existing page(s)");

        let mut cache = Vec::with_capacity(MAX_PAGES);
        cache.resize_with(MAX_PAGES, || None);

        Ok(Self {
            file,
            file_length,
            num_pages,
            cache,
        })
    }

    fn validate_page_num(&self, page_num: u32) -> DbResult<()> {
        if page_num as usize >= MAX_PAGES {
            return Err(DbError::PageOutOfBounds {
                page_num,
                max: MAX_PAGES as u32,
            });
        }
        Ok(())
    }

    /// Read-through cache access. Allocates and (if the page already
    /// exists on disk) populates a fresh buffer on a cache miss.
    pub fn get_page(&mut self, page_num: u32) -> DbResult<&mut PageBuf> {
        self.validate_page_num(page_num)?;

        if self.cache[page_num as usize].is_none() {
            let mut buf = page::new_page();

            let num_pages_in_file = self.file_length.div_ceil(PAGE_SIZE as u64);
            if (page_num as u64) < num_pages_in_file {
                self.file.seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
                read_partial(&mut self.file, &mut buf[..])?;
                debug!("loaded page {page_num} from disk");
            }

            self.cache[page_num as usize] = Some(buf);

            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
        }

        Ok(self.cache[page_num as usize].as_mut().unwrap())
    }

    /// Returns the page number a fresh page should be allocated at. The
    /// caller materializes it immediately via `get_page`.
    pub fn allocate_page(&self) -> u32 {
        self.num_pages
    }

    pub fn flush(&mut self, page_num: u32) -> DbResult<()> {
        self.validate_page_num(page_num)?;
        let page = self.cache[page_num as usize]
            .as_ref()
            .expect("flush called on a page not resident in cache");

        self.file.seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(page.as_ref())?;
        debug!("flushed page {page_num}");
        Ok(())
    }

    pub fn close(&mut self) -> DbResult<()> {
        for page_num in 0..self.cache.len() as u32 {
            if self.cache[page_num as usize].is_some() {
                self.flush(page_num)?;
                self.cache[page_num as usize] = None;
            }
        }
        debug!("pager closed");
        Ok(())
    }
}

/// `Read::read` may return fewer bytes than requested (including zero,
/// at EOF); the remainder of `buf` is already zeroed by `new_page`, so a
/// short read simply leaves the tail as zero bytes rather than an error.
fn read_partial(file: &mut File, buf: &mut [u8]) -> std::io::Result<()> {
    let mut filled = 0;
    loop {
        match file.read(&mut buf[filled..]) {
            Ok(0) => return Ok(()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
        if filled == buf.len() {
            return Ok(());
        }
    }
}
