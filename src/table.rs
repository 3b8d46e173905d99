//! Table lifecycle: `db_open` / `db_close`. A `Table` is just a root
//! page number plus the pager backing it — there is exactly one table
//! per file, always rooted at page 0.

use log::debug;

use crate::error::DbResult;
use crate::page;
use crate::pager::Pager;

pub struct Table {
    pub root_page_num: u32,
    pub pager: Pager,
}

impl Table {
    pub fn db_open(filename: &str) -> DbResult<Self> {
        let mut pager = Pager::open(filename)?;
        let root_page_num = 0;

        if pager.num_pages == 0 {
            let root = pager.get_page(root_page_num)?;
            page::initialize_leaf(root);
            page::set_is_root(root, true);
            debug!("initialized empty table at {filename}");
        }

        Ok(Self {
            root_page_num,
            pager,
        })
    }

    pub fn db_close(&mut self) -> DbResult<()> {
        self.pager.close()
    }
}
