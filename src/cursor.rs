//! A positioned iterator over the table's leaf chain: `(page_num,
//! cell_num, end_of_table)`. Used both for the point lookup that
//! backs `insert` and for the ordered full-table scan that backs
//! `select`.

use crate::btree;
use crate::error::DbResult;
use crate::page;
use crate::pager::Pager;
use crate::row::Row;

pub struct Cursor<'a> {
    pager: &'a mut Pager,
    page_num: u32,
    pub cell_num: u32,
    pub end_of_table: bool,
}

impl<'a> Cursor<'a> {
    /// Position at the smallest key in the table. `find(0)` always
    /// descends to the leftmost leaf, so this lands correctly whether
    /// or not that leaf happens to contain key 0.
    pub fn table_start(pager: &'a mut Pager, root_page_num: u32) -> DbResult<Self> {
        let (page_num, cell_num) = btree::find(pager, root_page_num, 0)?;
        let num_cells = page::leaf_num_cells(pager.get_page(page_num)?);
        let end_of_table = num_cells == 0;

        Ok(Self {
            pager,
            page_num,
            cell_num,
            end_of_table,
        })
    }

    pub fn value(&mut self) -> Row {
        let node = self.pager.get_page(self.page_num).expect("cursor page must be resident");
        Row::deserialize(page::leaf_value(node, self.cell_num))
    }

    pub fn advance(&mut self) -> DbResult<()> {
        let node = self.pager.get_page(self.page_num)?;
        self.cell_num += 1;

        if self.cell_num >= page::leaf_num_cells(node) {
            let next_page_num = page::leaf_next_leaf(node);
            if next_page_num == 0 {
                self.end_of_table = true;
            } else {
                self.page_num = next_page_num;
                self.cell_num = 0;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::initialize_leaf;

    fn fresh_pager() -> (tempfile::TempDir, Pager) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        let mut pager = Pager::open(path.to_str().unwrap()).unwrap();
        let root = pager.get_page(0).unwrap();
        initialize_leaf(root);
        page::set_is_root(root, true);
        (dir, pager)
    }

    #[test]
    fn scan_over_empty_table_is_immediately_at_end() {
        let (_dir, mut pager) = fresh_pager();
        let cursor = Cursor::table_start(&mut pager, 0).unwrap();
        assert!(cursor.end_of_table);
    }

    #[test]
    fn scan_visits_every_key_in_ascending_order() {
        let (_dir, mut pager) = fresh_pager();
        for id in [3u32, 1, 2] {
            let row = Row::new(id, "u", "e@x.com");
            btree::insert(&mut pager, 0, &row).unwrap();
        }

        let mut cursor = Cursor::table_start(&mut pager, 0).unwrap();
        let mut seen = Vec::new();
        while !cursor.end_of_table {
            seen.push(cursor.value().id);
            cursor.advance().unwrap();
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
