//! The B+tree: `find`, `insert`, leaf splitting, and new-root promotion,
//! built on top of the page codec (`page.rs`) and the pager (`pager.rs`).
//!
//! Internal-node splitting is explicitly unimplemented (see DESIGN.md):
//! an internal node that would overflow its `INTERNAL_NODE_MAX_CELLS`
//! capacity is a fatal error, matching the source this crate is modeled
//! on.

use std::io::Write;

use log::debug;

use crate::error::{DbError, DbResult};
use crate::page::{self, PageBuf};
use crate::pager::Pager;
use crate::row::Row;

pub enum InsertOutcome {
    Inserted,
    DuplicateKey,
}

/// Locate the position at which `key` exists, or the position it would
/// occupy if inserted. Returns `(leaf_page_num, cell_num)`.
pub fn find(pager: &mut Pager, page_num: u32, key: u32) -> DbResult<(u32, u32)> {
    let node_type = page::node_type(pager.get_page(page_num)?);
    match node_type {
        page::NodeType::Leaf => leaf_node_find(pager, page_num, key),
        page::NodeType::Internal => {
            let child_num = {
                let node = pager.get_page(page_num)?;
                let child_index = internal_node_find_child(node, key);
                page::internal_child_at(node, child_index)
            };
            find(pager, child_num, key)
        }
    }
}

fn leaf_node_find(pager: &mut Pager, page_num: u32, key: u32) -> DbResult<(u32, u32)> {
    let node = pager.get_page(page_num)?;
    let num_cells = page::leaf_num_cells(node);

    let mut lo = 0;
    let mut hi = num_cells;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let key_at_mid = page::leaf_key(node, mid);
        if key == key_at_mid {
            return Ok((page_num, mid));
        } else if key_at_mid > key {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Ok((page_num, lo))
}

/// Binary search over an internal node's separators: the leftmost index
/// `i` such that `key <= separator[i]`, or `num_keys` if `key` is larger
/// than every separator (meaning the right child).
fn internal_node_find_child(node: &PageBuf, key: u32) -> u32 {
    let num_keys = page::internal_num_keys(node);
    let mut lo = 0;
    let mut hi = num_keys;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if key <= page::internal_key(node, mid) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

pub fn insert(pager: &mut Pager, root_page_num: u32, row: &Row) -> DbResult<InsertOutcome> {
    let (leaf_page_num, cell_num) = find(pager, root_page_num, row.id)?;

    let node = pager.get_page(leaf_page_num)?;
    let num_cells = page::leaf_num_cells(node);
    if cell_num < num_cells && page::leaf_key(node, cell_num) == row.id {
        return Ok(InsertOutcome::DuplicateKey);
    }

    leaf_node_insert(pager, leaf_page_num, cell_num, row.id, row)?;
    Ok(InsertOutcome::Inserted)
}

fn leaf_node_insert(
    pager: &mut Pager,
    page_num: u32,
    cell_num: u32,
    key: u32,
    row: &Row,
) -> DbResult<()> {
    let num_cells = page::leaf_num_cells(pager.get_page(page_num)?);

    if num_cells as usize >= page::LEAF_NODE_MAX_CELLS {
        return leaf_split_and_insert(pager, page_num, cell_num, key, row);
    }

    let node = pager.get_page(page_num)?;
    let mut i = num_cells;
    while i > cell_num {
        page::copy_leaf_cell(node, i, i - 1);
        i -= 1;
    }
    page::set_leaf_num_cells(node, num_cells + 1);
    page::set_leaf_key(node, cell_num, key);
    page::set_leaf_value(node, cell_num, &row.serialize());
    Ok(())
}

/// Split a full leaf into two, redistributing its `MAX` existing cells
/// plus the new one between them, then either promote a new root (if
/// the leaf being split was the root) or insert the new sibling into
/// its parent.
fn leaf_split_and_insert(
    pager: &mut Pager,
    old_page_num: u32,
    pos: u32,
    key: u32,
    row: &Row,
) -> DbResult<()> {
    const MAX: usize = page::LEAF_NODE_MAX_CELLS;
    const LEFT: usize = page::LEAF_NODE_LEFT_SPLIT_COUNT;

    let old_max_before_split = page::max_key(pager.get_page(old_page_num)?);

    let (next_leaf, parent, was_root) = {
        let old = pager.get_page(old_page_num)?;
        (
            page::leaf_next_leaf(old),
            page::parent_page_num(old),
            page::is_root(old),
        )
    };

    // Pull every existing cell into memory; MAX is small (a few dozen
    // cells at most for a 4096-byte page), so this costs nothing next
    // to an extra disk page.
    let mut cells: Vec<(u32, [u8; crate::row::ROW_SIZE])> = {
        let old = pager.get_page(old_page_num)?;
        (0..MAX as u32)
            .map(|i| {
                let mut value = [0u8; crate::row::ROW_SIZE];
                value.copy_from_slice(page::leaf_value(old, i));
                (page::leaf_key(old, i), value)
            })
            .collect()
    };
    cells.insert(pos as usize, (key, row.serialize()));

    let new_page_num = pager.allocate_page();

    {
        let old = pager.get_page(old_page_num)?;
        page::set_leaf_next_leaf(old, new_page_num);
        for (i, (cell_key, cell_value)) in cells[..LEFT].iter().enumerate() {
            page::set_leaf_key(old, i as u32, *cell_key);
            page::set_leaf_value(old, i as u32, cell_value);
        }
        page::set_leaf_num_cells(old, LEFT as u32);
    }

    {
        let new_node = pager.get_page(new_page_num)?;
        page::initialize_leaf(new_node);
        page::set_leaf_next_leaf(new_node, next_leaf);
        page::set_parent_page_num(new_node, parent);
        for (i, (cell_key, cell_value)) in cells[LEFT..].iter().enumerate() {
            page::set_leaf_key(new_node, i as u32, *cell_key);
            page::set_leaf_value(new_node, i as u32, cell_value);
        }
        page::set_leaf_num_cells(new_node, (MAX + 1 - LEFT) as u32);
    }

    debug!("split leaf {old_page_num} into {old_page_num} and {new_page_num}");

    if was_root {
        create_new_root(pager, new_page_num)
    } else {
        let new_old_max = page::max_key(pager.get_page(old_page_num)?);
        update_internal_node_key(pager, parent, old_max_before_split, new_old_max)?;
        internal_node_insert(pager, parent, new_page_num)
    }
}

/// Copy the old root's bytes into a freshly allocated left child, then
/// re-initialize page 0 as an internal node pointing at the two
/// children. The root's page number never changes.
fn create_new_root(pager: &mut Pager, right_page_num: u32) -> DbResult<()> {
    let left_page_num = pager.allocate_page();

    let old_root: PageBuf = *pager.get_page(0)?;
    {
        let left = pager.get_page(left_page_num)?;
        *left = old_root;
        page::set_is_root(left, false);
        page::set_parent_page_num(left, 0);
    }
    {
        let right = pager.get_page(right_page_num)?;
        page::set_parent_page_num(right, 0);
    }

    let left_max = page::max_key(pager.get_page(left_page_num)?);

    let root = pager.get_page(0)?;
    page::initialize_internal(root);
    page::set_is_root(root, true);
    page::set_parent_page_num(root, 0);
    page::set_internal_num_keys(root, 1);
    page::set_internal_child(root, 0, left_page_num);
    page::set_internal_key(root, 0, left_max);
    page::set_internal_right_child(root, right_page_num);

    debug!("promoted new root over leaves {left_page_num} and {right_page_num}");
    Ok(())
}

fn update_internal_node_key(
    pager: &mut Pager,
    parent_page_num: u32,
    old_key: u32,
    new_key: u32,
) -> DbResult<()> {
    let parent = pager.get_page(parent_page_num)?;
    let i = internal_node_find_child(parent, old_key);
    page::set_internal_key(parent, i, new_key);
    Ok(())
}

/// Insert a freshly split-off child into its parent. Fatal if the
/// parent is already at `INTERNAL_NODE_MAX_CELLS` — this crate does not
/// implement splitting an internal node (see DESIGN.md).
fn internal_node_insert(pager: &mut Pager, parent_page_num: u32, child_page_num: u32) -> DbResult<()> {
    let child_max = page::max_key(pager.get_page(child_page_num)?);

    let (original_num_keys, pos, right_child_page_num) = {
        let parent = pager.get_page(parent_page_num)?;
        let original_num_keys = page::internal_num_keys(parent);
        let pos = internal_node_find_child(parent, child_max);
        let right_child_page_num = page::internal_right_child(parent);
        (original_num_keys, pos, right_child_page_num)
    };

    if original_num_keys as usize >= page::INTERNAL_NODE_MAX_CELLS {
        return Err(DbError::NeedInternalSplit);
    }

    let right_child_max = page::max_key(pager.get_page(right_child_page_num)?);

    let parent = pager.get_page(parent_page_num)?;
    page::set_internal_num_keys(parent, original_num_keys + 1);

    if child_max > right_child_max {
        page::set_internal_child(parent, original_num_keys, right_child_page_num);
        page::set_internal_key(parent, original_num_keys, right_child_max);
        page::set_internal_right_child(parent, child_page_num);
    } else {
        let mut i = original_num_keys;
        while i > pos {
            page::copy_internal_cell(parent, i, i - 1);
            i -= 1;
        }
        page::set_internal_child(parent, pos, child_page_num);
        page::set_internal_key(parent, pos, child_max);
    }

    Ok(())
}

/// Pre-order `.btree` dump: `- leaf (size N)` / `- internal (size N)`,
/// each cell as `- <key>` (leaf) or `child[i]` followed by `- key <key>`
/// (internal), two spaces of indent per depth level.
pub fn dump(pager: &mut Pager, page_num: u32, depth: usize, out: &mut impl Write) -> DbResult<()> {
    let indent = "  ".repeat(depth);
    let node_type = page::node_type(pager.get_page(page_num)?);

    match node_type {
        page::NodeType::Leaf => {
            let node = pager.get_page(page_num)?;
            let num_cells = page::leaf_num_cells(node);
            writeln!(out, "{indent}- leaf (size {num_cells})").map_err(DbError::Io)?;
            for i in 0..num_cells {
                let key = page::leaf_key(pager.get_page(page_num)?, i);
                writeln!(out, "{indent}  - {key}").map_err(DbError::Io)?;
            }
        }
        page::NodeType::Internal => {
            let num_keys = page::internal_num_keys(pager.get_page(page_num)?);
            writeln!(out, "{indent}- internal (size {num_keys})").map_err(DbError::Io)?;
            for i in 0..num_keys {
                let child = page::internal_child(pager.get_page(page_num)?, i);
                dump(pager, child, depth + 1, out)?;
                let key = page::internal_key(pager.get_page(page_num)?, i);
                writeln!(out, "{indent}  - key {key}").map_err(DbError::Io)?;
            }
            let right_child = page::internal_right_child(pager.get_page(page_num)?);
            dump(pager, right_child, depth + 1, out)?;
        }
    }
    Ok(())
}
