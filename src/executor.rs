//! The executor: turns a prepared `Statement` into mutations against (or
//! reads from) the B+tree. `execute_insert` first checks for a duplicate
//! key via the same `find` the btree uses internally, then delegates the
//! actual write to `btree::insert`.

use std::fmt;
use std::io::Write;

use crate::btree::{self, InsertOutcome};
use crate::cursor::Cursor;
use crate::error::DbResult;
use crate::row::Row;
use crate::statement::Statement;
use crate::table::Table;

#[derive(Debug)]
pub enum ExecuteError {
    DuplicateKey,
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecuteError::DuplicateKey => write!(f, "Error: Duplicate key."),
        }
    }
}

pub fn execute(statement: Statement, table: &mut Table, out: &mut impl Write) -> DbResult<Result<(), ExecuteError>> {
    match statement {
        Statement::Insert(row) => execute_insert(&row, table),
        Statement::Select => execute_select(table, out),
    }
}

fn execute_insert(row: &Row, table: &mut Table) -> DbResult<Result<(), ExecuteError>> {
    match btree::insert(&mut table.pager, table.root_page_num, row)? {
        InsertOutcome::Inserted => Ok(Ok(())),
        InsertOutcome::DuplicateKey => Ok(Err(ExecuteError::DuplicateKey)),
    }
}

fn execute_select(table: &mut Table, out: &mut impl Write) -> DbResult<Result<(), ExecuteError>> {
    let mut cursor = Cursor::table_start(&mut table.pager, table.root_page_num)?;
    while !cursor.end_of_table {
        let row = cursor.value();
        writeln!(out, "{row}").map_err(crate::error::DbError::Io)?;
        cursor.advance()?;
    }
    Ok(Ok(()))
}
