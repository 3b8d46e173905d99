mod btree;
mod cursor;
mod error;
mod executor;
mod page;
mod pager;
mod row;
mod statement;
mod table;

use std::io::{self, Write};
use std::process::ExitCode;

use log::error;

use error::DbError;
use statement::Statement;
use table::Table;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let Some(filename) = args.get(1) else {
        eprintln!("Must supply a database filename.");
        return ExitCode::FAILURE;
    };

    let mut table = match Table::db_open(filename) {
        Ok(table) => table,
        Err(e) => return report_fatal(e),
    };

    let mut input = String::new();

    loop {
        print!("db > ");
        let _ = io::stdout().flush();

        input.clear();
        if io::stdin().read_line(&mut input).unwrap_or(0) == 0 {
            // EOF on stdin: behave like a clean `.exit`.
            return close(&mut table);
        }
        let line = input.trim_end_matches(['\n', '\r']);

        if let Some(meta) = line.strip_prefix('.') {
            match meta {
                "exit" => return close(&mut table),
                "btree" => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    let result = btree::dump(&mut table.pager, table.root_page_num, 0, &mut handle);
                    drop(handle);
                    if let Err(e) = result {
                        return report_fatal(e);
                    }
                }
                _ => println!("Unrecognized command '{line}'."),
            }
            continue;
        }

        match Statement::prepare(line) {
            Ok(statement) => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                match executor::execute(statement, &mut table, &mut handle) {
                    Ok(Ok(())) => {
                        drop(handle);
                        println!("Executed.");
                    }
                    Ok(Err(exec_err)) => {
                        drop(handle);
                        println!("{exec_err}");
                    }
                    Err(fatal) => {
                        drop(handle);
                        return report_fatal(fatal);
                    }
                }
            }
            Err(prepare_err) => println!("{prepare_err}"),
        }
    }
}

fn close(table: &mut Table) -> ExitCode {
    match table.db_close() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_fatal(e),
    }
}

/// Fatal errors abort the process. `NeedInternalSplit` is a REPL-facing
/// condition the spec requires a literal, unadorned stdout line for
/// (same as the recoverable `PrepareError`/`ExecuteError` messages);
/// every other fatal condition is an operational failure and goes
/// through the logging backend instead.
fn report_fatal(e: DbError) -> ExitCode {
    match e {
        DbError::NeedInternalSplit => println!("{e}"),
        other => error!("{other}"),
    }
    ExitCode::FAILURE
}
