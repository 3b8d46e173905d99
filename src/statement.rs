//! The tiny SQL-like grammar: `insert <id> <username> <email>` and
//! `select`. This is deliberately thin glue over `Row` — the storage
//! engine behind it is the part worth taking care over.

use std::fmt;

use crate::row::{Row, EMAIL_MAX_LEN, USERNAME_MAX_LEN};

pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug)]
pub enum PrepareError {
    SyntaxError,
    StringTooLong,
    NegativeId,
    UnrecognizedStatement(String),
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrepareError::SyntaxError => write!(f, "Syntax Error. Could not parse query."),
            PrepareError::StringTooLong => write!(f, "String is too long."),
            PrepareError::NegativeId => write!(f, "ID must be positive."),
            PrepareError::UnrecognizedStatement(line) => {
                write!(f, "Unrecognized keyword at start of '{line}'")
            }
        }
    }
}

impl Statement {
    pub fn prepare(line: &str) -> Result<Self, PrepareError> {
        if line == "select" {
            return Ok(Statement::Select);
        }
        if let Some(rest) = line.strip_prefix("insert") {
            return prepare_insert(rest).map(Statement::Insert);
        }
        Err(PrepareError::UnrecognizedStatement(line.to_owned()))
    }
}

fn prepare_insert(rest: &str) -> Result<Row, PrepareError> {
    let mut tokens = rest.split_whitespace();
    let id_str = tokens.next().ok_or(PrepareError::SyntaxError)?;
    let username = tokens.next().ok_or(PrepareError::SyntaxError)?;
    let email = tokens.next().ok_or(PrepareError::SyntaxError)?;
    if tokens.next().is_some() {
        return Err(PrepareError::SyntaxError);
    }

    // The source this grammar is modeled on parses the id with a
    // signed `atoi`, so a leading '-' is a recognized (if rejected)
    // case rather than a parse failure; anything else that doesn't
    // parse as an integer is a syntax error.
    let id: i64 = id_str.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id: u32 = id.try_into().map_err(|_| PrepareError::SyntaxError)?;

    if username.len() > USERNAME_MAX_LEN || email.len() > EMAIL_MAX_LEN {
        return Err(PrepareError::StringTooLong);
    }

    Ok(Row::new(id, username, email))
}
