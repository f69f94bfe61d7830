// Copyright 2026-present Malte Kjellberg
// SPDX-License-Identifier: Apache-2.0

//! Boolean query engine over a term-sorted archive.
//!
//! Queries are case-insensitive (lower-cased before lookup). Literals
//! are runs of non-delimiter characters; a trailing `:*` makes the
//! literal a prefix match; `&` and `|` combine with AND/OR (OR binds
//! loosest, both left-associative) and parentheses group.

pub mod eval;
pub mod lexer;
pub mod parser;

use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use thiserror::Error;

use crate::tsar::Index;

pub use eval::eval;
pub use lexer::{next_token, tokenize, Token};
pub use parser::{tree, Expr, ParseError, SyntaxError};

/// Anything that can go wrong answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Lower-case and parse a query string into an expression tree.
pub fn parse(query: &str) -> Result<Option<Expr>, ParseError> {
    let tokens = tokenize(&query.to_lowercase());
    tree(&tokens)
}

/// Answer `query` against a line-keyed content file.
///
/// Pointers in the archive are treated as byte offsets into `content`;
/// each selected pointer contributes one line (read through its
/// newline, or to EOF for an unterminated final line). `offset` rows of
/// the sorted result are skipped and at most `limit` are taken, and the
/// lines are returned concatenated.
pub fn query<C, I>(
    query: &str,
    content: &mut C,
    index: &mut I,
    limit: usize,
    offset: usize,
) -> Result<Vec<u8>, QueryError>
where
    C: Read + Seek,
    I: Read + Seek,
{
    let tree = parse(query)?;

    index.seek(SeekFrom::Start(0))?;
    let mut archive = Index::unmarshal_lazy_reader(index)?;
    let rows = eval(tree.as_ref(), &mut archive)?;

    let mut out = Vec::new();
    for &row in rows.iter().skip(offset).take(limit) {
        content.seek(SeekFrom::Start(u64::from(row)))?;
        let mut reader = BufReader::with_capacity(512, &mut *content);
        let mut line = Vec::new();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no content line at offset {row}"),
            )
            .into());
        }
        out.extend_from_slice(&line);
    }
    Ok(out)
}
