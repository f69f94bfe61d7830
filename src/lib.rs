//! Note index engine: a seekable on-disk inverted index (the
//! term-sorted archive, TSAR) with a boolean query language on top,
//! plus the catalog that keeps document ids, filenames and tags in
//! lockstep with it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   text.rs   │────▶│  tsar/       │◀────│  query/     │
//! │ (tokenizer, │     │ (EntryList,  │     │ (lexer,     │
//! │    tags)    │     │  Index, find)│     │ parser,eval)│
//! └─────────────┘     └──────────────┘     └─────────────┘
//!        │                   ▲                    ▲
//!        ▼                   │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │                    indexer.rs                        │
//! │   (reindex / update_note, index.tsar + index.json,  │
//! │            catalog.rs id/tag bookkeeping)           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use jot::tsar::{EntryList, Index};
//! use jot::query::{eval, parse};
//!
//! let mut list = EntryList::new();
//! list.append("tea", 0).unwrap();
//! list.append("coffee", 1).unwrap();
//! list.append("tea", 1).unwrap();
//!
//! let mut index = Index::unmarshal_lazy(list.to_index().to_bytes()).unwrap();
//! let tree = parse("tea & coffee").unwrap();
//! assert_eq!(eval(tree.as_ref(), &mut index).unwrap(), vec![1]);
//! ```

pub mod catalog;
pub mod indexer;
pub mod query;
pub mod text;
pub mod tsar;

// Re-exports for the common paths
pub use catalog::Catalog;
pub use query::{eval, parse, query, Expr, ParseError, QueryError, SyntaxError};
pub use text::{extract_tags, tokenize_text};
pub use tsar::{
    match_equal, match_prefix, ByteReadSeeker, Entry, EntryList, Index, Matcher,
    MAX_ENTRY_POINTERS, MAX_KEY_LEN, PARTITION_SIZE,
};
