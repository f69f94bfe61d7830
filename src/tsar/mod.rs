// Copyright 2026-present Malte Kjellberg
// SPDX-License-Identifier: Apache-2.0

//! The term-sorted archive (TSAR): a compact, seekable on-disk index
//! mapping string keys to lists of 32-bit pointers.
//!
//! File layout:
//!
//! ```text
//! [u32 num_checkpoints]
//! [num_checkpoints x { 4 reserved bytes (zero), u32 entry_offset }]
//! [entries, concatenated in key order]
//! ```
//!
//! Entry offsets are relative to the start of the entries section. The
//! reserved slot once held a row number; writers emit zeros and readers
//! reject anything else.
//!
//! An [`Index`] works in one of two modes. *Loaded*: all entries are in
//! memory and `find` binary-searches them directly. *Lazy*: only the
//! checkpoint table is in memory and `find` seeks into the underlying
//! reader, reading one entry per probe. Every lazy `find` moves the
//! reader's cursor, which is why lookups take `&mut self`.

pub mod entry;
pub mod reader;

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use tracing::trace;

pub use entry::{Entry, EntryList};
pub use reader::ByteReadSeeker;

/// Bytes per pointer on the wire.
pub const POINTER_SIZE: usize = 4;

/// Maximum key length in bytes (the key length field is one byte).
pub const MAX_KEY_LEN: usize = 255;

/// Maximum pointers per entry (the wide count field is a u32).
pub const MAX_ENTRY_POINTERS: usize = u32::MAX as usize;

/// Entries between consecutive checkpoints.
pub const PARTITION_SIZE: usize = 20;

/// Bytes per checkpoint row: 4 reserved + 4 offset.
pub const CHECKPOINT_SIZE: usize = 8;

/// Key predicate used by [`Index::find`].
pub type Matcher = fn(candidate: &str, needle: &str) -> bool;

/// Exact key equality.
pub fn match_equal(candidate: &str, needle: &str) -> bool {
    candidate == needle
}

/// Candidate starts with the needle. Query literals ending in `:*` use
/// this.
pub fn match_prefix(candidate: &str, needle: &str) -> bool {
    candidate.starts_with(needle)
}

/// An immutable term-sorted archive.
///
/// Built by [`EntryList::to_index`] or read back with one of the
/// unmarshal constructors. Entries are sorted ascending by raw key
/// bytes; the checkpoint table bounds binary search into the byte form.
#[derive(Debug)]
pub struct Index<R = ByteReadSeeker> {
    /// Byte offset of the entries section in the reader (lazy mode).
    base_offset: u64,
    reader: Option<R>,
    checkpoints: Vec<u32>,
    entries: Vec<Entry>,
}

impl<R> Index<R> {
    /// Sampled byte offsets into the entries section.
    pub fn checkpoints(&self) -> &[u32] {
        &self.checkpoints
    }

    /// Materialized entries. Empty for a lazy index.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// True when lookups go through the reader instead of memory.
    pub fn is_lazy(&self) -> bool {
        self.reader.is_some()
    }

    /// Marshal to the on-disk form. Requires materialized entries, so
    /// this is only meaningful for built or eagerly unmarshalled
    /// indexes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let cap = self
            .checkpoints
            .last()
            .map_or(0, |&last| last as usize + 4 + self.checkpoints.len() * CHECKPOINT_SIZE);
        let mut buf = Vec::with_capacity(cap);
        buf.extend_from_slice(&(self.checkpoints.len() as u32).to_be_bytes());
        for &p in &self.checkpoints {
            buf.extend_from_slice(&0u32.to_be_bytes());
            buf.extend_from_slice(&p.to_be_bytes());
        }
        for e in &self.entries {
            entry::encode_entry(e, &mut buf);
        }
        buf
    }
}

impl Index {
    pub(crate) fn new_loaded(checkpoints: Vec<u32>, entries: Vec<Entry>) -> Index {
        Index {
            base_offset: 0,
            reader: None,
            checkpoints,
            entries,
        }
    }

    /// Unmarshal eagerly: checkpoints plus every entry, materialized in
    /// memory. The reader is not retained; lookups never touch the
    /// bytes again.
    pub fn unmarshal(data: &[u8]) -> io::Result<Index> {
        let mut lazy = Index::unmarshal_lazy_reader(ByteReadSeeker::new(data.to_vec()))?;
        let mut entries = Vec::new();
        if let Some(reader) = lazy.reader.as_mut() {
            while let Some(e) = entry::try_read_entry(reader)? {
                entries.push(e);
            }
        }
        Ok(Index {
            base_offset: 0,
            reader: None,
            checkpoints: lazy.checkpoints,
            entries,
        })
    }

    /// Unmarshal lazily from an owned byte buffer.
    pub fn unmarshal_lazy(data: Vec<u8>) -> io::Result<Index> {
        Index::unmarshal_lazy_reader(ByteReadSeeker::new(data))
    }
}

impl<R: Read + Seek> Index<R> {
    /// Unmarshal lazily: read only the checkpoint table and keep the
    /// reader for `find`-time entry reads. The reader must be
    /// positioned at the start of the archive.
    pub fn unmarshal_lazy_reader(mut reader: R) -> io::Result<Index<R>> {
        let num = reader.read_u32::<BigEndian>().map_err(|e| {
            io::Error::new(e.kind(), format!("when reading checkpoint count: {e}"))
        })? as usize;

        let mut checkpoints = Vec::with_capacity(num);
        for i in 0..num {
            let reserved = reader.read_u32::<BigEndian>().map_err(|e| {
                io::Error::new(e.kind(), format!("when reading checkpoint {i}: {e}"))
            })?;
            if reserved != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("non-zero reserved bytes in checkpoint {i}"),
                ));
            }
            let offset = reader.read_u32::<BigEndian>().map_err(|e| {
                io::Error::new(e.kind(), format!("when reading checkpoint {i}: {e}"))
            })?;
            checkpoints.push(offset);
        }
        trace!(checkpoints = num, "opened lazy index");

        Ok(Index {
            base_offset: (4 + num * CHECKPOINT_SIZE) as u64,
            reader: Some(reader),
            checkpoints,
            entries: Vec::new(),
        })
    }

    /// Return every entry whose key satisfies the matcher against the
    /// needle, in ascending key order.
    ///
    /// Both matchers select a contiguous run of keys under the sort
    /// order, which is what makes the narrowed scans below complete.
    pub fn find(&mut self, needle: &str, matches: Matcher) -> io::Result<Vec<Entry>> {
        if self.reader.is_some() {
            self.find_lazy(needle, matches)
        } else {
            Ok(self.find_loaded(needle, matches))
        }
    }

    fn find_loaded(&self, needle: &str, matches: Matcher) -> Vec<Entry> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let (mut lo, mut hi) = (0usize, self.entries.len());
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if needle < self.entries[mid].key.as_str() {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        // lo is the floor entry. A prefix needle can sort strictly
        // between the floor key and its first match, so skip leading
        // non-matches that are still below the needle.
        let mut j = lo;
        while j < self.entries.len()
            && self.entries[j].key.as_str() < needle
            && !matches(&self.entries[j].key, needle)
        {
            j += 1;
        }

        let mut res = Vec::new();
        while j < self.entries.len() && matches(&self.entries[j].key, needle) {
            res.push(self.entries[j].clone());
            j += 1;
        }
        res
    }

    fn find_lazy(&mut self, needle: &str, matches: Matcher) -> io::Result<Vec<Entry>> {
        if self.checkpoints.is_empty() {
            return Ok(Vec::new());
        }

        let (mut lo, mut hi) = (0usize, self.checkpoints.len() - 1);
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            let at = self.checkpoints[mid];
            let e = self.entry_at(at)?;
            if needle < e.key.as_str() {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        // Scan the window between the two surviving checkpoints, and
        // keep going past the upper one while the matcher still holds:
        // a prefix run may cross a checkpoint boundary.
        let last = self.checkpoints[self.checkpoints.len() - 1];
        let (mut at, hi) = (self.checkpoints[lo], self.checkpoints[hi]);
        trace!(window = hi - at, "narrowed lazy find");

        let mut res = Vec::new();
        let mut matched = false;
        while at <= hi || (matched && at <= last) {
            let e = self.entry_at(at)?;
            let len = e.encoded_len();
            matched = matches(&e.key, needle);
            if matched {
                res.push(e);
            }
            at += len;
        }
        Ok(res)
    }

    /// Read the entry at `offset` within the entries section.
    fn entry_at(&mut self, offset: u32) -> io::Result<Entry> {
        let pos = self.base_offset + u64::from(offset);
        let reader = self.reader.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Unsupported, "index has no reader attached")
        })?;
        reader
            .seek(SeekFrom::Start(pos))
            .map_err(|e| io::Error::new(e.kind(), format!("when seeking to offset {pos}: {e}")))?;
        entry::read_entry(reader)
    }
}
