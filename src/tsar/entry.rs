// Copyright 2026-present Malte Kjellberg
// SPDX-License-Identifier: Apache-2.0

//! Entry wire codec and the mutable entry list it is built from.
//!
//! An entry is one `(key, pointers)` record of the archive:
//!
//! | field        | width              | notes                         |
//! |--------------|--------------------|-------------------------------|
//! | key_len      | 1 byte             | 1..255                        |
//! | num_ptrs     | 2 or 6 bytes       | see below                     |
//! | key          | key_len bytes      | raw bytes                     |
//! | pointers     | num_ptrs * 4 bytes | u32 big-endian                |
//!
//! The pointer count is two bytes of u16 big-endian when it fits; a zero
//! u16 is the escape marker for the wide form, where the true count
//! follows as a u32. Entries with zero pointers never reach the wire
//! (the builder drops them at seal time), so zero is free to act as the
//! marker.

use std::collections::BTreeMap;
use std::io::{self, Read};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

use super::{Index, MAX_ENTRY_POINTERS, MAX_KEY_LEN, PARTITION_SIZE, POINTER_SIZE};

/// One `(key, pointers)` record of a term-sorted archive.
///
/// Pointers are opaque to the archive; the note index stores document
/// ids in them, the batch query helper stores byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub pointers: Vec<u32>,
}

impl Entry {
    /// Encoded size in bytes, used to lay out offsets at seal time and
    /// to advance the cursor when scanning lazily.
    pub fn encoded_len(&self) -> u32 {
        let hdr = if self.pointers.len() <= u16::MAX as usize {
            2
        } else {
            6
        };
        (1 + hdr + self.key.len() + self.pointers.len() * POINTER_SIZE) as u32
    }

    /// Marshal this entry to its wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len() as usize);
        encode_entry(self, &mut buf);
        buf
    }

    /// Unmarshal a single entry from a byte slice.
    pub fn from_bytes(mut data: &[u8]) -> io::Result<Self> {
        read_entry(&mut data)
    }
}

pub(crate) fn encode_entry(e: &Entry, buf: &mut Vec<u8>) {
    buf.push(e.key.len() as u8);
    if e.pointers.len() <= u16::MAX as usize {
        buf.extend_from_slice(&(e.pointers.len() as u16).to_be_bytes());
    } else {
        buf.extend_from_slice(&[0, 0]);
        buf.extend_from_slice(&(e.pointers.len() as u32).to_be_bytes());
    }
    buf.extend_from_slice(e.key.as_bytes());
    for &p in &e.pointers {
        buf.extend_from_slice(&p.to_be_bytes());
    }
}

/// Read one entry from the reader's current position.
pub(crate) fn read_entry<R: Read>(r: &mut R) -> io::Result<Entry> {
    let key_len = r.read_u8().map_err(|e| {
        io::Error::new(e.kind(), format!("when reading key length byte: {e}"))
    })?;
    read_entry_body(r, key_len as usize)
}

/// Like [`read_entry`], but a clean EOF before the first byte yields
/// `None` instead of an error. Used by the eager unmarshal loop.
pub(crate) fn try_read_entry<R: Read>(r: &mut R) -> io::Result<Option<Entry>> {
    match r.read_u8() {
        Ok(key_len) => read_entry_body(r, key_len as usize).map(Some),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(io::Error::new(
            e.kind(),
            format!("when reading key length byte: {e}"),
        )),
    }
}

fn read_entry_body<R: Read>(r: &mut R, key_len: usize) -> io::Result<Entry> {
    let mut num_ptrs = r.read_u16::<BigEndian>().map_err(|e| {
        io::Error::new(e.kind(), format!("when reading pointer count: {e}"))
    })? as usize;
    if num_ptrs == 0 {
        // wide form: the real count follows as a u32
        num_ptrs = r.read_u32::<BigEndian>().map_err(|e| {
            io::Error::new(e.kind(), format!("when reading wide pointer count: {e}"))
        })? as usize;
    }

    let mut key = vec![0u8; key_len];
    r.read_exact(&mut key).map_err(|e| {
        io::Error::new(e.kind(), format!("when reading {key_len} key bytes: {e}"))
    })?;
    let key = String::from_utf8(key).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("key is not valid UTF-8: {e}"))
    })?;

    let mut buf = vec![0u8; num_ptrs * POINTER_SIZE];
    r.read_exact(&mut buf).map_err(|e| {
        io::Error::new(e.kind(), format!("when reading {num_ptrs} pointer values: {e}"))
    })?;
    let pointers = buf.chunks_exact(POINTER_SIZE).map(BigEndian::read_u32).collect();

    Ok(Entry { key, pointers })
}

/// Mutable mapping from key to pointer list, used while building or
/// updating an archive. Seal it into an immutable [`Index`] with
/// [`EntryList::to_index`].
#[derive(Debug, Clone, Default)]
pub struct EntryList {
    entries: BTreeMap<String, Vec<u32>>,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a mutable list from a loaded index, for incremental
    /// updates. The index must have its entries materialized.
    pub fn from_index<R>(index: &Index<R>) -> Self {
        let entries = index
            .entries()
            .iter()
            .map(|e| (e.key.clone(), e.pointers.clone()))
            .collect();
        Self { entries }
    }

    /// Push `ptr` onto the list for `key`.
    pub fn append(&mut self, key: &str, ptr: u32) -> io::Result<()> {
        check_key(key)?;
        let pointers = self.entries.entry(key.to_owned()).or_default();
        if pointers.len() >= MAX_ENTRY_POINTERS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("key {key} has reached the maximum of {MAX_ENTRY_POINTERS} pointers"),
            ));
        }
        pointers.push(ptr);
        Ok(())
    }

    /// Replace the pointer list for `key`.
    pub fn set(&mut self, key: &str, pointers: Vec<u32>) -> io::Result<()> {
        check_key(key)?;
        if pointers.len() > MAX_ENTRY_POINTERS {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("pointer list for key {key} exceeds {MAX_ENTRY_POINTERS} items"),
            ));
        }
        self.entries.insert(key.to_owned(), pointers);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&[u32]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seal into an immutable index.
    ///
    /// Keys with empty pointer lists are dropped. The checkpoint table
    /// samples the byte offset of every `PARTITION_SIZE`-th entry, and
    /// always ends with the offset of the final entry, so a checkpoint
    /// binary search narrows any key to a window of at most
    /// `PARTITION_SIZE` entries.
    pub fn to_index(self) -> Index {
        let mut entries = Vec::new();
        let mut offsets = Vec::new();
        let mut offset = 0u32;
        for (key, pointers) in self.entries {
            if pointers.is_empty() {
                continue;
            }
            let e = Entry { key, pointers };
            offsets.push(offset);
            offset += e.encoded_len();
            entries.push(e);
        }

        let mut checkpoints = Vec::new();
        if !entries.is_empty() {
            let last = entries.len() - 1;
            let mut i = 0;
            while i < last {
                checkpoints.push(offsets[i]);
                i += PARTITION_SIZE;
            }
            checkpoints.push(offsets[last]);
        }

        Index::new_loaded(checkpoints, entries)
    }
}

fn check_key(key: &str) -> io::Result<()> {
    if key.len() > MAX_KEY_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("key must be at most {MAX_KEY_LEN} bytes, got {}", key.len()),
        ));
    }
    Ok(())
}
