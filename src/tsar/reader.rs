// Copyright 2026-present Malte Kjellberg
// SPDX-License-Identifier: Apache-2.0

//! In-memory byte source for archive readers.
//!
//! A thin `Read + Seek` adapter over an owned byte buffer. Unlike
//! `io::Cursor`, seeking past the end of the buffer is an error: every
//! offset handed to `seek` comes from a checkpoint table or an entry
//! length, so an out-of-range target means the archive is corrupt and
//! the caller should hear about it at the seek, not at the next read.

use std::io::{self, Read, Seek, SeekFrom};

/// Owned byte buffer readable and seekable like a file.
#[derive(Debug, Clone)]
pub struct ByteReadSeeker {
    data: Vec<u8>,
    offset: u64,
}

impl ByteReadSeeker {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, offset: 0 }
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.offset
    }
}

impl From<Vec<u8>> for ByteReadSeeker {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl Read for ByteReadSeeker {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let start = self.offset as usize;
        if start >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.offset += n as u64;
        Ok(n)
    }
}

impl Seek for ByteReadSeeker {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.data.len() as i64;
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(delta) => self.offset as i64 + delta,
            SeekFrom::End(delta) => len + delta,
        };
        if target < 0 || target > len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to {target} outside buffer of {len} bytes"),
            ));
        }
        self.offset = target as u64;
        Ok(self.offset)
    }
}
