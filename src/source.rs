//! Chunked reading of an input stream.
//!
//! Multi-byte UTF-8 sequences can split across read boundaries. A
//! [`ChunkReader`] holds back an incomplete trailing sequence (at most
//! three bytes) and prepends it to the next read, so every yielded chunk is
//! valid text. Invalid bytes inside a chunk become U+FFFD; so does a
//! partial sequence dangling at end of input.

use std::io::{self, ErrorKind, Read};

/// Iterator over UTF-8-safe text chunks from any reader.
pub struct ChunkReader<R> {
    inner: R,
    chunk_size: usize,
    /// Incomplete trailing sequence from the previous read.
    carry: Vec<u8>,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
            carry: Vec::new(),
            done: false,
        }
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<io::Result<String>> {
        if self.done {
            return None;
        }
        loop {
            let mut buf = std::mem::take(&mut self.carry);
            let start = buf.len();
            buf.resize(start + self.chunk_size, 0);

            let n = loop {
                match self.inner.read(&mut buf[start..]) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
            };
            buf.truncate(start + n);

            if n == 0 {
                self.done = true;
                if buf.is_empty() {
                    return None;
                }
                // A sequence left dangling at end of input never completes.
                return Some(Ok(String::from_utf8_lossy(&buf).into_owned()));
            }

            let keep = trailing_incomplete(&buf);
            if keep > 0 {
                self.carry = buf.split_off(buf.len() - keep);
            }
            if buf.is_empty() {
                // Whole read was the head of one multi-byte character.
                continue;
            }
            return Some(Ok(decode(buf)));
        }
    }
}

fn decode(buf: Vec<u8>) -> String {
    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}

/// Length of an incomplete UTF-8 sequence at the end of `buf`, 0 if none.
fn trailing_incomplete(buf: &[u8]) -> usize {
    let len = buf.len();
    let floor = len.saturating_sub(4);
    let mut i = len;
    while i > floor {
        i -= 1;
        if !is_continuation(buf[i]) {
            let need = sequence_len(buf[i]);
            let have = len - i;
            return if have < need { have } else { 0 };
        }
    }
    0
}

/// UTF-8 continuation byte: 10xxxxxx.
fn is_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}

/// Expected sequence length from a lead byte. Invalid leads count as one
/// byte so they fall through to replacement.
fn sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}
