use crate::error::{ProcessingError, Result};
use crate::models::Chunk;
use crate::utils::constants::LINE_TERMINATOR;
use std::fs::File;
use std::io::Read;
use std::mem;
use std::path::Path;

/// Splits a byte stream into line-aligned chunks.
///
/// Reads the source in windows of up to `window_size` bytes and cuts each time at
/// the last newline seen so far; bytes after it are carried into the next window.
/// A window without any newline keeps accumulating, so a chunk can exceed the
/// window when a single line is longer than it. The final chunk may lack a
/// trailing newline.
///
/// Any read error is yielded once and ends the sequence.
pub struct Chunker<R> {
    reader: R,
    window_size: usize,
    carry: Vec<u8>,
    offset: u64,
    finished: bool,
}

impl Chunker<File> {
    pub fn from_path(path: &Path, window_size: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| ProcessingError::file_access(path, e))?;
        Ok(Self::new(file, window_size))
    }
}

impl<R: Read> Chunker<R> {
    pub fn new(reader: R, window_size: usize) -> Self {
        Self {
            reader,
            window_size: window_size.max(1),
            carry: Vec::new(),
            offset: 0,
            finished: false,
        }
    }

    /// Read the next window onto the carry buffer. Returns bytes read; 0 is EOF.
    fn fill_window(&mut self) -> std::io::Result<usize> {
        let before = self.carry.len();
        self.carry.reserve(self.window_size);
        (&mut self.reader)
            .take(self.window_size as u64)
            .read_to_end(&mut self.carry)?;
        Ok(self.carry.len() - before)
    }

    fn emit(&mut self, bytes: Vec<u8>) -> Chunk {
        let chunk = Chunk::new(self.offset, bytes);
        self.offset = chunk.end_offset();
        chunk
    }

    fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        loop {
            let read = self.fill_window()?;

            if read == 0 {
                self.finished = true;
                if self.carry.is_empty() {
                    return Ok(None);
                }
                let remainder = mem::take(&mut self.carry);
                return Ok(Some(self.emit(remainder)));
            }

            // Only the freshly read bytes can hold a newline the carry didn't
            let fresh_start = self.carry.len() - read;
            if let Some(pos) = memchr::memrchr(LINE_TERMINATOR, &self.carry[fresh_start..]) {
                let cut = fresh_start + pos + 1;
                let rest = self.carry.split_off(cut);
                let bytes = mem::replace(&mut self.carry, rest);
                return Ok(Some(self.emit(bytes)));
            }
        }
    }
}

impl<R: Read> Iterator for Chunker<R> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_chunk() {
            Ok(chunk) => chunk.map(Ok),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
