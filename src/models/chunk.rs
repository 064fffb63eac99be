use crate::utils::constants::LINE_TERMINATOR;

/// A line-aligned span of the input file. Every chunk except possibly the last
/// ends with a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub offset: u64,
    pub bytes: Vec<u8>,
}

impl Chunk {
    pub fn new(offset: u64, bytes: Vec<u8>) -> Self {
        Self { offset, bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte offset just past this chunk in the source file
    pub fn end_offset(&self) -> u64 {
        self.offset + self.bytes.len() as u64
    }

    pub fn ends_at_line_boundary(&self) -> bool {
        self.bytes.last() == Some(&LINE_TERMINATOR)
    }
}
