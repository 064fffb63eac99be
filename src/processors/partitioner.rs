use crate::utils::constants::LINE_TERMINATOR;
use memchr::memchr_iter;
use std::ops::Range;

/// Byte spans of each line in `bytes`, newline excluded. A trailing newline does
/// not produce an empty final line.
pub fn line_spans(bytes: &[u8]) -> impl Iterator<Item = Range<usize>> + '_ {
    let len = bytes.len();
    let mut start = 0;

    // `len` can never be a newline position, so it marks the unterminated tail
    memchr_iter(LINE_TERMINATOR, bytes)
        .chain(std::iter::once(len))
        .filter_map(move |end| {
            if end == len && start >= len {
                return None;
            }
            let span = start..end;
            start = end + 1;
            Some(span)
        })
}

/// A contiguous run of whole lines inside a chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubBatchSpan {
    pub bytes: Range<usize>,
    pub lines: usize,
}

impl SubBatchSpan {
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }
}

/// Groups a chunk's lines into sub-batches for the parser workers.
pub struct LinePartitioner {
    sub_batches: usize,
}

impl LinePartitioner {
    pub fn new(sub_batches: usize) -> Self {
        Self {
            sub_batches: sub_batches.max(1),
        }
    }

    pub fn sub_batches(&self) -> usize {
        self.sub_batches
    }

    /// Partition `bytes` into `sub_batches` spans of `ceil(lines / sub_batches)`
    /// whole lines each; trailing spans come out short or empty.
    ///
    /// Streams over the newlines twice (count, then cut) without materialising
    /// per-line offsets.
    pub fn partition(&self, bytes: &[u8]) -> Vec<SubBatchSpan> {
        let line_count = line_spans(bytes).count();
        let per_batch = line_count.div_ceil(self.sub_batches);

        let mut lines = line_spans(bytes);
        let mut remaining = line_count;
        let mut start = 0;
        let mut spans = Vec::with_capacity(self.sub_batches);

        for _ in 0..self.sub_batches {
            let take = per_batch.min(remaining);
            if take == 0 {
                spans.push(SubBatchSpan {
                    bytes: 0..0,
                    lines: 0,
                });
                continue;
            }

            let end = lines.nth(take - 1).map_or(start, |last| last.end);
            spans.push(SubBatchSpan {
                bytes: start..end,
                lines: take,
            });
            remaining -= take;
            start = (end + 1).min(bytes.len());
        }

        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_spans() {
        let bytes = b"a;1\nbb;2\n\nccc;3";

        let lines: Vec<&[u8]> = line_spans(bytes).map(|s| &bytes[s]).collect();
        let expected: Vec<&[u8]> = vec![b"a;1", b"bb;2", b"", b"ccc;3"];
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_line_spans_trailing_newline() {
        assert_eq!(line_spans(b"a;1\n").count(), 1);
        assert_eq!(line_spans(b"\n").collect::<Vec<_>>(), vec![0..0]);
        assert_eq!(line_spans(b"").count(), 0);
    }

    #[test]
    fn test_line_partitioner_covers_whole_lines() {
        let bytes = b"a;1\nb;2\nc;3\nd;4\ne;5\n";
        let partitioner = LinePartitioner::new(2);
        let spans = partitioner.partition(bytes);

        assert_eq!(spans.len(), 2);
        assert_eq!(&bytes[spans[0].bytes.clone()], b"a;1\nb;2\nc;3");
        assert_eq!(spans[0].lines, 3);
        assert_eq!(&bytes[spans[1].bytes.clone()], b"d;4\ne;5");
        assert_eq!(spans[1].lines, 2);
    }

    #[test]
    fn test_line_partitioner_empty_groups() {
        let partitioner = LinePartitioner::new(4);
        let spans = partitioner.partition(b"a;1\n");

        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0].bytes, 0..3);
        assert!(spans[1..].iter().all(SubBatchSpan::is_empty));
    }

    #[test]
    fn test_line_partitioner_unterminated_last_line() {
        let bytes = b"a;1\nb;2\nc;3";
        let spans = LinePartitioner::new(2).partition(bytes);

        assert_eq!(&bytes[spans[0].bytes.clone()], b"a;1\nb;2");
        assert_eq!(&bytes[spans[1].bytes.clone()], b"c;3");
        assert_eq!(spans[1].lines, 1);
    }

    #[test]
    fn test_line_partitioner_keeps_every_line_once() {
        let bytes = b"a;1\n\nbb;2\nccc;3\n\nd;4\ne;5\nf;6\ng;7";
        let expected: Vec<&[u8]> = line_spans(bytes).map(|s| &bytes[s]).collect();

        for sub_batches in 1..=12 {
            let spans = LinePartitioner::new(sub_batches).partition(bytes);
            assert_eq!(spans.len(), sub_batches);

            let mut seen: Vec<&[u8]> = Vec::new();
            for span in spans.iter().filter(|s| !s.is_empty()) {
                let group = &bytes[span.bytes.clone()];
                let group_lines: Vec<&[u8]> = group.split(|b| *b == b'\n').collect();
                assert_eq!(group_lines.len(), span.lines, "{} sub-batches", sub_batches);
                seen.extend(group_lines);
            }
            assert_eq!(seen, expected, "{} sub-batches", sub_batches);
        }
    }
}
