//! Byte-range parsing for partial-content streaming.
//!
//! The streaming route treats range support as mandatory: a request without a
//! `Range` header is rejected rather than answered with the whole file.
//! Whole-file delivery belongs to the companion static routes.
//!
//! Parsing is deliberately lenient: every non-digit character in the header
//! value is stripped and the remaining digits are read as the start offset.
//! Multi-range and suffix (`-500`) syntax from RFC 7233 are not supported.
//! Players that speak `bytes=<start>-` get exact semantics; anything else is
//! reinterpreted rather than rejected.

/// Inclusive byte interval within a file.
///
/// Invariants: `start <= end < file_size`, and `content_length()` never
/// exceeds the configured chunk cap unless the file remainder is smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered, inclusive of both endpoints.
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this range within a file.
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, file_size)
    }
}

/// Errors from range parsing.
#[derive(Debug, thiserror::Error)]
pub enum RangeError {
    #[error("Range header required")]
    Missing,

    #[error("range start {start} not satisfiable for size {file_size}")]
    Unsatisfiable { start: u64, file_size: u64 },
}

/// Parses a `Range` header value into a bounded byte interval.
///
/// The returned range starts at the offset formed by the header's digits and
/// spans at most `max_chunk` bytes, clamped to the end of the file.
///
/// # Errors
///
/// - `RangeError::Missing` - no `Range` header was supplied
/// - `RangeError::Unsatisfiable` - no digits in the header, or the start
///   offset is at or past end of file (always the case for empty files)
pub fn parse_range(
    header: Option<&str>,
    file_size: u64,
    max_chunk: u64,
) -> Result<ByteRange, RangeError> {
    let header = header.ok_or(RangeError::Missing)?;

    let digits: String = header.chars().filter(|c| c.is_ascii_digit()).collect();
    let start: u64 = digits.parse().map_err(|_| RangeError::Unsatisfiable {
        start: 0,
        file_size,
    })?;

    if start >= file_size {
        return Err(RangeError::Unsatisfiable { start, file_size });
    }

    let end = start.saturating_add(max_chunk - 1).min(file_size - 1);
    Ok(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_CHUNK: u64 = 1_000_000;

    #[test]
    fn test_interior_range_serves_full_chunk() {
        let range = parse_range(Some("bytes=2000000-"), 5_000_000, MAX_CHUNK).unwrap();

        assert_eq!(range.start, 2_000_000);
        assert_eq!(range.end, 2_999_999);
        assert_eq!(range.content_length(), MAX_CHUNK);
        assert_eq!(range.content_range(5_000_000), "bytes 2000000-2999999/5000000");
    }

    #[test]
    fn test_tail_range_serves_remainder() {
        let range = parse_range(Some("bytes=4999999-"), 5_000_000, MAX_CHUNK).unwrap();

        assert_eq!(range.start, 4_999_999);
        assert_eq!(range.end, 4_999_999);
        assert_eq!(range.content_length(), 1);
        assert_eq!(range.content_range(5_000_000), "bytes 4999999-4999999/5000000");
    }

    #[test]
    fn test_range_from_zero() {
        let range = parse_range(Some("bytes=0-"), 500, MAX_CHUNK).unwrap();

        assert_eq!(range.start, 0);
        assert_eq!(range.end, 499);
        assert_eq!(range.content_length(), 500);
    }

    #[test]
    fn test_missing_header_rejected() {
        let result = parse_range(None, 5_000_000, MAX_CHUNK);
        assert!(matches!(result, Err(RangeError::Missing)));
    }

    #[test]
    fn test_start_past_end_of_file_rejected() {
        let result = parse_range(Some("bytes=5000000-"), 5_000_000, MAX_CHUNK);
        assert!(matches!(
            result,
            Err(RangeError::Unsatisfiable {
                start: 5_000_000,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_file_rejected() {
        let result = parse_range(Some("bytes=0-"), 0, MAX_CHUNK);
        assert!(matches!(result, Err(RangeError::Unsatisfiable { .. })));
    }

    #[test]
    fn test_no_digits_rejected() {
        let result = parse_range(Some("bytes=-"), 5_000_000, MAX_CHUNK);
        assert!(matches!(result, Err(RangeError::Unsatisfiable { .. })));
    }

    #[test]
    fn test_lenient_parse_concatenates_digits() {
        // All digits in the header fold into the start offset; an explicit
        // end offset is reinterpreted, not honored.
        let range = parse_range(Some("bytes=2-5"), 5_000, MAX_CHUNK).unwrap();

        assert_eq!(range.start, 25);
        assert_eq!(range.end, 4_999);
    }
}
