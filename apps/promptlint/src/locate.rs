//! Offset to line/column conversion for highlighting findings.
//!
//! Lines and columns are 1-based, offsets 0-based. All three count `char`s.
//! Offsets past the end of the text are clamped to its length.

use crate::models::{LintRange, Position};
use std::ops::Range;

/// Position of the `offset`th char of `text`.
pub fn position_at(text: &str, offset: usize) -> Position {
    let mut line = 1;
    let mut column = 1;
    let mut consumed = 0;
    for ch in text.chars().take(offset) {
        consumed += 1;
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Position {
        line,
        column,
        offset: consumed,
    }
}

/// Range covering `len` chars starting at char `offset`.
pub fn range_for_match(text: &str, offset: usize, len: usize) -> LintRange {
    let start = position_at(text, offset);
    let end = position_at(text, offset.saturating_add(len));
    LintRange { start, end }
}

/// Range for a byte span as produced by `regex` matches.
pub fn range_for_bytes(text: &str, span: Range<usize>) -> LintRange {
    let start = char_offset(text, span.start);
    let end = char_offset(text, span.end.max(span.start));
    range_for_match(text, start, end - start)
}

/// Number of chars before byte index `byte_idx` (clamped to the text).
pub fn char_offset(text: &str, byte_idx: usize) -> usize {
    text.char_indices()
        .take_while(|(i, _)| *i < byte_idx)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_zero_is_line_one_column_one() {
        let text = "one\ntwo\nthree";
        assert_eq!(
            position_at(text, 0),
            Position {
                line: 1,
                column: 1,
                offset: 0
            }
        );
    }

    #[test]
    fn test_first_char_of_second_line() {
        let text = "one\ntwo\nthree";
        let p = position_at(text, 4);
        assert_eq!((p.line, p.column, p.offset), (2, 1, 4));
        let p = position_at(text, 6);
        assert_eq!((p.line, p.column), (2, 3));
    }

    #[test]
    fn test_end_is_clamped_to_text_length() {
        let text = "ab\ncd";
        let r = range_for_match(text, 3, 100);
        assert_eq!(r.start.line, 2);
        assert_eq!(r.end.offset, 5);
        assert_eq!((r.end.line, r.end.column), (2, 3));
        let p = position_at(text, 999);
        assert_eq!(p.offset, 5);
    }

    #[test]
    fn test_byte_spans_convert_to_char_offsets() {
        let text = "角色: you are";
        let byte_start = text.find("you").unwrap();
        let r = range_for_bytes(text, byte_start..byte_start + 3);
        assert_eq!(r.start.offset, 4);
        assert_eq!(r.start.column, 5);
        assert_eq!(r.end.offset, 7);
    }

    #[test]
    fn test_empty_text() {
        let r = range_for_match("", 0, 0);
        assert_eq!(r.start, r.end);
        assert_eq!((r.start.line, r.start.column), (1, 1));
    }
}
