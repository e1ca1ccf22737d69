//! Position/offset adapter
//!
//! Converts between `line:column` positions and linear byte offsets over a
//! borrowed text. A `TextLines` is built per query and never outlives the
//! read it was created for.

use crate::buffer::position::Position;
use crate::error::{Error, Result};
use crate::string_utils::floor_char_boundary;

/// Line index over a borrowed text.
#[derive(Debug, Clone)]
pub struct TextLines<'a> {
    text: &'a str,
    /// Byte offset of the first character of every line
    starts: Vec<usize>,
}

impl<'a> TextLines<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut starts = Vec::with_capacity(text.len() / 32 + 1);
        starts.push(0);
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { text, starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Number of lines; an empty text has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    pub fn last_line(&self) -> usize {
        self.starts.len() - 1
    }

    fn check_line(&self, line: usize, ch: usize) -> Result<()> {
        if line >= self.starts.len() {
            return Err(Error::InvalidPosition { line, ch });
        }
        Ok(())
    }

    /// Offset of the start of `line`.
    pub fn line_start(&self, line: usize) -> Result<usize> {
        self.check_line(line, 0)?;
        Ok(self.starts[line])
    }

    /// Offset of the end of `line`, before its newline.
    pub fn line_end(&self, line: usize) -> Result<usize> {
        self.check_line(line, 0)?;
        Ok(match self.starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        })
    }

    /// Text of `line` without its trailing newline.
    pub fn line_text(&self, line: usize) -> Result<&'a str> {
        let start = self.line_start(line)?;
        let end = self.line_end(line)?;
        Ok(&self.text[start..end])
    }

    /// Line containing `offset` (offsets past the end map to the last line).
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset) - 1
    }

    /// Convert a position to an offset.
    ///
    /// Fails when `line` is past the last line or `ch` is more than one past
    /// the end of the line. A column of exactly `len + 1` addresses the start
    /// of the following line.
    pub fn to_offset(&self, pos: Position) -> Result<usize> {
        self.check_line(pos.line, pos.ch)?;
        let start = self.starts[pos.line];
        let line = self.line_text(pos.line)?;
        if pos.ch > line.len() + 1 || (pos.ch == line.len() + 1 && pos.line == self.last_line())
        {
            return Err(Error::InvalidPosition {
                line: pos.line,
                ch: pos.ch,
            });
        }
        if pos.ch > line.len() {
            return Ok(start + pos.ch);
        }
        Ok(start + floor_char_boundary(line, pos.ch))
    }

    /// Convert a position to an offset, clamping the line to the last line
    /// and the column to the end of the line.
    pub fn clamp_offset(&self, pos: Position) -> usize {
        let line = pos.line.min(self.last_line());
        let start = self.starts[line];
        let end = match self.starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        };
        let line_text = &self.text[start..end];
        start + floor_char_boundary(line_text, pos.ch.min(line_text.len()))
    }

    /// Convert an offset to a position.
    pub fn to_pos(&self, offset: usize) -> Result<Position> {
        if offset > self.text.len() {
            return Err(Error::InvalidOffset {
                offset,
                len: self.text.len(),
            });
        }
        let offset = floor_char_boundary(self.text, offset);
        let line = self.line_of(offset);
        Ok(Position::new(line, offset - self.starts[line]))
    }

    /// Convert an offset to a position, clamping it to the end of the text.
    pub fn clamp_pos(&self, offset: usize) -> Position {
        let offset = floor_char_boundary(self.text, offset.min(self.text.len()));
        let line = self.line_of(offset);
        Position::new(line, offset - self.starts[line])
    }

    /// Text between two positions.
    pub fn slice_range(&self, from: Position, to: Position) -> Result<&'a str> {
        let a = self.to_offset(from)?;
        let b = self.to_offset(to)?;
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        Ok(&self.text[a..b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count() {
        assert_eq!(TextLines::new("").line_count(), 1);
        assert_eq!(TextLines::new("a").line_count(), 1);
        assert_eq!(TextLines::new("a\nb").line_count(), 2);
        assert_eq!(TextLines::new("a\n").line_count(), 2);
    }

    #[test]
    fn test_line_text() {
        let lines = TextLines::new("first\nsecond\n\nfourth");
        assert_eq!(lines.line_text(0).unwrap(), "first");
        assert_eq!(lines.line_text(1).unwrap(), "second");
        assert_eq!(lines.line_text(2).unwrap(), "");
        assert_eq!(lines.line_text(3).unwrap(), "fourth");
        assert!(lines.line_text(4).is_err());
    }

    #[test]
    fn test_offset_position_bijection() {
        let text = "ab\ncd\n\nefg";
        let lines = TextLines::new(text);
        for offset in 0..=text.len() {
            let pos = lines.to_pos(offset).unwrap();
            assert_eq!(lines.to_offset(pos).unwrap(), offset, "offset {}", offset);
        }
    }

    #[test]
    fn test_to_offset_rejects_out_of_range() {
        let lines = TextLines::new("ab\ncd");
        assert!(matches!(
            lines.to_offset(Position::new(2, 0)),
            Err(Error::InvalidPosition { line: 2, .. })
        ));
        assert!(lines.to_offset(Position::new(0, 4)).is_err());
        // One past the end of the last line has no following line.
        assert!(lines.to_offset(Position::new(1, 3)).is_err());
    }

    #[test]
    fn test_column_past_end_addresses_next_line() {
        let lines = TextLines::new("ab\ncd");
        assert_eq!(lines.to_offset(Position::new(0, 3)).unwrap(), 3);
    }

    #[test]
    fn test_clamp_offset_sentinel() {
        let lines = TextLines::new("ab\ncdef");
        assert_eq!(lines.clamp_offset(Position::end_of_line(0)), 2);
        assert_eq!(lines.clamp_offset(Position::end_of_line(1)), 7);
        assert_eq!(lines.clamp_offset(Position::new(9, 1)), 4);
    }

    #[test]
    fn test_to_pos_rejects_past_end() {
        let lines = TextLines::new("abc");
        assert!(matches!(
            lines.to_pos(4),
            Err(Error::InvalidOffset { offset: 4, len: 3 })
        ));
        assert_eq!(lines.clamp_pos(99), Position::new(0, 3));
    }

    #[test]
    fn test_multibyte_column_snaps_down() {
        let lines = TextLines::new("på deg");
        // Column 2 falls inside 'å'
        assert_eq!(lines.to_offset(Position::new(0, 2)).unwrap(), 1);
    }

    #[test]
    fn test_slice_range() {
        let lines = TextLines::new("hello\nworld");
        let slice = lines
            .slice_range(Position::new(0, 3), Position::new(1, 2))
            .unwrap();
        assert_eq!(slice, "lo\nwo");
    }
}
