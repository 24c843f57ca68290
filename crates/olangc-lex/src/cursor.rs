//! Byte cursor over the source buffer.
//!
//! The cursor tracks the current byte offset, the 0-based row, and the
//! byte offset of the beginning of the current line (`bol`). Row and bol
//! are exactly what diagnostics need: `line = row + 1`,
//! `column = offset - bol + 1`. olang source is treated as a byte stream;
//! only ASCII is interpreted, so no UTF-8 decoding happens here.

/// A cursor traversing source code byte by byte.
pub struct Cursor<'src> {
    source: &'src str,
    /// Current byte offset.
    offset: usize,
    /// Current row (0-based).
    row: u32,
    /// Byte offset of the beginning of the current line.
    bol: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            row: 0,
            bol: 0,
        }
    }

    /// The byte at the cursor, or `None` at end of source.
    #[inline]
    pub fn current(&self) -> Option<u8> {
        self.source.as_bytes().get(self.offset).copied()
    }

    /// Advance past the current byte, updating row/bol on a line feed.
    /// Does nothing at end of source.
    #[inline]
    pub fn advance(&mut self) {
        match self.current() {
            Some(b'\n') => {
                self.offset += 1;
                self.row += 1;
                self.bol = self.offset;
            }
            Some(_) => self.offset += 1,
            None => {}
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn row(&self) -> u32 {
        self.row
    }

    #[inline]
    pub fn bol(&self) -> usize {
        self.bol
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Source text from `start` up to the current offset.
    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.offset]
    }

    /// Save the cursor state for later restoration; this is how n-token
    /// lookahead is implemented without any token buffering.
    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            offset: self.offset,
            row: self.row,
            bol: self.bol,
        }
    }

    pub fn restore(&mut self, snapshot: CursorSnapshot) {
        self.offset = snapshot.offset;
        self.row = snapshot.row;
        self.bol = snapshot.bol;
    }
}

/// A saved cursor position.
#[derive(Clone, Copy, Debug)]
pub struct CursorSnapshot {
    pub offset: usize,
    pub row: u32,
    pub bol: usize,
}
