/// A cursor for scanning markup with byte position tracking.
///
/// Delimiters in the markup grammar are ASCII, so they are matched byte-wise;
/// free text is stepped over a whole character at a time so the cursor never
/// lands inside a multi-byte sequence.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at the start of `s`.
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Returns the current byte position.
    pub fn pos(&self) -> usize {
        self.i
    }

    /// Moves the cursor to an absolute byte position.
    pub fn seek(&mut self, i: usize) {
        self.i = i;
    }

    /// Returns true if at end of string.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Peeks at the current character without advancing.
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Remaining input from the current position.
    pub fn rest(&self) -> &'a str {
        self.s.get(self.i..).unwrap_or("")
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.rest().as_bytes().starts_with(pat)
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by one full character, returning it.
    pub fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Byte position of the next occurrence of `b` at or after the cursor.
    pub fn find(&self, b: u8) -> Option<usize> {
        self.rest()
            .as_bytes()
            .iter()
            .position(|&x| x == b)
            .map(|off| self.i + off)
    }
}
