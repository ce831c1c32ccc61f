/// A byte cursor over one line of text.
///
/// `base` is the column where `s` starts on the source line, so positions
/// reported by [`Cursor::pos`] stay valid when scanning a nested slice.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Column of `s[0]` on the source line.
    pub base: usize,
    /// Current local index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str, base: usize) -> Self {
        Self { s, base, i: 0 }
    }

    /// Current absolute column (base + local index).
    pub fn pos(&self) -> usize {
        self.base + self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// The byte `n` positions ahead of the cursor.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    /// The byte just before the cursor; `None` at the start of the slice.
    pub fn prev(&self) -> Option<u8> {
        self.i
            .checked_sub(1)
            .and_then(|p| self.s.as_bytes().get(p).copied())
    }

    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes().get(self.i..).is_some_and(|rest| rest.starts_with(pat))
    }

    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Advances until `pat` is next or the input ends. Returns true if found.
    pub fn seek(&mut self, pat: &[u8]) -> bool {
        while !self.eof() {
            if self.starts_with(pat) {
                return true;
            }
            self.i += 1;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_absolute_columns() {
        let mut cur = Cursor::new("abc", 7);
        assert_eq!(cur.pos(), 7);
        assert_eq!(cur.bump(), Some(b'a'));
        assert_eq!(cur.pos(), 8);
        assert_eq!(cur.prev(), Some(b'a'));
    }

    #[test]
    fn prev_at_start_is_none() {
        let cur = Cursor::new("x", 0);
        assert_eq!(cur.prev(), None);
    }

    #[test]
    fn peek_at_looks_ahead() {
        let cur = Cursor::new("<<t>>", 0);
        assert_eq!(cur.peek_at(2), Some(b't'));
        assert_eq!(cur.peek_at(9), None);
    }

    #[test]
    fn starts_with_past_end_is_false() {
        let mut cur = Cursor::new("ab", 0);
        cur.bump_n(5);
        assert!(cur.eof());
        assert!(!cur.starts_with(b"a"));
        assert_eq!(cur.peek(), None);
    }

    #[test]
    fn seek_finds_pattern() {
        let mut cur = Cursor::new("[[target]] rest", 0);
        cur.bump_n(2);
        assert!(cur.seek(b"]]"));
        assert_eq!(cur.i, 8);
    }

    #[test]
    fn seek_to_end_when_missing() {
        let mut cur = Cursor::new("no close", 0);
        assert!(!cur.seek(b">>"));
        assert!(cur.eof());
    }

    #[test]
    fn bump_at_eof_returns_none() {
        let mut cur = Cursor::new("x", 0);
        assert_eq!(cur.bump(), Some(b'x'));
        assert_eq!(cur.bump(), None);
    }
}
