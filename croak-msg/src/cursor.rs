/// A cursor over a borrowed byte slice.
///
/// Unlike [`std::io::Cursor`], slices handed out by the cursor
/// borrow from the underlying buffer rather than from the cursor,
/// so parsed messages can keep views into the original datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor<'a> {
  bytes: &'a [u8],
  cursor: usize,
}

impl<'a> Cursor<'a> {
  pub(crate) fn new(bytes: &'a [u8]) -> Self {
    Cursor { bytes, cursor: 0 }
  }

  /// Take the next byte, returning None if the cursor is exhausted.
  pub(crate) fn next(&mut self) -> Option<u8> {
    self.take_exact(1).map(|a| a[0])
  }

  /// Look at the next byte without advancing.
  pub(crate) fn peek(&self) -> Option<u8> {
    self.bytes.get(self.cursor).copied()
  }

  /// Take exactly `n` bytes, returning None (and not advancing)
  /// if fewer than `n` remain.
  pub(crate) fn take_exact(&mut self, n: usize) -> Option<&'a [u8]> {
    if n > self.remaining() {
      return None;
    }

    let bytes: &'a [u8] = self.bytes;
    let out = &bytes[self.cursor..self.cursor + n];
    self.cursor += n;
    Some(out)
  }

  /// Take everything left in the buffer
  pub(crate) fn take_until_end(&mut self) -> &'a [u8] {
    let bytes: &'a [u8] = self.bytes;
    let out = &bytes[self.cursor..];
    self.cursor = bytes.len();
    out
  }

  pub(crate) fn remaining(&self) -> usize {
    self.bytes.len() - self.cursor
  }

  pub(crate) fn is_exhausted(&self) -> bool {
    self.cursor >= self.bytes.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  pub fn next() {
    let mut cur = Cursor::new(&[1]);
    assert_eq!(cur.next(), Some(1));
    assert_eq!(cur.next(), None);
    assert_eq!(cur.next(), None);
    assert!(cur.is_exhausted());
  }

  #[test]
  pub fn take_exact() {
    let mut cur = Cursor::new(&[1, 2, 3]);
    assert_eq!(cur.take_exact(2), Some(&[1u8, 2][..]));
    assert_eq!(cur.take_exact(2), None);
    assert_eq!(cur.remaining(), 1);
    assert_eq!(cur.take_exact(1), Some(&[3u8][..]));
    assert_eq!(cur.take_exact(0), Some(&[][..]));
  }

  #[test]
  pub fn peek_does_not_advance() {
    let mut cur = Cursor::new(&[9, 8]);
    assert_eq!(cur.peek(), Some(9));
    assert_eq!(cur.peek(), Some(9));
    assert_eq!(cur.next(), Some(9));
    assert_eq!(cur.take_until_end(), &[8]);
    assert_eq!(cur.peek(), None);
    assert_eq!(cur.take_until_end(), &[] as &[u8]);
  }
}
