use crate::cursor::Cursor;

/// Trait for converting a sequence of bytes into some data structure
/// that may borrow from those bytes
pub trait TryFromBytes<'a>: Sized {
  /// Error type yielded if conversion fails
  type Error;

  /// Try to convert from some sequence of bytes
  /// into `Self`
  fn try_from_bytes(bytes: &'a [u8]) -> Result<Self, Self::Error>;
}

/// Trait adding the ability for a _piece_ of a data structure to parse itself by mutating a cursor over a byte buffer.
pub(crate) trait TryConsumeBytes<'a>: Sized {
  /// Error type yielded if conversion fails
  type Error;

  /// Try to consume enough bytes from the cursor
  /// to produce `Self`
  fn try_consume_bytes(bytes: &mut Cursor<'a>) -> Result<Self, Self::Error>;
}
