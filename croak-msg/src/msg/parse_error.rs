use core::fmt;

/// Errors encounterable while parsing a message from bytes
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub enum MessageParseError {
  /// Reached the end of the buffer before parsing was finished;
  /// the header, token or an option was cut short.
  Truncated,

  /// The 2-bit version field was not [`Version::SUPPORTED`](crate::Version::SUPPORTED)
  UnsupportedVersion(u8),

  /// Token length nibble was > 8
  InvalidTokenLength(u8),

  /// After the options, the remaining bytes did not begin with
  /// the payload marker `0xFF`.
  ///
  /// This is what an option header with the reserved delta nibble `15`
  /// looks like from the decoder's point of view.
  MalformedPayloadBoundary,

  /// An option's length nibble was set to the reserved value `15`
  ReservedOptionLength,

  /// More options than the fixed capacity available without `alloc`
  TooManyOptions(usize),
}

impl fmt::Display for MessageParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::Truncated => write!(f, "message truncated"),
      | Self::UnsupportedVersion(v) => write!(f, "unsupported CoAP version {}", v),
      | Self::InvalidTokenLength(n) => write!(f, "invalid token length {}", n),
      | Self::MalformedPayloadBoundary => write!(f, "bytes after options did not start with 0xFF"),
      | Self::ReservedOptionLength => write!(f, "option length used reserved value 15"),
      | Self::TooManyOptions(n) => write!(f, "more than {} options", n),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for MessageParseError {}
