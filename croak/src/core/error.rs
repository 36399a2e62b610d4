use core::fmt;

use croak_msg::{Id, MessageParseError, MessageToBytesError, Token};

/// The phase of an exchange that an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
  /// We were encoding or sending the request with this id and token
  Sending(Id, Token),
  /// We were waiting for the reply to the request with this id and token
  Polling(Id, Token),
  /// We were closing the transport
  Closing,
  /// No exchange had been started
  Idle,
}

impl When {
  /// Construct a specific error from the context the error occurred in
  pub fn what<E>(self, what: What<E>) -> Error<E> {
    Error { when: self, what }
  }
}

/// An error encountered while driving an exchange
#[derive(Debug)]
pub struct Error<E> {
  /// What happened?
  pub what: What<E>,
  /// What were we doing when it happened?
  pub when: When,
}

impl<E> Error<E> {
  /// Is this error `FromBytes`?
  pub fn message_parse_error(&self) -> Option<&MessageParseError> {
    match self.what {
      | What::FromBytes(ref e) => Some(e),
      | _ => None,
    }
  }

  /// Is this error `Transport`?
  pub fn transport_error(&self) -> Option<&E> {
    match self.what {
      | What::Transport(ref e) => Some(e),
      | _ => None,
    }
  }
}

/// A contextless error
#[derive(Debug)]
pub enum What<E> {
  /// Some transport operation failed
  Transport(E),
  /// Serializing a message from bytes failed
  FromBytes(MessageParseError),
  /// Serializing a message to bytes failed
  ToBytes(MessageToBytesError),
  /// The transport yielded 0 bytes, which means the peer is gone
  ConnectionClosed,
  /// Nothing arrived before the receive timeout elapsed
  TimedOut,
  /// The peer rejected our request with a Reset
  Reset,
  /// Tried to poll for a reply without a request awaiting one
  NoRequestInFlight,
  /// A reply longer than [`MAX_DGRAM_LEN`](crate::core::MAX_DGRAM_LEN) arrived,
  /// so it could not be received whole
  ReplyTooLarge,
}

impl<E: fmt::Debug> fmt::Display for What<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | What::Transport(e) => write!(f, "transport error: {:?}", e),
      | What::FromBytes(e) => write!(f, "malformed reply: {}", e),
      | What::ToBytes(e) => write!(f, "could not encode request: {}", e),
      | What::ConnectionClosed => write!(f, "connection closed by peer"),
      | What::TimedOut => write!(f, "timed out waiting for a reply"),
      | What::Reset => write!(f, "request was reset by peer"),
      | What::NoRequestInFlight => write!(f, "no request awaiting a reply"),
      | What::ReplyTooLarge => {
        write!(f, "reply longer than {} bytes", crate::core::MAX_DGRAM_LEN)
      },
    }
  }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.when {
      | When::Sending(id, _) => write!(f, "{} (sending message {})", self.what, id.0),
      | When::Polling(id, _) => write!(f, "{} (awaiting reply to message {})", self.what, id.0),
      | When::Closing => write!(f, "{} (closing)", self.what),
      | When::Idle => write!(f, "{}", self.what),
    }
  }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display() {
    let err: Error<()> = When::Polling(Id(7), Token::default()).what(What::TimedOut);
    assert_eq!(err.to_string(),
               "timed out waiting for a reply (awaiting reply to message 7)");

    let err: Error<()> = When::Idle.what(What::FromBytes(MessageParseError::Truncated));
    assert!(err.to_string().starts_with("malformed reply: "));
    assert_eq!(err.message_parse_error(), Some(&MessageParseError::Truncated));
    assert!(err.transport_error().is_none());
  }
}
