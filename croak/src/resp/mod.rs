use croak_msg::{Code, Id, Message, Token, Type};

/// Response codes
pub mod code;

/// A CoAP response
///
/// Responses borrow their options and payload from the receive buffer
/// of the [`Core`](crate::core::Core) they came from, so they cannot be
/// held across exchanges; copy out whatever needs to outlive the next request.
///
/// ```
/// use croak::resp::{code, Resp};
/// use croak_msg::*;
///
/// let mut msg = Message::new(Type::Ack, code::CONTENT, Id(1), Token::default());
/// msg.payload = Payload(b"21.5");
///
/// let resp = Resp::from(msg);
/// assert_eq!(resp.code(), code::CONTENT);
/// assert_eq!(resp.payload_str(), Ok("21.5"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resp<'a>(Message<'a>);

impl<'a> Resp<'a> {
  /// Get the response code
  pub fn code(&self) -> Code {
    self.0.code
  }

  /// Get the message type.
  ///
  /// [`Type::Ack`] for piggybacked responses, [`Type::Con`] or [`Type::Non`]
  /// for separate ones.
  pub fn ty(&self) -> Type {
    self.0.ty
  }

  /// Get the message id
  pub fn id(&self) -> Id {
    self.0.id
  }

  /// Get the token, which matches the request's token
  pub fn token(&self) -> Token {
    self.0.token
  }

  /// Get the payload bytes
  pub fn payload(&self) -> &'a [u8] {
    self.0.payload.0
  }

  /// Read the payload as a utf8 string
  pub fn payload_str(&self) -> Result<&'a str, core::str::Utf8Error> {
    core::str::from_utf8(self.payload())
  }

  /// Borrow the underlying message
  pub fn msg(&self) -> &Message<'a> {
    &self.0
  }
}

impl<'a> From<Message<'a>> for Resp<'a> {
  fn from(msg: Message<'a>) -> Self {
    Self(msg)
  }
}

impl<'a> AsRef<Message<'a>> for Resp<'a> {
  fn as_ref(&self) -> &Message<'a> {
    &self.0
  }
}
