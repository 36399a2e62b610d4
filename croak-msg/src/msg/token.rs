use tinyvec::ArrayVec;
use toad_macros::rfc_7252_doc;

use crate::MessageToBytesError;

#[doc = rfc_7252_doc!("5.3.1")]
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Token(pub ArrayVec<[u8; 8]>);

impl Token {
  /// Maximum length of a token, in bytes
  pub const MAX_LEN: usize = 8;

  /// Take an arbitrary-length sequence of bytes and turn it into an opaque message token
  ///
  /// Currently uses the BLAKE2 hashing algorithm, but this may change in the future.
  ///
  /// ```
  /// use croak_msg::Token;
  ///
  /// let my_token = Token::opaque(&[0, 1, 2]);
  /// assert_eq!(my_token.as_bytes().len(), 8);
  /// ```
  pub fn opaque(data: &[u8]) -> Token {
    use blake2::digest::consts::U8;
    use blake2::{Blake2b, Digest};

    let mut digest = Blake2b::<U8>::new();
    digest.update(data);
    Token(Into::<[u8; 8]>::into(digest.finalize()).into())
  }

  /// The token's bytes
  pub fn as_bytes(&self) -> &[u8] {
    self.0.as_slice()
  }

  /// Whether this is the zero-length token
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl AsRef<[u8]> for Token {
  fn as_ref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl<'a> TryFrom<&'a [u8]> for Token {
  type Error = MessageToBytesError;

  /// ```
  /// use croak_msg::{MessageToBytesError, Token};
  ///
  /// assert!(Token::try_from(&[1u8, 2, 3][..]).is_ok());
  /// assert_eq!(Token::try_from(&[0u8; 9][..]),
  ///            Err(MessageToBytesError::TokenTooLong(9)));
  /// ```
  fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
    if bytes.len() > Self::MAX_LEN {
      return Err(MessageToBytesError::TokenTooLong(bytes.len()));
    }

    let mut token = ArrayVec::new();
    token.extend_from_slice(bytes);
    Ok(Token(token))
  }
}
