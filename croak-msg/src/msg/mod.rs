use toad_macros::rfc_7252_doc;

/// Message Code
pub mod code;

/// Message parsing errors
pub mod parse_error;

/// Message ID
pub mod id;

/// Message Options
pub mod opt;

/// Message Type
pub mod ty;

/// Message Token
pub mod token;

/// Message Version
pub mod ver;

pub use code::*;
pub use id::*;
pub use opt::*;
pub use parse_error::*;
pub use token::*;
pub use ty::*;
pub use ver::*;

use crate::cursor::Cursor;
use crate::from_bytes::TryConsumeBytes;
use crate::to_bytes::Encoder;
use crate::{MessageToBytesError, TryFromBytes, TryIntoBytes};

/// Size of the fixed message header (byte 1, code, 2-byte id)
pub const HEADER_SIZE: usize = 4;

/// The byte separating options from the payload
pub const PAYLOAD_MARKER: u8 = 0b11111111;

#[doc = rfc_7252_doc!("5.5")]
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Payload<'a>(pub &'a [u8]);

/// Struct representing the first byte of a message.
///
/// ```text
/// CoAP version
/// |
/// |  Message type (request, response, empty)
/// |  |
/// |  |  Length of token, in bytes. (4-bit integer)
/// |  |  |
/// vv vv vvvv
/// 01 00 0000
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Byte1 {
  pub(crate) ver: Version,
  pub(crate) ty: Type,
  pub(crate) tkl: u8,
}

impl From<u8> for Byte1 {
  fn from(b: u8) -> Self {
    let ver = b >> 6; // bits 0 & 1
    let ty = b >> 4 & 0b11; // bits 2 & 3
    let tkl = b & 0b1111u8; // last 4 bits

    Byte1 { ver: Version(ver),
            ty: Type::from_bits(ty),
            tkl }
  }
}

impl From<Byte1> for u8 {
  fn from(b: Byte1) -> u8 {
    let ver = b.ver.0 << 6;
    let ty = u8::from(b.ty) << 4;
    let tkl = b.tkl;

    ver | ty | tkl
  }
}

/// # `Message` struct
/// Low-level representation of a CoAP message.
///
/// Decoded messages borrow option values and payload from the datagram they were
/// parsed from; the token is copied.
///
/// Messages support both serializing to bytes and from bytes, by using the provided [`TryFromBytes`] and [`TryIntoBytes`] traits.
///
/// <details>
/// <summary><b>RFC7252 - CoAP Messaging Model</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("2.1"))]
/// </details>
/// <details>
/// <summary><b>RFC7252 - CoAP Message Binary Format</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("3"))]
/// </details>
///
/// ```
/// use croak_msg::*;
/// # //                       version  token len  code (2.05 Content)
/// # //                       |        |          /
/// # //                       |  type  |         /  message ID
/// # //                       |  |     |        |   |
/// # //                       vv vv vvvv vvvvvvvv vvvvvvvvvvvvvvvv
/// # let header: [u8; 4] = 0b_01_10_0001_01000101_0000000000000001u32.to_be_bytes();
/// # let token: [u8; 1] = [254u8];
/// # let payload: [&[u8]; 2] = [&[0b_11111111u8], b"hello, world!"];
/// let packet: Vec<u8> = /* bytes! */
/// # [header.as_ref(), token.as_ref(), payload.concat().as_ref()].concat();
///
/// let msg = Message::try_from_bytes(&packet).unwrap();
///
/// assert_eq!(msg.ty, Type::Ack);
/// assert_eq!(msg.code.to_string(), "2.05");
/// assert_eq!(msg.token.as_bytes(), &[254]);
/// assert_eq!(msg.payload, Payload(b"hello, world!"));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message<'a> {
  /// see [`Id`] for details
  pub id: Id,
  /// see [`Type`] for details
  pub ty: Type,
  /// see [`Version`] for details
  pub ver: Version,
  /// see [`Token`] for details
  pub token: Token,
  /// see [`Code`] for details
  pub code: Code,
  /// see [`Opts`] for details
  pub opts: Opts<'a>,
  /// see [`Payload`]
  pub payload: Payload<'a>,
}

impl<'a> Message<'a> {
  /// Create a message with no options and no payload
  pub fn new(ty: Type, code: Code, id: Id, token: Token) -> Self {
    Self { id,
           ty,
           ver: Version::default(),
           token,
           code,
           opts: Opts::new(),
           payload: Payload(&[]) }
  }

  /// Create the empty ACK acknowledging this message.
  ///
  /// Empty messages carry no token, so only the [`Id`] is copied.
  ///
  /// ```
  /// use croak_msg::*;
  ///
  /// let rep = Message::new(Type::Con, Code::new(2, 5), Id(9), Token::opaque(b"a"));
  /// let ack = rep.ack();
  ///
  /// assert_eq!(ack.ty, Type::Ack);
  /// assert_eq!(ack.id, Id(9));
  /// assert_eq!(ack.code, Code::EMPTY);
  /// assert!(ack.token.is_empty());
  /// ```
  pub fn ack(&self) -> Message<'static> {
    Message::new(Type::Ack, Code::EMPTY, self.id, Token::default())
  }

  /// Iterate over the Uri-Path segments of this message, in order
  pub fn path(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
    self.opts.get(OptNumber::URI_PATH)
  }

  /// Whether this is an empty message (code 0.00)
  pub fn is_empty(&self) -> bool {
    self.code == Code::EMPTY
  }

  /// The exact number of bytes this message occupies on the wire
  pub fn size(&self) -> usize {
    let token_size = self.token.as_bytes().len();

    let mut last = 0u32;
    let opts_size: usize = self.opts
                               .iter()
                               .map(|o| {
                                 let delta = o.number.0.saturating_sub(last);
                                 last = o.number.0;
                                 crate::to_bytes::opt_size(delta, o.value.0.len())
                               })
                               .sum();

    let payload_size = match self.payload.0.len() {
      | 0 => 0,
      | n => 1 + n,
    };

    HEADER_SIZE + token_size + opts_size + payload_size
  }

  /// Encode this message into `buf`, yielding the number of bytes written.
  ///
  /// Options must be in non-decreasing [`OptNumber`] order.
  ///
  /// A message whose [`Version`] is not [`Version::SUPPORTED`] is still
  /// encoded as version 1.
  pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize, MessageToBytesError> {
    let mut enc = Encoder::new(buf, self.ty, self.code, self.id, self.token.as_bytes())?;

    for opt in self.opts.iter() {
      enc.opt(opt.number, opt.value.0)?;
    }

    enc.payload(self.payload.0)
  }

  /// Encode this message into a newly allocated `Vec`
  #[cfg(feature = "alloc")]
  pub fn to_vec(&self) -> Result<std_alloc::vec::Vec<u8>, MessageToBytesError> {
    let mut bytes = std_alloc::vec![0u8; self.size()];
    let n = self.encode_into(&mut bytes)?;
    bytes.truncate(n);
    Ok(bytes)
  }
}

impl<'a> TryIntoBytes for Message<'a> {
  type Error = MessageToBytesError;

  fn try_into_bytes(&self, buf: &mut [u8]) -> Result<usize, Self::Error> {
    self.encode_into(buf)
  }
}

impl<'a> TryFromBytes<'a> for Message<'a> {
  type Error = MessageParseError;

  fn try_from_bytes(bytes: &'a [u8]) -> Result<Self, Self::Error> {
    if bytes.len() < HEADER_SIZE {
      return Err(MessageParseError::Truncated);
    }

    let mut bytes = Cursor::new(bytes);

    let Byte1 { tkl, ty, ver } = bytes.next().ok_or(MessageParseError::Truncated)?.into();

    if ver != Version::SUPPORTED {
      return Err(MessageParseError::UnsupportedVersion(ver.0));
    }

    if tkl as usize > Token::MAX_LEN {
      return Err(MessageParseError::InvalidTokenLength(tkl));
    }

    let code: Code = bytes.next().ok_or(MessageParseError::Truncated)?.into();
    let id: Id = Id::try_consume_bytes(&mut bytes)?;

    let token = bytes.take_exact(tkl as usize)
                     .ok_or(MessageParseError::Truncated)?;
    let token = Token::try_from(token).map_err(|_| MessageParseError::InvalidTokenLength(tkl))?;

    let opts = opt::consume_opts(&mut bytes)?;

    let payload = match bytes.is_exhausted() {
      | true => Payload(&[]),
      | false => Payload(bytes.take_until_end()),
    };

    Ok(Message { id,
                 ty,
                 ver,
                 code,
                 token,
                 opts,
                 payload })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_eqb;

  #[test]
  fn parse_msg() {
    let (expect, msg) = crate::test_msg();
    assert_eq!(Message::try_from_bytes(&msg).unwrap(), expect)
  }

  #[test]
  fn parse_byte1() {
    let byte = 0b_01_10_0011u8;
    let byte = Byte1::from(byte);
    assert_eq!(byte,
               Byte1 { ver: Version(1),
                       ty: Type::Ack,
                       tkl: 3 })
  }

  #[test]
  fn byte_1() {
    let byte = Byte1 { ver: Version(1),
                       ty: Type::Ack,
                       tkl: 3 };
    let actual: u8 = byte.into();
    let expected = 0b_01_10_0011u8;
    assert_eqb!(actual, expected)
  }

  #[test]
  fn rejects_other_versions() {
    let (_, mut bytes) = crate::test_msg();
    [0b00u8, 0b10, 0b11].into_iter().for_each(|ver| {
                                    bytes[0] = (bytes[0] & 0b0011_1111) | (ver << 6);
                                    assert_eq!(Message::try_from_bytes(&bytes),
                                               Err(MessageParseError::UnsupportedVersion(ver)));
                                  });
  }

  #[test]
  fn rejects_short_header() {
    let cases: [&[u8]; 3] = [&[], &[0b0100_0000], &[0b0100_0000, 0, 0]];
    cases.into_iter().for_each(|bytes| {
                       assert_eq!(Message::try_from_bytes(bytes),
                                  Err(MessageParseError::Truncated));
                     });
  }

  #[test]
  fn token_longer_than_buffer() {
    let bytes = [0b0100_0100, 0b0100_0101, 0, 1, 0xAA, 0xBB];
    assert_eq!(Message::try_from_bytes(&bytes),
               Err(MessageParseError::Truncated));
  }

  #[test]
  fn token_length_nibble_too_big() {
    let bytes = [0b0100_1001, 0b0100_0101, 0, 1, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    assert_eq!(Message::try_from_bytes(&bytes),
               Err(MessageParseError::InvalidTokenLength(9)));
  }

  #[test]
  fn payload_marker() {
    let header = [0b0110_0000, 0b0100_0101, 0, 1];

    // no marker
    let msg = Message::try_from_bytes(&header).unwrap();
    assert_eq!(msg.payload, Payload(&[]));

    // marker followed by nothing
    let bytes = [&header[..], &[0xFF]].concat();
    let msg = Message::try_from_bytes(&bytes).unwrap();
    assert_eq!(msg.payload, Payload(&[]));

    // marker followed by data
    let bytes = [&header[..], &[0xFF, 1, 2]].concat();
    let msg = Message::try_from_bytes(&bytes).unwrap();
    assert_eq!(msg.payload, Payload(&[1, 2]));
  }

  #[test]
  fn garbage_after_options() {
    let bytes = [0b0110_0000, 0b0100_0101, 0, 1, 0xF0, 1, 2];
    assert_eq!(Message::try_from_bytes(&bytes),
               Err(MessageParseError::MalformedPayloadBoundary));
  }

  #[test]
  fn size_matches_encoding() {
    let (msg, bytes) = crate::test_msg();
    assert_eq!(msg.size(), bytes.len());
    assert_eq!(msg.to_vec().unwrap(), bytes);
  }

  fn opt(number: u32, value: &[u8]) -> Opt<'_> {
    Opt { number: OptNumber(number),
          value: OptValue(value) }
  }

  #[test]
  fn roundtrip_table() {
    let long_13 = [b'x'; 13];
    let long_300 = [0x5Au8; 300];

    let opt_sets: Vec<Vec<Opt>> =
      vec![vec![],
           vec![opt(11, b"a1r"), opt(11, b"d1"), opt(11, b"int")],
           // 1-byte extended delta (11 -> 60) & 1-byte extended length
           vec![opt(4, b"etag"), opt(11, b"a"), opt(60, &long_13)],
           // 2-byte extended delta (60 -> 2048) & 2-byte extended length
           vec![opt(11, b""), opt(60, b"1"), opt(2048, &long_300)],
           vec![opt(1, b""), opt(14, &long_13), opt(283, b"z"), opt(65000, &long_300)],];
    let payloads: [&[u8]; 3] = [b"", b"1001", &long_300];
    let codes = [Code::new(0, 1),
                 Code::new(0, 2),
                 Code::new(0, 3),
                 Code::new(0, 4),
                 Code::new(2, 5)];
    let types = [Type::Con, Type::Non, Type::Ack];
    let token_bytes = [0xA5u8, 1, 2, 3, 4, 5, 6, 7];

    for (i, opts) in opt_sets.iter().enumerate() {
      for payload in payloads {
        for tkl in 0..=Token::MAX_LEN {
          let token = Token::try_from(&token_bytes[..tkl]).unwrap();
          let mut msg = Message::new(types[tkl % types.len()],
                                     codes[(i + tkl) % codes.len()],
                                     Id(tkl as u16 * 257),
                                     token);
          opts.iter().for_each(|o| msg.opts.push(*o).unwrap());
          msg.payload = Payload(payload);

          let bytes = msg.to_vec().unwrap();
          assert_eq!(bytes.len(), msg.size());

          let decoded = Message::try_from_bytes(&bytes).unwrap();
          assert_eq!(decoded.ver, Version(1));
          assert_eq!(decoded.ty, msg.ty);
          assert_eq!(decoded.code, msg.code);
          assert_eq!(decoded.id, msg.id);
          assert_eq!(decoded.token.as_bytes(), &token_bytes[..tkl]);
          assert_eq!(decoded.opts.iter().collect::<Vec<_>>(),
                     msg.opts.iter().collect::<Vec<_>>());
          assert_eq!(decoded.payload.0, payload);
          assert_eq!(decoded, msg);
        }
      }
    }
  }

  #[test]
  fn path_segments() {
    let (msg, _) = crate::test_msg();
    assert_eq!(msg.path().collect::<Vec<_>>(), vec![&b"a1r"[..], &b"d1"[..]]);
  }
}
