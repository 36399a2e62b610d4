//! Low-level representation of CoAP messages.
//!
//! The most notable items in `croak_msg` are [`Message`], a CoAP message
//! very close to the actual byte layout, and [`Encoder`], which writes one
//! into a caller-provided buffer.
//!
//! ## Allocation
//! Encoding never allocates; it writes into whatever `&mut [u8]` you hand it,
//! failing with [`MessageToBytesError::BufferTooSmall`] when the buffer runs out.
//!
//! Decoding borrows from the datagram it was given. The token is copied (it is
//! at most 8 bytes) but option values and the payload are views into the
//! caller's buffer, so a decoded [`Message`] cannot outlive the bytes it came from.
//!
//! Without the `alloc` feature the number of options a decoded message may
//! carry is capped at [`opt::OPTS_INLINE`].
//!
//! ```
//! use croak_msg::*;
//!
//! let mut buf = [0u8; 64];
//! let mut enc = Encoder::new(&mut buf, Type::Con, Code::new(0, 2), Id(7), &[1, 2]).unwrap();
//! enc.opt(OptNumber::URI_PATH, b"temp").unwrap();
//! let n = enc.payload(b"21.5").unwrap();
//!
//! let msg = Message::try_from_bytes(&buf[..n]).unwrap();
//! assert_eq!(msg.code, Code::new(0, 2));
//! assert_eq!(msg.path().collect::<Vec<_>>(), vec![&b"temp"[..]]);
//! assert_eq!(msg.payload.0, b"21.5");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(not(test), forbid(missing_debug_implementations, unreachable_pub))]
#![cfg_attr(not(test), deny(unsafe_code))]
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
#![deny(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc as std_alloc;

mod cursor;

#[doc(hidden)]
pub mod from_bytes;

/// Message structs
pub mod msg;

#[doc(hidden)]
pub mod to_bytes;

#[doc(inline)]
pub use from_bytes::TryFromBytes;
#[doc(inline)]
pub use msg::*;
#[doc(inline)]
pub use to_bytes::{Encoder, MessageToBytesError, TryIntoBytes};

/// Errors encounterable while encoding a message; alias of [`MessageToBytesError`]
pub type EncodeError = MessageToBytesError;

/// Errors encounterable while decoding a message; alias of [`MessageParseError`]
pub type DecodeError = MessageParseError;

#[cfg(test)]
pub(crate) fn test_msg<'a>() -> (Message<'a>, Vec<u8>) {
  //                        version  token len  code (2.05 Content)
  //                        |        |          /
  //                        |  type  |         /  message ID
  //                        |  |     |        |   |
  //                        vv vv vvvv vvvvvvvv vvvvvvvvvvvvvvvv
  let header: [u8; 4] = 0b_01_00_0001_01000101_0000000000000001u32.to_be_bytes();
  let token: [u8; 1] = [254u8];
  let options: [&[u8]; 4] = [&[0b_1011_0011u8], b"a1r", &[0b_0000_0010u8], b"d1"];
  let payload: [&[u8]; 2] = [&[0b1111_1111_u8], b"hello, world!"];
  let bytes = [header.as_ref(),
               token.as_ref(),
               options.concat().as_ref(),
               payload.concat().as_ref()].concat();

  let mut opts = Opts::new();
  opts.push(Opt { number: OptNumber(11),
                  value: OptValue(b"a1r") })
      .unwrap();
  opts.push(Opt { number: OptNumber(11),
                  value: OptValue(b"d1") })
      .unwrap();

  let msg = Message { id: Id(1),
                      ty: Type::Con,
                      ver: Version(1),
                      token: Token(tinyvec::array_vec!([u8; 8] => 254)),
                      opts,
                      code: Code { class: 2,
                                   detail: 5 },
                      payload: Payload(b"hello, world!") };
  (msg, bytes)
}

#[cfg(test)]
pub(crate) mod tests {
  /// Assert equality, printing values in binary on failure
  #[macro_export]
  macro_rules! assert_eqb {
    ($actual:expr, $expected:expr) => {
      if $actual != $expected {
        panic!("expected {:08b} to equal {:08b}", $actual, $expected)
      }
    };
  }

  /// Assert element-wise equality, printing values in binary on failure
  #[macro_export]
  macro_rules! assert_eqb_iter {
    ($actual:expr, $expected:expr) => {
      if $actual.iter().ne($expected.iter()) {
        panic!("expected {:?} to equal {:?}",
               $actual.into_iter()
                      .map(|b| format!("{:08b}", b))
                      .collect::<Vec<_>>(),
               $expected.into_iter()
                        .map(|b| format!("{:08b}", b))
                        .collect::<Vec<_>>())
      }
    };
  }
}
