use toad_macros::rfc_7252_doc;

use super::MessageParseError;
use crate::cursor::Cursor;

/// Largest option delta or value length that the option header can express
/// (`14` nibble + 2 extension bytes: `269 + 0xFFFF`)
pub const MAX_EXTENDED: u32 = 269 + u16::MAX as u32;

/// Number of options stored inline before spilling to the heap
/// (or, without `alloc`, the most options a message may hold)
pub const OPTS_INLINE: usize = 16;

#[cfg(feature = "alloc")]
type OptsVec<'a> = tinyvec::TinyVec<[Opt<'a>; OPTS_INLINE]>;

#[cfg(not(feature = "alloc"))]
type OptsVec<'a> = tinyvec::ArrayVec<[Opt<'a>; OPTS_INLINE]>;

#[doc = rfc_7252_doc!("5.4")]
/// <details><summary><b>RFC7252 Section 3.1 Option binary format</b></summary>
#[doc = concat!("\n#", rfc_7252_doc!("3.1"))]
/// </details>
///
/// # `Opt` struct
/// A single option, with its absolute [`OptNumber`] already resolved.
///
/// On the wire options carry a delta from the previous option's number;
/// that bookkeeping lives in the [`Encoder`](crate::Encoder) and the decoder,
/// never in this struct.
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Opt<'a> {
  /// See [`OptNumber`]
  pub number: OptNumber,
  /// See [`OptValue`]
  pub value: OptValue<'a>,
}

#[doc = rfc_7252_doc!("5.4.6")]
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct OptNumber(pub u32);

impl OptNumber {
  /// Uri-Path (11), repeatable; one option per path segment
  pub const URI_PATH: OptNumber = OptNumber(11);
}

#[doc = rfc_7252_doc!("3.2")]
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct OptValue<'a>(pub &'a [u8]);

/// Ordered collection of the [`Opt`]s in a message
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Opts<'a>(OptsVec<'a>);

impl<'a> Opts<'a> {
  /// An empty collection of options
  pub fn new() -> Self {
    Self::default()
  }

  /// Append an option.
  ///
  /// Fails (handing the option back) only when the `alloc` feature is
  /// disabled and [`OPTS_INLINE`] options are already stored.
  pub fn push(&mut self, opt: Opt<'a>) -> Result<(), Opt<'a>> {
    #[cfg(feature = "alloc")]
    {
      self.0.push(opt);
      Ok(())
    }

    #[cfg(not(feature = "alloc"))]
    {
      match self.0.try_push(opt) {
        | None => Ok(()),
        | Some(opt) => Err(opt),
      }
    }
  }

  /// Iterate over the options in the order they were added
  pub fn iter(&self) -> core::slice::Iter<'_, Opt<'a>> {
    self.0.iter()
  }

  /// Get the values of all options with a given number
  pub fn get(&self, number: OptNumber) -> impl Iterator<Item = &'a [u8]> + '_ {
    self.iter()
        .filter(move |o| o.number == number)
        .map(|o| o.value.0)
  }

  /// Number of options
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Whether there are no options
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<'a, 'o> IntoIterator for &'o Opts<'a> {
  type Item = &'o Opt<'a>;
  type IntoIter = core::slice::Iter<'o, Opt<'a>>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

#[cfg(feature = "alloc")]
impl<'a> FromIterator<Opt<'a>> for Opts<'a> {
  fn from_iter<I: IntoIterator<Item = Opt<'a>>>(iter: I) -> Self {
    Opts(iter.into_iter().collect())
  }
}

/// Read the extended form of a delta or length nibble.
///
/// Callers must have already rejected the reserved nibble `15`.
pub(crate) fn parse_opt_len_or_delta(head: u8,
                                     bytes: &mut Cursor<'_>)
                                     -> Result<u32, MessageParseError> {
  match head {
    | 13 => {
      let n = bytes.next().ok_or(MessageParseError::Truncated)?;
      Ok((n as u32) + 13)
    },
    | 14 => match bytes.take_exact(2) {
      | Some(&[a, b]) => Ok(u16::from_be_bytes([a, b]) as u32 + 269),
      | _ => Err(MessageParseError::Truncated),
    },
    | _ => Ok(head as u32),
  }
}

/// Consume options from `bytes` until the payload marker or the end of the buffer.
///
/// On return the cursor sits on the first payload byte (the marker has been consumed)
/// or is exhausted.
pub(crate) fn consume_opts<'a>(bytes: &mut Cursor<'a>) -> Result<Opts<'a>, MessageParseError> {
  let mut opts = Opts::new();
  let mut number = 0u32;

  loop {
    let head = match bytes.peek() {
      | None => break Ok(opts),
      | Some(0b11111111) => {
        bytes.next();
        break Ok(opts);
      },
      | Some(head) => head,
    };

    if head >> 4 == 15 {
      break Err(MessageParseError::MalformedPayloadBoundary);
    }

    if head & 0b1111 == 15 {
      break Err(MessageParseError::ReservedOptionLength);
    }

    bytes.next();

    // delta extension bytes come before length extension bytes
    let delta = parse_opt_len_or_delta(head >> 4, bytes)?;
    let len = parse_opt_len_or_delta(head & 0b1111, bytes)? as usize;

    let value = bytes.take_exact(len).ok_or(MessageParseError::Truncated)?;

    number = number.saturating_add(delta);
    let opt = Opt { number: OptNumber(number),
                    value: OptValue(value) };

    if opts.push(opt).is_err() {
      break Err(MessageParseError::TooManyOptions(opts.len()));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(bytes: &[u8]) -> Result<Vec<(u32, Vec<u8>)>, MessageParseError> {
    let mut cur = Cursor::new(bytes);
    consume_opts(&mut cur).map(|opts| {
                            opts.iter()
                                .map(|o| (o.number.0, o.value.0.to_vec()))
                                .collect()
                          })
  }

  #[test]
  fn parse_opt() {
    assert_eq!(parse(&[0b00010001, 0b00000001]), Ok(vec![(1, vec![1])]));
    assert_eq!(parse(&[0b11010001, 0b00000001, 0b00000001]),
               Ok(vec![(14, vec![1])]));
    assert_eq!(parse(&[0b11100001, 0b00000000, 0b00000001, 0b00000001]),
               Ok(vec![(270, vec![1])]));
    assert_eq!(parse(&[0b00000001, 0b00000001]), Ok(vec![(0, vec![1])]));
  }

  #[test]
  fn numbers_accumulate_deltas() {
    let bytes = [0b10110001, b'a', 0b00000001, b'b', 0b00010000, 0b11111111, 9];
    assert_eq!(parse(&bytes),
               Ok(vec![(11, vec![b'a']), (11, vec![b'b']), (12, vec![])]));
  }

  #[test]
  fn stops_at_payload_marker() {
    let bytes = [0b00010001, 7, 0b11111111, 1, 2, 3];
    let mut cur = Cursor::new(&bytes);
    let opts = consume_opts(&mut cur).unwrap();
    assert_eq!(opts.len(), 1);
    assert_eq!(cur.take_until_end(), &[1, 2, 3]);
  }

  #[test]
  fn reserved_nibbles() {
    assert_eq!(parse(&[0b11110001, 1]),
               Err(MessageParseError::MalformedPayloadBoundary));
    assert_eq!(parse(&[0b00011111, 1]),
               Err(MessageParseError::ReservedOptionLength));
  }

  #[test]
  fn truncated_option() {
    // value length 3 with only 2 bytes left
    assert_eq!(parse(&[0b00010011, 1, 2]), Err(MessageParseError::Truncated));
    // missing 1-byte delta extension
    assert_eq!(parse(&[0b11010000]), Err(MessageParseError::Truncated));
    // missing second byte of 2-byte length extension
    assert_eq!(parse(&[0b00011110, 0]), Err(MessageParseError::Truncated));
  }

  #[test]
  fn get_by_number() {
    let opts: Opts = [Opt { number: OptNumber::URI_PATH,
                            value: OptValue(b"a") },
                      Opt { number: OptNumber(12),
                            value: OptValue(b"x") },
                      Opt { number: OptNumber::URI_PATH,
                            value: OptValue(b"b") }].into_iter()
                                                    .collect();
    assert_eq!(opts.get(OptNumber::URI_PATH).collect::<Vec<_>>(),
               vec![&b"a"[..], &b"b"[..]]);
  }
}
