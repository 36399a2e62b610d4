use core::fmt;

use tinyvec::ArrayVec;

use crate::*;

/// Trait allowing fallible conversion into bytes
pub trait TryIntoBytes {
  /// Error type yielded if conversion fails
  type Error;

  /// Try to write `self` into `buf`, yielding the number of bytes written
  ///
  /// ```
  /// use croak_msg::*;
  ///
  /// let msg = Message::new(Type::Non, Code::new(0, 1), Id(3), Token::default());
  ///
  /// let mut buf = [0u8; 16];
  /// let n = msg.try_into_bytes(&mut buf).unwrap();
  /// assert_eq!(&buf[..n], &[0b0101_0000, 0b0000_0001, 0, 3]);
  ///
  /// let mut tiny = [0u8; 2];
  /// assert_eq!(msg.try_into_bytes(&mut tiny),
  ///            Err(MessageToBytesError::BufferTooSmall { capacity: 2, size: 4 }));
  /// ```
  fn try_into_bytes(&self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Errors encounterable serializing to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageToBytesError {
  /// The buffer was not large enough for the message.
  ///
  /// `size` is the number of bytes the encoder needed when it ran out of room,
  /// which is a lower bound on the size of the whole message.
  BufferTooSmall {
    /// Length of the buffer
    capacity: usize,
    /// Bytes needed so far
    size: usize,
  },
  /// An option was added with a smaller number than the one before it
  OptionsOutOfOrder {
    /// Number of the previously written option
    prev: OptNumber,
    /// Number of the rejected option
    next: OptNumber,
  },
  /// Tokens may be at most 8 bytes long
  TokenTooLong(usize),
  /// An option's delta or value length exceeded [`MAX_EXTENDED`](crate::MAX_EXTENDED)
  OptionTooLarge(OptNumber),
  /// The code's class or detail does not fit in the code byte
  /// (see [`Code::is_valid`])
  InvalidCode(Code),
}

impl fmt::Display for MessageToBytesError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::BufferTooSmall { capacity, size } => {
        write!(f, "buffer of {} bytes too small, needed at least {}", capacity, size)
      },
      | Self::OptionsOutOfOrder { prev, next } => {
        write!(f, "option {} added after option {}", next.0, prev.0)
      },
      | Self::TokenTooLong(n) => write!(f, "token of {} bytes is longer than 8", n),
      | Self::OptionTooLarge(n) => write!(f, "option {} too large to encode", n.0),
      | Self::InvalidCode(c) => {
        write!(f, "code {}.{} does not fit in a byte", c.class, c.detail)
      },
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for MessageToBytesError {}

/// Single-shot CoAP message writer over a caller-provided buffer.
///
/// The header and token are written by [`Encoder::new`], options by
/// [`Encoder::opt`] (in non-decreasing number order), and the payload by
/// [`Encoder::payload`], which consumes the encoder. Use
/// [`Encoder::finish`] for messages without a payload.
///
/// The encoder remembers the number of the last option it wrote so it can
/// compute each option's delta; nothing is shared between encoders.
///
/// ```
/// use croak_msg::*;
///
/// let mut buf = [0u8; 32];
/// let mut enc = Encoder::new(&mut buf, Type::Con, Code::new(0, 1), Id(1), &[]).unwrap();
/// enc.opt(OptNumber::URI_PATH, b"b").unwrap();
///
/// assert_eq!(enc.opt(OptNumber(7), b"a"),
///            Err(MessageToBytesError::OptionsOutOfOrder { prev: OptNumber::URI_PATH,
///                                                         next: OptNumber(7) }));
/// ```
#[derive(Debug)]
pub struct Encoder<'b> {
  buf: &'b mut [u8],
  pos: usize,
  last_opt: OptNumber,
}

impl<'b> Encoder<'b> {
  /// Start a message: write the fixed header and the token
  pub fn new(buf: &'b mut [u8],
             ty: Type,
             code: Code,
             id: Id,
             token: &[u8])
             -> Result<Self, MessageToBytesError> {
    if token.len() > Token::MAX_LEN {
      return Err(MessageToBytesError::TokenTooLong(token.len()));
    }

    if !code.is_valid() {
      return Err(MessageToBytesError::InvalidCode(code));
    }

    let mut enc = Encoder { buf,
                            pos: 0,
                            last_opt: OptNumber(0) };

    let byte1: u8 = msg::Byte1 { tkl: token.len() as u8,
                                 ver: Version::SUPPORTED,
                                 ty }.into();
    let code: u8 = code.into();
    let [id_a, id_b]: [u8; 2] = id.into();

    enc.write(&[byte1, code, id_a, id_b])?;
    enc.write(token)?;

    Ok(enc)
  }

  /// Append an option.
  ///
  /// Fails with [`MessageToBytesError::OptionsOutOfOrder`] if `number` is
  /// smaller than the last option's; equal numbers (repeated options) are fine.
  ///
  /// Nothing is written if this fails.
  pub fn opt(&mut self, number: OptNumber, value: &[u8]) -> Result<(), MessageToBytesError> {
    if number < self.last_opt {
      return Err(MessageToBytesError::OptionsOutOfOrder { prev: self.last_opt,
                                                          next: number });
    }

    let delta = number.0 - self.last_opt.0;
    let len = value.len();

    if delta > MAX_EXTENDED || len > MAX_EXTENDED as usize {
      return Err(MessageToBytesError::OptionTooLarge(number));
    }

    let (del, del_bytes) = opt_len_or_delta(delta);
    let (len, len_bytes) = opt_len_or_delta(len as u32);

    let mut header = ArrayVec::<[u8; 5]>::new();
    header.push(del << 4 | len);
    header.extend_from_slice(&del_bytes);
    header.extend_from_slice(&len_bytes);

    self.reserve(header.len() + value.len())?;
    self.write(&header)?;
    self.write(value)?;

    self.last_opt = number;
    Ok(())
  }

  /// Append the payload (preceded by the payload marker if non-empty)
  /// and yield the total length of the message.
  pub fn payload(mut self, payload: &[u8]) -> Result<usize, MessageToBytesError> {
    if !payload.is_empty() {
      self.reserve(1 + payload.len())?;
      self.write(&[PAYLOAD_MARKER])?;
      self.write(payload)?;
    }

    Ok(self.pos)
  }

  /// Finish a message with no payload, yielding its length
  pub fn finish(self) -> usize {
    self.pos
  }

  /// Number of bytes written so far
  pub fn len(&self) -> usize {
    self.pos
  }

  /// Whether nothing has been written (never true after [`Encoder::new`] succeeds)
  pub fn is_empty(&self) -> bool {
    self.pos == 0
  }

  fn reserve(&self, n: usize) -> Result<(), MessageToBytesError> {
    let size = self.pos + n;
    if size > self.buf.len() {
      Err(MessageToBytesError::BufferTooSmall { capacity: self.buf.len(),
                                                size })
    } else {
      Ok(())
    }
  }

  fn write(&mut self, bytes: &[u8]) -> Result<(), MessageToBytesError> {
    self.reserve(bytes.len())?;
    self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
    self.pos += bytes.len();
    Ok(())
  }
}

/// Split a delta or length into its 4-bit nibble and extension bytes.
///
/// `val` must be at most [`MAX_EXTENDED`].
pub(crate) fn opt_len_or_delta(val: u32) -> (u8, ArrayVec<[u8; 2]>) {
  match val {
    | n if n >= 269 => {
      let mut bytes = ArrayVec::new();
      bytes.extend_from_slice(&((n - 269) as u16).to_be_bytes());
      (14, bytes)
    },
    | n if n >= 13 => {
      let mut bytes = ArrayVec::new();
      bytes.push((n - 13) as u8);
      (13, bytes)
    },
    | n => (n as u8, ArrayVec::new()),
  }
}

/// Number of bytes an option with this delta and value length occupies
pub(crate) fn opt_size(delta: u32, len: usize) -> usize {
  let ext = |n: usize| match n {
    | n if n >= 269 => 2,
    | n if n >= 13 => 1,
    | _ => 0,
  };

  1 + ext(delta as usize) + ext(len) + len
}
