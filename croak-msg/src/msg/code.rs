use core::fmt;

use toad_macros::rfc_7252_doc;

#[doc = rfc_7252_doc!("12.1")]
///
/// # Examples
/// ```
/// use croak_msg::Code;
/// assert_eq!(Code { class: 2, detail: 5 }.to_string(), "2.05".to_string())
/// ```
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Code {
  /// The "class" of message codes identify it as a request or response, and provides the class of response status:
  ///
  /// |class|meaning|
  /// |---|---|
  /// |`0`|Message is a request|
  /// |`2`|Message is a success response|
  /// |`4`|Message is a client error response|
  /// |`5`|Message is a server error response|
  pub class: u8,

  /// 2-digit integer (range `[0, 32)`) that provides granular information about the response status.
  ///
  /// Will be the method for requests.
  pub detail: u8,
}

/// Whether a code is for a request, response, or empty message
#[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum CodeKind {
  /// A request code (0.xx)
  Request,
  /// A response code ([2-5].xx)
  Response,
  /// EMPTY (0.00)
  Empty,
}

impl Code {
  /// The code of an empty message (0.00)
  pub const EMPTY: Code = Code::new(0, 0);

  /// Create a new Code
  ///
  /// ```
  /// use croak_msg::Code;
  ///
  /// let content = Code::new(2, 05);
  /// ```
  pub const fn new(class: u8, detail: u8) -> Self {
    Self { class, detail }
  }

  /// Get whether this code is for a request, response, or empty message
  ///
  /// ```
  /// use croak_msg::{Code, CodeKind};
  ///
  /// assert_eq!(Code::new(0, 0).kind(), CodeKind::Empty);
  /// assert_eq!(Code::new(0, 1).kind(), CodeKind::Request);
  /// assert_eq!(Code::new(2, 5).kind(), CodeKind::Response);
  /// ```
  pub fn kind(&self) -> CodeKind {
    match (self.class, self.detail) {
      | (0, 0) => CodeKind::Empty,
      | (0, _) => CodeKind::Request,
      | _ => CodeKind::Response,
    }
  }

  /// Whether this code fits in the single byte it is sent as
  /// (class in `[0, 8)`, detail in `[0, 32)`)
  ///
  /// ```
  /// use croak_msg::Code;
  ///
  /// assert!(Code::new(5, 31).is_valid());
  /// assert!(!Code::new(8, 0).is_valid());
  /// assert!(!Code::new(2, 32).is_valid());
  /// ```
  pub const fn is_valid(&self) -> bool {
    self.class < 8 && self.detail < 32
  }

  /// Whether this is a 2.xx code
  pub fn is_success(&self) -> bool {
    self.class == 2
  }
}

impl fmt::Display for Code {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{:02}", self.class, self.detail)
  }
}

impl From<u8> for Code {
  fn from(b: u8) -> Self {
    let class = b >> 5;
    let detail = b & 0b0011111;

    Code { class, detail }
  }
}

/// Pack a code into its wire byte.
///
/// Bits of `class` above the low 3 and of `detail` above the low 5 are
/// discarded, so check [`Code::is_valid`] first; [`Encoder`](crate::Encoder)
/// rejects invalid codes.
impl From<Code> for u8 {
  fn from(code: Code) -> u8 {
    let class = code.class << 5;
    let detail = code.detail & 0b0011111;

    class | detail
  }
}
