use core::fmt;

use croak_msg::Code;

use crate::code;

/// Request method
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Method(pub(crate) Code);

impl Method {
  code!(rfc7252("5.8.1") GET    = Method(0 . 01));
  code!(rfc7252("5.8.2") POST   = Method(0 . 02));
  code!(rfc7252("5.8.3") PUT    = Method(0 . 03));
  code!(rfc7252("5.8.4") DELETE = Method(0 . 04));

  /// Get the raw message code of this method
  pub fn code(&self) -> Code {
    self.0
  }

  /// Whether requests with this method carry a payload
  ///
  /// ```
  /// use croak::req::Method;
  ///
  /// assert!(Method::POST.carries_payload());
  /// assert!(!Method::GET.carries_payload());
  /// ```
  pub fn carries_payload(&self) -> bool {
    *self == Method::POST || *self == Method::PUT
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      | Method::GET => write!(f, "GET"),
      | Method::POST => write!(f, "POST"),
      | Method::PUT => write!(f, "PUT"),
      | Method::DELETE => write!(f, "DELETE"),
      | Method(c) => write!(f, "{}", c),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display() {
    assert_eq!(Method::GET.to_string(), "GET");
    assert_eq!(Method::POST.to_string(), "POST");
    assert_eq!(Method::PUT.to_string(), "PUT");
    assert_eq!(Method::DELETE.to_string(), "DELETE");
    assert_eq!(Method(Code::new(0, 5)).to_string(), "0.05");
  }

  #[test]
  fn codes() {
    assert_eq!(u8::from(Method::GET.code()), 1);
    assert_eq!(u8::from(Method::POST.code()), 2);
    assert_eq!(u8::from(Method::PUT.code()), 3);
    assert_eq!(u8::from(Method::DELETE.code()), 4);
  }
}
