use croak_msg::{Encoder, Id, MessageToBytesError, OptNumber, Token, Type};

use crate::logging::Summary;

/// Request methods
pub mod method;

#[doc(inline)]
pub use method::Method;

/// A CoAP request
///
/// Requests name their resource with a `/`-separated path, which is
/// sent as one Uri-Path option per non-empty segment, in order. Use
/// [`Req::with_segments`] to send segments verbatim, including empty ones
/// or ones containing `/`.
/// Payloads are only sent with [`POST`](Method::POST) and [`PUT`](Method::PUT)
/// requests.
///
/// The message id is assigned when the request is sent; the token is
/// provisioned then too, unless one was set with [`Req::set_token`].
///
/// ```
/// use croak::req::{Method, Req};
/// use croak_msg::Type;
///
/// let mut req = Req::post("a1r/d1/int", b"1001");
/// assert_eq!(req.method(), Method::POST);
/// assert_eq!(req.ty(), Type::Con);
/// assert_eq!(req.path_segments().collect::<Vec<_>>(), vec!["a1r", "d1", "int"]);
///
/// req.non();
/// assert_eq!(req.ty(), Type::Non);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Req<'a> {
  method: Method,
  ty: Type,
  token: Option<Token>,
  path: Path<'a>,
  payload: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Path<'a> {
  Joined(&'a str),
  Segments(&'a [&'a str]),
}

/// Iterator over the Uri-Path segments of a [`Req`]
#[derive(Debug, Clone)]
pub struct PathSegments<'a>(SegmentsIter<'a>);

#[derive(Debug, Clone)]
enum SegmentsIter<'a> {
  Split(core::str::Split<'a, char>),
  Verbatim(core::slice::Iter<'a, &'a str>),
}

impl<'a> Iterator for PathSegments<'a> {
  type Item = &'a str;

  fn next(&mut self) -> Option<&'a str> {
    match self.0 {
      | SegmentsIter::Split(ref mut split) => split.find(|seg| !seg.is_empty()),
      | SegmentsIter::Verbatim(ref mut segs) => segs.next().copied(),
    }
  }
}

impl<'a> Req<'a> {
  /// Create a confirmable request with no payload
  pub fn new(method: Method, path: &'a str) -> Self {
    Self { method,
           ty: Type::Con,
           token: None,
           path: Path::Joined(path),
           payload: &[] }
  }

  /// Create a confirmable request with no payload whose path is given
  /// segment by segment.
  ///
  /// Each segment becomes exactly one Uri-Path option, in order, even if it
  /// is empty or contains `/`.
  ///
  /// ```
  /// use croak::req::{Method, Req};
  ///
  /// let req = Req::with_segments(Method::GET, &["sensors", "", "a/b"]);
  /// assert_eq!(req.path_segments().collect::<Vec<_>>(), vec!["sensors", "", "a/b"]);
  /// assert_eq!(req.path(), None);
  /// ```
  pub fn with_segments(method: Method, segments: &'a [&'a str]) -> Self {
    Self { path: Path::Segments(segments),
           ..Self::new(method, "") }
  }

  /// Create a new GET request
  pub fn get(path: &'a str) -> Self {
    Self::new(Method::GET, path)
  }

  /// Create a new DELETE request
  pub fn delete(path: &'a str) -> Self {
    Self::new(Method::DELETE, path)
  }

  /// Create a new POST request
  pub fn post(path: &'a str, payload: &'a [u8]) -> Self {
    Self { payload,
           ..Self::new(Method::POST, path) }
  }

  /// Create a new PUT request
  pub fn put(path: &'a str, payload: &'a [u8]) -> Self {
    Self { payload,
           ..Self::new(Method::PUT, path) }
  }

  /// Mark this request as non-confirmable, meaning the server
  /// is not expected to acknowledge it.
  pub fn non(&mut self) {
    self.ty = Type::Non;
  }

  /// Set the payload; it is only sent if the method is POST or PUT
  pub fn set_payload(&mut self, payload: &'a [u8]) {
    self.payload = payload;
  }

  /// Use this token instead of a provisioned one
  pub fn set_token(&mut self, token: Token) {
    self.token = Some(token);
  }

  /// Get the request method
  pub fn method(&self) -> Method {
    self.method
  }

  /// Get the message type (CON unless [`Req::non`] was called)
  pub fn ty(&self) -> Type {
    self.ty
  }

  /// Get the token set with [`Req::set_token`], if any
  pub fn token(&self) -> Option<Token> {
    self.token
  }

  /// Get the `/`-separated path, unless this request was created
  /// with [`Req::with_segments`]
  pub fn path(&self) -> Option<&'a str> {
    match self.path {
      | Path::Joined(path) => Some(path),
      | Path::Segments(_) => None,
    }
  }

  /// Iterate over the segments of the path that will be sent as Uri-Path options;
  /// the non-empty ones for a `/`-separated path, or exactly those given to
  /// [`Req::with_segments`]
  ///
  /// ```
  /// use croak::req::Req;
  ///
  /// let req = Req::get("/sensors//temp/");
  /// assert_eq!(req.path_segments().collect::<Vec<_>>(), vec!["sensors", "temp"]);
  /// ```
  pub fn path_segments(&self) -> PathSegments<'a> {
    PathSegments(match self.path {
                   | Path::Joined(path) => SegmentsIter::Split(path.split('/')),
                   | Path::Segments(segs) => SegmentsIter::Verbatim(segs.iter()),
                 })
  }

  /// Get the payload that will be sent, which is always empty
  /// unless the method is POST or PUT.
  pub fn payload(&self) -> &'a [u8] {
    if self.method.carries_payload() {
      self.payload
    } else {
      &[]
    }
  }

  /// Encode this request into `buf` with the given id & token,
  /// yielding the number of bytes written.
  pub fn encode_into(&self,
                     id: Id,
                     token: Token,
                     buf: &mut [u8])
                     -> Result<usize, MessageToBytesError> {
    let mut enc = Encoder::new(buf, self.ty, self.method.code(), id, token.as_bytes())?;

    for seg in self.path_segments() {
      enc.opt(OptNumber::URI_PATH, seg.as_bytes())?;
    }

    enc.payload(self.payload())
  }

  pub(crate) fn summary(&self) -> Summary {
    Summary { ty: self.ty,
              code: self.method.code(),
              payload_len: self.payload().len() }
  }
}
