/// Timeout configuration allowing for "never time out" as an option
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub enum Timeout {
  /// Timeout after some number of milliseconds has elapsed
  Millis(u64),
  /// Never time out
  Never,
}

impl Timeout {
  /// Convert to a [`core::time::Duration`], yielding `None` for [`Timeout::Never`]
  ///
  /// ```
  /// use core::time::Duration;
  /// use croak::time::Timeout;
  ///
  /// assert_eq!(Timeout::Millis(250).as_duration(), Some(Duration::from_millis(250)));
  /// assert_eq!(Timeout::Never.as_duration(), None);
  /// ```
  pub fn as_duration(&self) -> Option<core::time::Duration> {
    match self {
      | Timeout::Millis(ms) => Some(core::time::Duration::from_millis(*ms)),
      | Timeout::Never => None,
    }
  }

  /// Whether this timeout elapses without waiting at all
  pub fn is_immediate(&self) -> bool {
    *self == Timeout::Millis(0)
  }
}
