use crate::time::Timeout;

/// Configuration options related to the messages we send
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Msg {
  /// Seed used to generate message [`Token`](croak_msg::Token)s for
  /// requests that don't specify one.
  ///
  /// Tokens are derived from this seed and a per-client counter, so
  /// two clients talking to the same server should use distinct seeds
  /// (random integer, machine identifier).
  ///
  /// ```
  /// use croak::config::Msg;
  ///
  /// assert_eq!(Msg::default().token_seed, 0);
  /// ```
  // token_seed
  // ||
  // xx xxxxxxxx
  //    |      |
  //    counter
  pub token_seed: u16,

  /// Seed for choosing the first message [`Id`](croak_msg::Id).
  ///
  /// Subsequent ids count up from there (wrapping at `u16::MAX`).
  ///
  /// ```
  /// use croak::config::Msg;
  ///
  /// assert_eq!(Msg::default().id_seed, 0);
  /// ```
  pub id_seed: u64,
}

impl Default for Msg {
  fn default() -> Self {
    Msg { token_seed: 0,
          id_seed: 0 }
  }
}

/// Runtime config
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Config {
  /// See [`Msg`]
  pub msg: Msg,

  /// How long to wait for a datagram before giving up on an exchange.
  ///
  /// This bounds each wait for a datagram, not the exchange as a whole.
  /// Every datagram that is dropped while waiting (an empty ACK, a response
  /// with another token, a stray message) starts a fresh wait, so the total
  /// time an exchange takes is unbounded if the peer keeps sending those.
  ///
  /// Defaults to 5 seconds.
  ///
  /// ```
  /// use croak::config::Config;
  /// use croak::time::Timeout;
  ///
  /// assert_eq!(Config::default().recv_timeout, Timeout::Millis(5000));
  /// ```
  pub recv_timeout: Timeout,

  /// Whether responses must carry the token of the request
  /// they answer.
  ///
  /// When `true`, responses with any other token are logged and dropped.
  ///
  /// ```
  /// use croak::config::Config;
  ///
  /// assert!(Config::default().match_token);
  /// ```
  pub match_token: bool,
}

impl Default for Config {
  fn default() -> Self {
    Config { msg: Msg::default(),
             recv_timeout: Timeout::Millis(5000),
             match_token: true }
  }
}
