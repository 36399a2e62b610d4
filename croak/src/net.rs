use crate::time::Timeout;

/// Default port for plain CoAP over UDP
pub const COAP_PORT: u16 = 5683;

/// Default port for CoAP secured with DTLS
pub const COAPS_PORT: u16 = 5684;

/// Whether a [`Transport`] has a datagram waiting to be received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
  /// A datagram (possibly an empty one) can be received
  Ready,
  /// The timeout elapsed and nothing arrived
  TimedOut,
}

/// A bidirectional datagram channel to a single peer.
///
/// The peer is fixed when the transport is created, so none of these
/// operations take an address. Implementations may wrap the channel in
/// a security layer (e.g. DTLS); the exchange logic in [`crate::core`]
/// only ever sees plaintext CoAP datagrams.
///
/// Closing or dropping a transport must cause a pending [`Transport::poll`]
/// or [`Transport::recv`] to return promptly rather than hang.
pub trait Transport {
  /// The error yielded by transport operations
  type Error: core::fmt::Debug;

  /// Send a whole datagram.
  ///
  /// Datagrams are never split, so a short write is an error.
  fn send(&mut self, dgram: &[u8]) -> Result<(), Self::Error>;

  /// Block until a datagram is available or `timeout` elapses.
  ///
  /// This is the only operation that may block the calling thread.
  fn poll(&mut self, timeout: Timeout) -> Result<Readiness, Self::Error>;

  /// Receive a datagram into `buffer` without blocking, yielding the number of bytes
  /// written.
  ///
  /// Yields [`nb::Error::WouldBlock`] if no datagram is waiting, and `Ok(0)`
  /// if the peer closed the channel (or sent an empty datagram).
  ///
  /// Like [`std::net::UdpSocket`], bytes of a datagram that do not fit in
  /// `buffer` are dropped.
  fn recv(&mut self, buffer: &mut [u8]) -> nb::Result<usize, Self::Error>;

  /// Close the channel. Further operations may fail.
  fn close(&mut self) -> Result<(), Self::Error>;
}
