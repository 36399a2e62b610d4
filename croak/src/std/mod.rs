use std::io;

/// Plain CoAP over a connected UDP socket
pub mod udp;

/// CoAP secured with DTLS (pre-shared keys)
pub mod dtls;

#[doc(inline)]
pub use dtls::{DtlsConfig, DtlsTransport, Psk};
#[doc(inline)]
pub use udp::UdpTransport;

pub(crate) fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

/// Whether an error from a socket with a read timeout means the timeout elapsed
pub(crate) fn is_timeout(err: &io::Error) -> bool {
  matches!(err.kind(),
           io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
