use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use super::{io_to_nb, is_timeout};
use crate::net::{Readiness, Transport};
use crate::time::Timeout;

/// Wait on `sock` for a datagram without consuming it
pub(crate) fn poll_socket(sock: &UdpSocket, timeout: Timeout) -> io::Result<Readiness> {
  if timeout.is_immediate() {
    sock.set_nonblocking(true)?;
  } else {
    sock.set_nonblocking(false)?;
    sock.set_read_timeout(timeout.as_duration())?;
  }

  match sock.peek(&mut [0u8; 1]) {
    | Ok(_) => Ok(Readiness::Ready),
    | Err(e) if is_timeout(&e) => Ok(Readiness::TimedOut),
    | Err(e) => Err(e),
  }
}

/// Send a whole datagram on `sock`, failing if it was not all written
pub(crate) fn send_all(sock: &UdpSocket, dgram: &[u8]) -> io::Result<()> {
  sock.set_nonblocking(false)?;

  match sock.send(dgram)? {
    | n if n == dgram.len() => Ok(()),
    | n => Err(io::Error::new(io::ErrorKind::WriteZero,
                              format!("sent {} of {} bytes", n, dgram.len()))),
  }
}

/// Bind an ephemeral local port (of the same address family as `peer`)
/// and connect it to `peer`
pub(crate) fn connected_socket<A: ToSocketAddrs>(peer: A) -> io::Result<UdpSocket> {
  let peer = peer.to_socket_addrs()?
                 .next()
                 .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no peer address"))?;

  let local: SocketAddr = match peer {
    | SocketAddr::V4(_) => ([0u8; 4], 0).into(),
    | SocketAddr::V6(_) => ([0u16; 8], 0).into(),
  };

  let sock = UdpSocket::bind(local)?;
  sock.connect(peer)?;
  log::debug!(target: "croak", "udp {} -> {}", sock.local_addr()?, peer);

  Ok(sock)
}

/// [`Transport`] over a UDP socket connected to a single peer
///
/// ```no_run
/// use croak::net::{Transport, COAP_PORT};
/// use croak::std::UdpTransport;
///
/// let mut transport = UdpTransport::connect(("192.0.2.1", COAP_PORT)).unwrap();
/// transport.send(&[0b0101_0000, 0, 0, 1]).unwrap();
/// ```
#[derive(Debug)]
pub struct UdpTransport {
  sock: UdpSocket,
  closed: bool,
}

impl UdpTransport {
  /// Bind an ephemeral local port and connect it to `peer`
  pub fn connect<A: ToSocketAddrs>(peer: A) -> io::Result<Self> {
    connected_socket(peer).map(Self::from_connected)
  }

  /// Use a socket that is already [`connect`](UdpSocket::connect)ed
  pub fn from_connected(sock: UdpSocket) -> Self {
    Self { sock,
           closed: false }
  }

  fn check_open(&self) -> io::Result<()> {
    match self.closed {
      | true => Err(io::Error::from(io::ErrorKind::NotConnected)),
      | false => Ok(()),
    }
  }

  /// Borrow the socket
  pub fn socket(&self) -> &UdpSocket {
    &self.sock
  }
}

impl Transport for UdpTransport {
  type Error = io::Error;

  fn send(&mut self, dgram: &[u8]) -> io::Result<()> {
    self.check_open()?;
    send_all(&self.sock, dgram)
  }

  fn poll(&mut self, timeout: Timeout) -> io::Result<Readiness> {
    self.check_open()?;
    poll_socket(&self.sock, timeout)
  }

  fn recv(&mut self, buffer: &mut [u8]) -> nb::Result<usize, io::Error> {
    self.check_open().map_err(nb::Error::Other)?;
    self.sock.set_nonblocking(true).map_err(nb::Error::Other)?;
    self.sock.recv(buffer).map_err(io_to_nb)
  }

  // UDP has no close handshake, the socket itself is closed on drop
  fn close(&mut self) -> io::Result<()> {
    self.closed = true;
    Ok(())
  }
}
