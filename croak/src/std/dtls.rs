use std::io::{self, Read, Write};
use std::net::{ToSocketAddrs, UdpSocket};

use openssl::ssl::{ErrorCode, SslConnector, SslMethod, SslOptions, SslStream, SslVerifyMode};
use openssl::x509::X509;

use super::udp::{connected_socket, poll_socket};
use crate::net::{Readiness, Transport};
use crate::time::Timeout;

/// Cipher suites offered when none are configured; PSK-only suites
/// commonly supported by constrained (mbedTLS, tinydtls) servers.
pub const DEFAULT_PSK_CIPHERS: &str =
  "PSK-AES128-CCM8:PSK-AES128-GCM-SHA256:PSK-AES128-CBC-SHA256:PSK-AES128-CBC-SHA";

/// Largest DTLS record we will send; leaves room for IPv6 & UDP headers
/// within the IPv6 minimum MTU.
pub const DTLS_MTU: u32 = 1200;

/// Pre-shared key credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Psk {
  /// Identity sent to the server in the clear
  pub identity: Vec<u8>,
  /// The secret key
  pub key: Vec<u8>,
}

impl core::fmt::Debug for Psk {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Psk")
     .field("identity", &String::from_utf8_lossy(&self.identity))
     .field("key", &"<redacted>")
     .finish()
  }
}

/// How to secure a [`DtlsTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtlsConfig {
  /// Credentials to authenticate with
  pub psk: Psk,
  /// The name we expect the server to have (sent as SNI, and checked
  /// against the server's certificate when `ca_pem` is set)
  pub hostname: String,
  /// PEM-encoded CA certificate to verify the server against.
  ///
  /// When `None`, only the pre-shared key authenticates the server.
  pub ca_pem: Option<Vec<u8>>,
  /// OpenSSL cipher list string
  pub cipher_list: String,
  /// How long to wait for each handshake flight
  pub handshake_timeout: Timeout,
}

impl DtlsConfig {
  /// Configure PSK authentication with [`DEFAULT_PSK_CIPHERS`], no CA, and a 5 second
  /// handshake timeout
  pub fn new(psk: Psk, hostname: impl Into<String>) -> Self {
    Self { psk,
           hostname: hostname.into(),
           ca_pem: None,
           cipher_list: DEFAULT_PSK_CIPHERS.into(),
           handshake_timeout: Timeout::Millis(5000) }
  }

  /// Build the [`SslConnector`] described by this config
  pub fn connector(&self) -> io::Result<SslConnector> {
    let mut builder = SslConnector::builder(SslMethod::dtls())?;
    builder.set_cipher_list(&self.cipher_list)?;
    builder.set_options(SslOptions::NO_QUERY_MTU);

    let psk = self.psk.clone();
    builder.set_psk_client_callback(move |_, _, identity, key| {
             Ok(write_psk(&psk, identity, key).unwrap_or_else(|| {
                                                 log::error!(target: "croak",
                                                             "PSK does not fit in OpenSSL's buffers");
                                                 0
                                               }))
           });

    match self.ca_pem {
      | Some(ref pem) => {
        builder.cert_store_mut().add_cert(X509::from_pem(pem)?)?;
        builder.set_verify(SslVerifyMode::PEER);
      },
      | None => builder.set_verify(SslVerifyMode::NONE),
    }

    Ok(builder.build())
  }
}

/// Copy the PSK identity (NUL-terminated) and key into OpenSSL's buffers,
/// yielding the key length or `None` if either doesn't fit.
fn write_psk(psk: &Psk, identity: &mut [u8], key: &mut [u8]) -> Option<usize> {
  if psk.identity.len() >= identity.len() || psk.key.len() > key.len() {
    return None;
  }

  identity[..psk.identity.len()].copy_from_slice(&psk.identity);
  identity[psk.identity.len()] = 0;
  key[..psk.key.len()].copy_from_slice(&psk.key);

  Some(psk.key.len())
}

fn ssl_to_io(e: openssl::ssl::Error) -> io::Error {
  match e.into_io_error() {
    | Ok(e) => e,
    | Err(e) => io::Error::new(io::ErrorKind::Other, e),
  }
}

/// A connected UDP socket as a byte stream for OpenSSL;
/// each write is one datagram and each read consumes one datagram.
#[derive(Debug)]
struct UdpStream {
  sock: UdpSocket,
}

impl Read for UdpStream {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.sock.recv(buf)
  }
}

impl Write for UdpStream {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.sock.send(buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// [`Transport`] secured with DTLS 1.2 over a UDP socket connected to a single peer
///
/// ```no_run
/// use croak::net::COAPS_PORT;
/// use croak::std::{DtlsConfig, DtlsTransport, Psk};
///
/// let psk = Psk { identity: b"client_1".to_vec(),
///                 key: b"0N6iDGgu/kF4xoeg".to_vec() };
///
/// let config = DtlsConfig::new(psk, "coap.example.com");
/// let transport = DtlsTransport::connect(("192.0.2.1", COAPS_PORT), &config).unwrap();
/// ```
#[derive(Debug)]
pub struct DtlsTransport {
  stream: SslStream<UdpStream>,
  closed: bool,
}

impl DtlsTransport {
  /// Bind an ephemeral local port, connect it to `peer` and perform the DTLS handshake
  pub fn connect<A: ToSocketAddrs>(peer: A, config: &DtlsConfig) -> io::Result<Self> {
    let sock = connected_socket(peer)?;
    let connector = config.connector()?;

    Self::handshake(sock, &connector, &config.hostname, config.handshake_timeout)
  }

  /// Perform the DTLS handshake over an already-connected socket
  pub fn handshake(sock: UdpSocket,
                   connector: &SslConnector,
                   hostname: &str,
                   timeout: Timeout)
                   -> io::Result<Self> {
    sock.set_nonblocking(false)?;
    sock.set_read_timeout(timeout.as_duration().filter(|d| !d.is_zero()))?;

    let mut ssl = connector.configure()?.into_ssl(hostname)?;
    ssl.set_mtu(DTLS_MTU)?;

    let mut stream = SslStream::new(ssl, UdpStream { sock })?;

    match stream.connect() {
      | Ok(()) => (),
      | Err(e) if e.code() == ErrorCode::WANT_READ => {
        return Err(io::Error::new(io::ErrorKind::TimedOut, "DTLS handshake timed out"))
      },
      | Err(e) => return Err(ssl_to_io(e)),
    }

    log::debug!(target: "croak",
                "DTLS session established with {} ({})",
                hostname,
                stream.ssl().current_cipher().map(|c| c.name()).unwrap_or("?"));

    Ok(Self { stream,
              closed: false })
  }

  fn sock(&self) -> &UdpSocket {
    &self.stream.get_ref().sock
  }

  fn check_open(&self) -> io::Result<()> {
    match self.closed {
      | true => Err(io::Error::from(io::ErrorKind::NotConnected)),
      | false => Ok(()),
    }
  }
}

impl Transport for DtlsTransport {
  type Error = io::Error;

  fn send(&mut self, dgram: &[u8]) -> io::Result<()> {
    self.check_open()?;
    self.sock().set_nonblocking(false)?;

    match self.stream.ssl_write(dgram) {
      | Ok(n) if n == dgram.len() => Ok(()),
      | Ok(n) => Err(io::Error::new(io::ErrorKind::WriteZero,
                                    format!("sent {} of {} bytes", n, dgram.len()))),
      | Err(e) => Err(ssl_to_io(e)),
    }
  }

  fn poll(&mut self, timeout: Timeout) -> io::Result<Readiness> {
    self.check_open()?;

    // a record may already be decrypted & buffered
    if self.stream.ssl().pending() > 0 {
      return Ok(Readiness::Ready);
    }

    poll_socket(self.sock(), timeout)
  }

  fn recv(&mut self, buffer: &mut [u8]) -> nb::Result<usize, io::Error> {
    self.check_open().map_err(nb::Error::Other)?;
    self.sock().set_nonblocking(true).map_err(nb::Error::Other)?;

    match self.stream.ssl_read(buffer) {
      | Ok(n) => Ok(n),
      | Err(e) if e.code() == ErrorCode::ZERO_RETURN => {
        log::debug!(target: "croak", "peer closed the DTLS session");
        Ok(0)
      },
      // handshake records & retransmissions decrypt to nothing
      | Err(e) if e.code() == ErrorCode::WANT_READ => Err(nb::Error::WouldBlock),
      | Err(e) => Err(super::io_to_nb(ssl_to_io(e))),
    }
  }

  fn close(&mut self) -> io::Result<()> {
    if self.closed {
      return Ok(());
    }

    self.closed = true;
    self.sock().set_nonblocking(false)?;
    self.stream.shutdown().map(|_| ()).map_err(ssl_to_io)
  }
}
