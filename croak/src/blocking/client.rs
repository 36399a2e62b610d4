use croak_msg::{Id, Token};

use crate::config::Config;
use crate::core::{Core, Error, State, What};
use crate::net::Transport;
use crate::req::Req;
use crate::resp::Resp;

/// A blocking CoAP request client
///
/// ```no_run
/// use croak::blocking::Client;
/// use croak::req::Req;
/// use croak::std::UdpTransport;
///
/// let transport = UdpTransport::connect("192.0.2.1:5683").unwrap();
/// let mut client = Client::new(transport);
///
/// let rep = client.exchange(&Req::post("a1r/d1/int", b"1001")).unwrap();
/// println!("{} {:?}", rep.code(), rep.payload_str());
/// ```
#[derive(Debug)]
pub struct Client<T> {
  core: Core<T>,
}

/// Helper methods on Client Results
pub trait ClientResultExt<T, E> {
  /// If we timed out waiting for a response, consider that Ok(None).
  ///
  /// Usually used to handle sending non-confirmable requests that
  /// the server may have received but not responded to.
  fn timeout_ok(self) -> Result<Option<T>, Error<E>>;
}

impl<T, E> ClientResultExt<T, E> for Result<T, Error<E>> {
  fn timeout_ok(self) -> Result<Option<T>, Error<E>> {
    match self {
      | Ok(t) => Ok(Some(t)),
      | Err(Error { what: What::TimedOut,
                    .. }) => Ok(None),
      | Err(e) => Err(e),
    }
  }
}

impl<T: Transport> Client<T> {
  /// Create a new request client
  pub fn new(transport: T) -> Self {
    Self { core: Core::new(transport) }
  }

  /// Create a new request client with a specific runtime config
  pub fn new_config(config: Config, transport: T) -> Self {
    Self { core: Core::new_config(config, transport) }
  }

  /// Send a request and wait for its response.
  ///
  /// Each wait for a datagram is bounded by [`Config::recv_timeout`];
  /// when it elapses the exchange fails with [`What::TimedOut`].
  pub fn exchange(&mut self, req: &Req<'_>) -> Result<Resp<'_>, Error<T::Error>> {
    self.core.send(req)?;

    let timeout = self.core.config().recv_timeout;
    let n = nb::block!(self.core.wait_reply(timeout))?;

    self.core.reply(n)
  }

  /// Send a request without waiting for the response.
  ///
  /// See [`Core::send`].
  pub fn send(&mut self, req: &Req<'_>) -> Result<(Id, Token), Error<T::Error>> {
    self.core.send(req)
  }

  /// Check for the response to the last request, without blocking.
  ///
  /// See [`Core::poll_resp`].
  pub fn poll_resp(&mut self) -> nb::Result<Resp<'_>, Error<T::Error>> {
    self.core.poll_resp()
  }

  /// Get the state of the current (or last) exchange
  pub fn state(&self) -> State {
    self.core.state()
  }

  /// Borrow the runtime core
  pub fn core(&self) -> &Core<T> {
    &self.core
  }

  /// Close the transport
  pub fn close(&mut self) -> Result<(), Error<T::Error>> {
    self.core.close()
  }

  /// Consume the client, yielding the transport
  pub fn into_transport(self) -> T {
    self.core.into_transport()
  }
}
