use croak_msg::{Code, CodeKind, Id, Message, MessageParseError, Token, TryFromBytes, Type};

use crate::config::Config;
use crate::logging::{Hex, Summary};
use crate::net::{Readiness, Transport};
use crate::req::Req;
use crate::resp::Resp;
use crate::time::Timeout;

mod error;
mod provision;

#[doc(inline)]
pub use error::*;
use provision::Provision;

/// Largest request we will encode and largest reply we will accept.
///
/// Replies are received into a buffer one byte longer than this, so a reply
/// that the transport had to cut short is detected and fails the exchange
/// with [`What::ReplyTooLarge`] instead of being parsed.
pub const MAX_DGRAM_LEN: usize = 256;

/// Where an exchange is in its lifecycle.
///
/// ```text
/// Idle -> Sending -> AwaitingReply -> Completed
///            |             |       -> TimedOut
///            +-------------+-------> Failed
/// ```
///
/// `Completed`, `TimedOut` and `Failed` are terminal; sending
/// another request starts a new exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
  /// Nothing has been sent yet
  Idle,
  /// A request is being encoded & handed to the transport
  Sending,
  /// A request was sent and we're waiting for the reply
  AwaitingReply,
  /// A reply was received
  Completed,
  /// Nothing arrived before the receive timeout elapsed
  TimedOut,
  /// The exchange failed; see the error that was returned
  Failed,
}

impl State {
  /// Whether this exchange is over
  pub fn is_terminal(&self) -> bool {
    matches!(self, State::Completed | State::TimedOut | State::Failed)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Exchange {
  id: Id,
  token: Token,
}

/// What to do with a datagram received while awaiting a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
  /// It's our reply
  Accept,
  /// It's our reply, sent separately as a CON which we must ACK
  AcceptAndAck(Id),
  /// Not our reply (yet); keep waiting
  Wait,
  /// The peer reset our request
  Reset,
  /// Couldn't be parsed
  Malformed(MessageParseError),
}

/// Single-exchange CoAP client runtime.
///
/// `Core` owns a [`Transport`] and drives one request/response exchange at a
/// time without ever blocking: [`Core::send`] encodes and sends a request,
/// and [`Core::poll_resp`] checks for its reply, yielding
/// [`nb::Error::WouldBlock`] until one arrives.
///
/// See [`crate::blocking::Client`] for a client that waits for replies.
///
/// There is no retransmission; if a request or its reply is lost the
/// exchange times out (or polls forever) and it's up to the caller to
/// send the request again.
#[derive(Debug)]
pub struct Core<T> {
  transport: T,
  config: Config,
  provision: Provision,
  state: State,
  exchange: Option<Exchange>,
  buf: [u8; MAX_DGRAM_LEN + 1],
}

impl<T: Transport> Core<T> {
  /// Creates a new Core with the default runtime behavior
  pub fn new(transport: T) -> Self {
    Self::new_config(Config::default(), transport)
  }

  /// Create a new core with custom runtime behavior
  pub fn new_config(config: Config, transport: T) -> Self {
    Self { provision: Provision::new(&config),
           config,
           transport,
           state: State::Idle,
           exchange: None,
           buf: [0; MAX_DGRAM_LEN + 1] }
  }

  /// Get the runtime config
  pub fn config(&self) -> Config {
    self.config
  }

  /// Get the state of the current (or last) exchange
  pub fn state(&self) -> State {
    self.state
  }

  /// Borrow the transport
  pub fn transport(&self) -> &T {
    &self.transport
  }

  /// Mutably borrow the transport
  pub fn transport_mut(&mut self) -> &mut T {
    &mut self.transport
  }

  /// Consume the core, yielding the transport
  pub fn into_transport(self) -> T {
    self.transport
  }

  /// Close the transport
  pub fn close(&mut self) -> Result<(), Error<T::Error>> {
    self.transport
        .close()
        .map_err(|e| When::Closing.what(What::Transport(e)))
  }

  /// Send a request, starting a new exchange.
  ///
  /// Yields the id and token that the request was sent with.
  ///
  /// Any exchange still awaiting a reply is abandoned.
  pub fn send(&mut self, req: &Req<'_>) -> Result<(Id, Token), Error<T::Error>> {
    if let (State::AwaitingReply, Some(prev)) = (self.state, self.exchange) {
      log::warn!(target: "croak", "abandoning exchange {:?} that never got a reply", prev.id);
    }

    let id = self.provision.next_id();
    let token = match req.token() {
      | Some(token) => token,
      | None => self.provision.next_token(),
    };
    let when = When::Sending(id, token);

    self.exchange = Some(Exchange { id, token });
    self.state = State::Sending;

    let n = match req.encode_into(id, token, &mut self.buf[..MAX_DGRAM_LEN]) {
      | Ok(n) => n,
      | Err(e) => return Err(self.fail(State::Failed, when, What::ToBytes(e))),
    };

    log::debug!(target: "croak", "--> {} {:?}", req.summary(), id);
    log::trace!(target: "croak", "request:\n{}", Hex(&self.buf[..n]));

    if let Err(e) = self.transport.send(&self.buf[..n]) {
      return Err(self.fail(State::Failed, when, What::Transport(e)));
    }

    self.state = State::AwaitingReply;
    Ok((id, token))
  }

  /// Check for the reply to the request last [`send`](Core::send)-ed, without blocking.
  ///
  /// Yields [`nb::Error::WouldBlock`] while no reply has arrived. Datagrams
  /// that aren't our reply (mismatched tokens, stray empty messages, the
  /// empty ACK preceding a separate response) are dropped and also yield
  /// `WouldBlock`.
  pub fn poll_resp(&mut self) -> nb::Result<Resp<'_>, Error<T::Error>> {
    let n = self.recv_reply(None)?;
    self.reply(n).map_err(nb::Error::Other)
  }

  /// Like [`Core::poll_resp`], but first waits up to `timeout` for a datagram
  /// to arrive, failing the exchange with [`What::TimedOut`] if none does.
  ///
  /// Yields the length of the reply in the receive buffer; use [`Core::reply`]
  /// to parse it.
  pub(crate) fn wait_reply(&mut self, timeout: Timeout) -> nb::Result<usize, Error<T::Error>> {
    self.recv_reply(Some(timeout))
  }

  /// Parse the reply that [`Core::wait_reply`] accepted
  pub(crate) fn reply(&self, n: usize) -> Result<Resp<'_>, Error<T::Error>> {
    Message::try_from_bytes(&self.buf[..n]).map(Resp::from)
                                           .map_err(|e| self.when_polling().what(What::FromBytes(e)))
  }

  fn when_polling(&self) -> When {
    self.exchange
        .map(|Exchange { id, token }| When::Polling(id, token))
        .unwrap_or(When::Idle)
  }

  fn fail(&mut self, state: State, when: When, what: What<T::Error>) -> Error<T::Error> {
    log::debug!(target: "croak", "exchange failed: {:?}", what);
    self.state = state;
    when.what(what)
  }

  fn recv_reply(&mut self, wait: Option<Timeout>) -> nb::Result<usize, Error<T::Error>> {
    let exchange = match (self.state, self.exchange) {
      | (State::AwaitingReply, Some(exchange)) => exchange,
      | _ => return Err(nb::Error::Other(When::Idle.what(What::NoRequestInFlight))),
    };
    let when = self.when_polling();

    if let Some(timeout) = wait {
      match self.transport.poll(timeout) {
        | Ok(Readiness::Ready) => (),
        | Ok(Readiness::TimedOut) => {
          return Err(nb::Error::Other(self.fail(State::TimedOut, when, What::TimedOut)))
        },
        | Err(e) => return Err(nb::Error::Other(self.fail(State::Failed, when, What::Transport(e)))),
      }
    }

    let n = match self.transport.recv(&mut self.buf) {
      | Ok(0) => {
        return Err(nb::Error::Other(self.fail(State::Failed, when, What::ConnectionClosed)))
      },
      | Ok(n) if n > MAX_DGRAM_LEN => {
        log::warn!(target: "croak", "reply longer than {} bytes, failing exchange", MAX_DGRAM_LEN);
        return Err(nb::Error::Other(self.fail(State::Failed, when, What::ReplyTooLarge)));
      },
      | Ok(n) => n,
      | Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
      | Err(nb::Error::Other(e)) => {
        return Err(nb::Error::Other(self.fail(State::Failed, when, What::Transport(e))))
      },
    };

    log::trace!(target: "croak", "response:\n{}", Hex(&self.buf[..n]));

    let verdict = match Message::try_from_bytes(&self.buf[..n]) {
      | Ok(msg) => {
        log::debug!(target: "croak", "<-- {} {:?}", Summary::from(&msg), msg.id);
        classify(&exchange, &msg, self.config.match_token)
      },
      | Err(e) => Verdict::Malformed(e),
    };

    match verdict {
      | Verdict::Accept => {
        self.state = State::Completed;
        Ok(n)
      },
      | Verdict::AcceptAndAck(id) => {
        let mut ack = [0u8; 4];
        let ack_len = Message::new(Type::Ack, Code::EMPTY, id, Token::default())
          .encode_into(&mut ack)
          .map_err(|e| nb::Error::Other(self.fail(State::Failed, when, What::ToBytes(e))))?;

        log::trace!(target: "croak", "acking separate response {:?}", id);
        self.transport
            .send(&ack[..ack_len])
            .map_err(|e| nb::Error::Other(self.fail(State::Failed, when, What::Transport(e))))?;

        self.state = State::Completed;
        Ok(n)
      },
      | Verdict::Wait => Err(nb::Error::WouldBlock),
      | Verdict::Reset => Err(nb::Error::Other(self.fail(State::Failed, when, What::Reset))),
      | Verdict::Malformed(e) => {
        log::warn!(target: "croak", "received malformed reply: {}", e);
        Err(nb::Error::Other(self.fail(State::Failed, when, What::FromBytes(e))))
      },
    }
  }
}

fn classify(exchange: &Exchange, msg: &Message<'_>, match_token: bool) -> Verdict {
  match (msg.ty, msg.code.kind()) {
    | (Type::Reset, _) if msg.id == exchange.id => Verdict::Reset,
    | (Type::Ack, CodeKind::Empty) if msg.id == exchange.id => {
      log::debug!(target: "croak", "{:?} was ACKed, awaiting separate response", msg.id);
      Verdict::Wait
    },
    | (_, CodeKind::Response) if match_token && msg.token != exchange.token => {
      log::warn!(target: "croak",
                 "dropping response {:?}: token {:?} does not match request token {:?}",
                 msg.id,
                 msg.token,
                 exchange.token);
      Verdict::Wait
    },
    | (Type::Con, CodeKind::Response) => Verdict::AcceptAndAck(msg.id),
    | (_, CodeKind::Response) => Verdict::Accept,
    | (ty, kind) => {
      log::warn!(target: "croak", "dropping unexpected {:?} {:?} message {:?}", ty, kind, msg.id);
      Verdict::Wait
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resp::code;
  use crate::test::{self, TransportMock};

  fn core() -> Core<TransportMock> {
    Core::new(TransportMock::new())
  }

  #[test]
  fn starts_idle() {
    let mut core = core();
    assert_eq!(core.state(), State::Idle);
    assert!(matches!(core.poll_resp(),
                     Err(nb::Error::Other(Error { what: What::NoRequestInFlight,
                                                  .. }))));
    assert_eq!(core.state(), State::Idle);
  }

  #[test]
  fn send_then_piggybacked_reply() {
    let mut core = core();
    let (id, token) = core.send(&Req::post("a1r/d1/int", b"1001")).unwrap();
    assert_eq!(core.state(), State::AwaitingReply);

    let sent = core.transport_mut().tx.remove(0);
    let sent = Message::try_from_bytes(&sent).unwrap();
    assert_eq!((sent.id, sent.token, sent.ty), (id, token, Type::Con));
    assert_eq!(sent.payload.0, b"1001");

    assert!(matches!(core.poll_resp(), Err(nb::Error::WouldBlock)));
    assert_eq!(core.state(), State::AwaitingReply);

    core.transport_mut()
        .rx
        .push_back(test::reply(Type::Ack, code::CONTENT, id, token, b""));

    let resp = core.poll_resp().unwrap();
    assert_eq!(resp.code(), code::CONTENT);
    assert_eq!(resp.payload(), b"");
    assert_eq!(core.state(), State::Completed);
  }

  #[test]
  fn empty_ack_then_separate_response() {
    let mut core = core();
    let (id, token) = core.send(&Req::get("temp")).unwrap();
    core.transport_mut().tx.clear();

    core.transport_mut()
        .rx
        .push_back(test::reply(Type::Ack, Code::EMPTY, id, Token::default(), b""));
    assert!(matches!(core.poll_resp(), Err(nb::Error::WouldBlock)));
    assert_eq!(core.state(), State::AwaitingReply);

    core.transport_mut()
        .rx
        .push_back(test::reply(Type::Con, code::CONTENT, Id(999), token, b"21.5"));
    assert_eq!(core.poll_resp().unwrap().payload_str(), Ok("21.5"));
    assert_eq!(core.state(), State::Completed);

    let ack = core.transport_mut().tx.remove(0);
    let ack = Message::try_from_bytes(&ack).unwrap();
    assert_eq!((ack.ty, ack.code, ack.id), (Type::Ack, Code::EMPTY, Id(999)));
    assert!(ack.token.is_empty());
  }

  #[test]
  fn mismatched_token_is_dropped() {
    let mut core = core();
    let (id, token) = core.send(&Req::get("temp")).unwrap();

    core.transport_mut()
        .rx
        .push_back(test::reply(Type::Ack, code::CONTENT, id, Token::opaque(b"other"), b"x"));
    assert!(matches!(core.poll_resp(), Err(nb::Error::WouldBlock)));
    assert_eq!(core.state(), State::AwaitingReply);

    core.transport_mut()
        .rx
        .push_back(test::reply(Type::Ack, code::CONTENT, id, token, b"y"));
    assert_eq!(core.poll_resp().unwrap().payload(), b"y");
  }

  #[test]
  fn mismatched_token_accepted_when_not_matching() {
    let config = Config { match_token: false,
                          ..Default::default() };
    let mut core = Core::new_config(config, TransportMock::new());
    let (id, _) = core.send(&Req::get("temp")).unwrap();

    core.transport_mut()
        .rx
        .push_back(test::reply(Type::Ack, code::CONTENT, id, Token::opaque(b"other"), b"x"));
    assert_eq!(core.poll_resp().unwrap().payload(), b"x");
  }

  #[test]
  fn caller_token_is_used() {
    let mut core = core();
    let mut req = Req::get("temp");
    req.set_token(Token::opaque(b"mine"));

    let (_, token) = core.send(&req).unwrap();
    assert_eq!(token, Token::opaque(b"mine"));
  }

  #[test]
  fn ids_advance_and_tokens_differ() {
    let mut core = core();
    let (id_a, token_a) = core.send(&Req::get("a")).unwrap();
    let (id_b, token_b) = core.send(&Req::get("a")).unwrap();
    assert_eq!(id_b, id_a.next());
    assert_ne!(token_a, token_b);
  }

  #[test]
  fn reset() {
    let mut core = core();
    let (id, _) = core.send(&Req::get("a")).unwrap();
    core.transport_mut()
        .rx
        .push_back(test::reply(Type::Reset, Code::EMPTY, id, Token::default(), b""));

    assert!(matches!(core.poll_resp(),
                     Err(nb::Error::Other(Error { what: What::Reset,
                                                  when: When::Polling(_, _) }))));
    assert_eq!(core.state(), State::Failed);
  }

  #[test]
  fn zero_bytes_is_connection_closed() {
    let mut core = core();
    core.send(&Req::get("a")).unwrap();
    core.transport_mut().rx.push_back(vec![]);

    assert!(matches!(core.poll_resp(),
                     Err(nb::Error::Other(Error { what: What::ConnectionClosed,
                                                  .. }))));
    assert_eq!(core.state(), State::Failed);
  }

  #[test]
  fn garbage_is_decode_error() {
    let mut core = core();
    core.send(&Req::get("a")).unwrap();
    core.transport_mut().rx.push_back(vec![0b1000_0000, 0, 0, 0]);

    assert!(matches!(core.poll_resp(),
                     Err(nb::Error::Other(Error { what:
                                                    What::FromBytes(MessageParseError::UnsupportedVersion(2)),
                                                  .. }))));
    assert_eq!(core.state(), State::Failed);
  }

  #[test]
  fn oversized_reply_fails() {
    let mut core = core();
    let (id, token) = core.send(&Req::get("big")).unwrap();

    let payload = [7u8; 400];
    core.transport_mut()
        .rx
        .push_back(test::reply(Type::Ack, code::CONTENT, id, token, &payload));

    assert!(matches!(core.poll_resp(),
                     Err(nb::Error::Other(Error { what: What::ReplyTooLarge,
                                                  when: When::Polling(_, _) }))));
    assert_eq!(core.state(), State::Failed);
  }

  #[test]
  fn reply_of_max_len_accepted() {
    let mut core = core();
    let (id, token) = core.send(&Req::get("big")).unwrap();

    // header + token + marker
    let payload = [7u8; MAX_DGRAM_LEN - 4 - 8 - 1];
    let reply = test::reply(Type::Ack, code::CONTENT, id, token, &payload);
    assert_eq!(reply.len(), MAX_DGRAM_LEN);
    core.transport_mut().rx.push_back(reply);

    assert_eq!(core.poll_resp().unwrap().payload(), &payload[..]);
    assert_eq!(core.state(), State::Completed);
  }

  #[test]
  fn send_failure() {
    let mut core = core();
    core.transport_mut().fail_send = true;

    assert!(matches!(core.send(&Req::get("a")),
                     Err(Error { what: What::Transport(test::MockError),
                                 when: When::Sending(_, _) })));
    assert_eq!(core.state(), State::Failed);
  }

  #[test]
  fn encode_failure() {
    let mut core = core();
    let payload = [0u8; MAX_DGRAM_LEN];

    assert!(matches!(core.send(&Req::post("a", &payload)),
                     Err(Error { what: What::ToBytes(_),
                                 .. })));
    assert_eq!(core.state(), State::Failed);
    assert!(core.transport().tx.is_empty());
  }

  #[test]
  fn wait_times_out() {
    let mut core = core();
    core.send(&Req::get("a")).unwrap();

    assert!(matches!(core.wait_reply(Timeout::Millis(10)),
                     Err(nb::Error::Other(Error { what: What::TimedOut,
                                                  .. }))));
    assert_eq!(core.state(), State::TimedOut);
    assert!(core.state().is_terminal());
  }

  #[test]
  fn dropped_datagrams_restart_the_wait() {
    let mut core = core();
    let (id, token) = core.send(&Req::get("a")).unwrap();

    let other = Token::opaque(b"other");
    core.transport_mut().rx.extend([
      test::reply(Type::Ack, Code::EMPTY, id, Token::default(), b""),
      test::reply(Type::Con, code::CONTENT, Id(5), other, b"x"),
      test::reply(Type::Con, code::CONTENT, Id(6), other, b"y"),
      test::reply(Type::Con, code::CONTENT, Id(7), token, b"z"),
    ]);

    let mut waits = 0;
    let n = nb::block!({
              waits += 1;
              core.wait_reply(Timeout::Millis(10))
            }).unwrap();

    assert_eq!(waits, 4);
    assert_eq!(core.reply(n).unwrap().payload(), b"z");
    assert_eq!(core.state(), State::Completed);
  }

  #[test]
  fn close() {
    let mut core = core();
    core.close().unwrap();
    assert!(core.transport().closed);
  }
}
