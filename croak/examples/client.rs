//! Post a reading to a CoAP server three times, over DTLS when a
//! pre-shared key is configured and plain UDP otherwise.
//!
//! ```text
//! COAP_PEER=192.0.2.1 \
//! COAP_PSK_ID=r17_53150200 COAP_PSK=0N6iDGgu/kF4xoeg \
//!   cargo run --example client
//! ```
//!
//! | variable        | default                         |
//! | --------------- | ------------------------------- |
//! | `COAP_PEER`     | `127.0.0.1`                     |
//! | `COAP_PORT`     | 5684 with a PSK, 5683 without   |
//! | `COAP_PSK_ID`   | (none)                          |
//! | `COAP_PSK`      | (none; plain UDP)               |
//! | `COAP_HOSTNAME` | `COAP_PEER`                     |
//!
//! Pass `-v` to log every datagram as a hexdump.

use std::env;
use std::thread;
use std::time::Duration;

use croak::blocking::Client;
use croak::net::{Transport, COAPS_PORT, COAP_PORT};
use croak::req::Req;
use croak::std::{DtlsConfig, DtlsTransport, Psk, UdpTransport};

const PATH: &str = "a1r/d1/int";
const PAYLOAD: &[u8] = b"1001";
const ITERATIONS: usize = 3;

fn run<T: Transport>(mut client: Client<T>) {
  for i in 0..ITERATIONS {
    log::info!("[{}] CON POST /{}", i, PATH);

    match client.exchange(&Req::post(PATH, PAYLOAD)) {
      | Ok(rep) => log::info!("[{}] ok! {} {:?}", i, rep.code(), rep.payload_str()),
      | Err(e) => log::error!("[{}] {}", i, e),
    }

    if i + 1 < ITERATIONS {
      thread::sleep(Duration::from_secs(3));
    }
  }

  if let Err(e) = client.close() {
    log::error!("{}", e);
  }
}

fn main() {
  let level = match env::args().any(|a| a == "-v") {
    | true => log::Level::Trace,
    | false => log::Level::Info,
  };
  simple_logger::init_with_level(level).unwrap();

  let peer = env::var("COAP_PEER").unwrap_or_else(|_| "127.0.0.1".into());
  let port = |default: u16| {
    env::var("COAP_PORT").ok()
                         .and_then(|p| p.parse().ok())
                         .unwrap_or(default)
  };

  match (env::var("COAP_PSK_ID"), env::var("COAP_PSK")) {
    | (Ok(identity), Ok(key)) => {
      let hostname = env::var("COAP_HOSTNAME").unwrap_or_else(|_| peer.clone());
      let psk = Psk { identity: identity.into_bytes(),
                      key: key.into_bytes() };

      let transport =
        DtlsTransport::connect((peer.as_str(), port(COAPS_PORT)), &DtlsConfig::new(psk, hostname)).unwrap();
      run(Client::new(transport));
    },
    | _ => {
      let transport = UdpTransport::connect((peer.as_str(), port(COAP_PORT))).unwrap();
      run(Client::new(transport));
    },
  }
}
