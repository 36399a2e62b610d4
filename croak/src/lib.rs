//! `croak` is a small CoAP client: it sends one confirmable request at a time
//! to a single peer and waits for the matching response.
//!
//! ## CoAP
//! CoAP ([RFC 7252](https://datatracker.ietf.org/doc/html/rfc7252)) copies the
//! request/response semantics of HTTP to constrained devices. Requests have a
//! method (GET, POST, PUT, DELETE), a path made of `Uri-Path` options and an optional
//! payload. Responses carry a status code like `2.05 Content` or `4.04 Not Found`.
//!
//! CoAP customarily runs over UDP, optionally secured with DTLS.
//!
//! ## Layers
//! - [`croak_msg`](msg) encodes and decodes the wire format.
//! - [`net::Transport`] is anything that can send & receive whole datagrams.
//!   With the `std` feature, [`std::UdpTransport`] and [`std::DtlsTransport`] are provided.
//! - [`core::Core`] drives a single exchange without blocking.
//! - [`blocking::Client`] wraps it in a send-and-wait-for-the-reply call.
//!
//! ```no_run
//! use croak::blocking::Client;
//! use croak::net::COAP_PORT;
//! use croak::req::Req;
//! use croak::std::UdpTransport;
//!
//! let transport = UdpTransport::connect(("192.0.2.1", COAP_PORT)).unwrap();
//! let mut client = Client::new(transport);
//!
//! let resp = client.exchange(&Req::post("a1r/d1/int", b"1001")).unwrap();
//! println!("{} {:?}", resp.code(), resp.payload_str());
//! ```

#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(missing_copy_implementations)]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// warnings
#![cfg_attr(not(test), warn(unreachable_pub))]
// -
// features
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc as std_alloc;


pub(crate) mod logging;

/// Blocking request/response client
pub mod blocking;

/// responses
pub mod resp;

/// requests
pub mod req;

/// low-level, non-blocking exchange state machine
pub mod core;

/// network abstractions
pub mod net;

/// time abstractions
pub mod time;

/// configuring runtime behavior
pub mod config;

/// `std`-only transports
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod std;

/// The CoAP message codec
#[doc(inline)]
pub use croak_msg as msg;

macro_rules! code {
  (rfc7252($section:literal) $name:ident = $c:literal.$d:literal) => {
    #[doc = toad_macros::rfc_7252_doc!($section)]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: croak_msg::Code = croak_msg::Code::new($c, $d);
  };
  (rfc7252($section:literal) $name:ident = $newtype:tt($c:literal.$d:literal)) => {
    #[doc = toad_macros::rfc_7252_doc!($section)]
    #[allow(clippy::zero_prefixed_literal)]
    pub const $name: $newtype = $newtype(croak_msg::Code::new($c, $d));
  };
}

pub(crate) use code;
