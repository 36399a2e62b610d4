use coap_lite::{CoapOption, MessageClass, MessageType, Packet, RequestType, ResponseType};
use croak_msg::*;

const TOKEN: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

fn post_a1r_d1() -> Vec<u8> {
  let mut buf = [0u8; 64];
  let mut enc = Encoder::new(&mut buf, Type::Con, Code::new(0, 2), Id(0x1234), &TOKEN).unwrap();
  enc.opt(OptNumber::URI_PATH, b"a1r").unwrap();
  enc.opt(OptNumber::URI_PATH, b"d1").unwrap();
  let n = enc.payload(b"1001").unwrap();
  buf[..n].to_vec()
}

#[test]
fn coap_lite_reads_our_request() {
  let bytes = post_a1r_d1();
  let packet = Packet::from_bytes(&bytes).unwrap();

  assert_eq!(packet.header.get_version(), 1);
  assert!(matches!(packet.header.get_type(), MessageType::Confirmable));
  assert!(matches!(packet.header.code, MessageClass::Request(RequestType::Post)));
  assert_eq!(packet.header.message_id, 0x1234);
  assert_eq!(packet.get_token().to_vec(), TOKEN.to_vec());

  let path = packet.get_option(CoapOption::UriPath)
                   .unwrap()
                   .iter()
                   .cloned()
                   .collect::<Vec<_>>();
  assert_eq!(path, vec![b"a1r".to_vec(), b"d1".to_vec()]);
  assert_eq!(packet.payload, b"1001".to_vec());
}

#[test]
fn we_read_coap_lite_response() {
  let mut packet = Packet::new();
  packet.header.set_type(MessageType::Acknowledgement);
  packet.header.code = MessageClass::Response(ResponseType::Changed);
  packet.header.message_id = 0x1234;
  packet.set_token(TOKEN.to_vec());
  packet.add_option(CoapOption::ContentFormat, vec![0]);
  packet.payload = b"ok".to_vec();
  let bytes = packet.to_bytes().unwrap();

  let msg = Message::try_from_bytes(&bytes).unwrap();
  assert_eq!(msg.ty, Type::Ack);
  assert_eq!(msg.code, Code::new(2, 4));
  assert_eq!(msg.id, Id(0x1234));
  assert_eq!(msg.token.as_bytes(), &TOKEN);
  assert_eq!(msg.opts.get(OptNumber(12)).collect::<Vec<_>>(), vec![&[0u8][..]]);
  assert_eq!(msg.payload, Payload(b"ok"));
}

#[test]
fn roundtrip_is_byte_exact() {
  let bytes = post_a1r_d1();
  let msg = Message::try_from_bytes(&bytes).unwrap();

  assert_eq!(msg.size(), bytes.len());
  assert_eq!(msg.to_vec().unwrap(), bytes);
}

#[test]
fn truncated_prefixes() {
  let bytes = post_a1r_d1();

  // header (0..4) token (4..12) "a1r" (12..16) "d1" (16..19) marker (19) payload (20..24)
  let cut_inside_element = |len: usize| len < 12 || (13..16).contains(&len) || (17..19).contains(&len);

  for len in 0..bytes.len() {
    let result = Message::try_from_bytes(&bytes[..len]);

    if cut_inside_element(len) {
      assert_eq!(result, Err(MessageParseError::Truncated), "prefix of {} bytes", len);
    } else {
      let msg = result.unwrap();
      assert_eq!(msg.token.as_bytes(), &TOKEN);
      assert!(msg.payload.0.len() <= 4);
    }
  }
}
