use core::fmt;

use croak_msg::{Code, Message, Type};

/// One-line summary of a message for debug logs,
/// e.g. `Response: Ack 2.05 with 4 byte payload`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Summary {
  pub(crate) ty: Type,
  pub(crate) code: Code,
  pub(crate) payload_len: usize,
}

impl<'a> From<&Message<'a>> for Summary {
  fn from(msg: &Message<'a>) -> Self {
    Summary { ty: msg.ty,
              code: msg.code,
              payload_len: msg.payload.0.len() }
  }
}

impl fmt::Display for Summary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "{:?}: {:?} {} with {} byte payload",
           self.code.kind(),
           self.ty,
           self.code,
           self.payload_len)
  }
}

/// Hexdump of a datagram for trace logs, 16 bytes per line
#[derive(Debug, Clone, Copy)]
pub(crate) struct Hex<'a>(pub(crate) &'a [u8]);

impl<'a> fmt::Display for Hex<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (ix, line) in self.0.chunks(16).enumerate() {
      if ix > 0 {
        writeln!(f)?;
      }

      write!(f, "{:04x} ", ix * 16)?;
      for byte in line {
        write!(f, " {:02x}", byte)?;
      }
    }

    Ok(())
  }
}
