use croak_msg::{Id, Token};
use rand::{Rng, SeedableRng};

use crate::config::Config;

/// Hands out message ids and tokens for outbound requests.
///
/// Ids count up (wrapping) from a random starting point chosen
/// with [`Msg::id_seed`](crate::config::Msg::id_seed).
///
/// Tokens are opaque hashes of [`Msg::token_seed`](crate::config::Msg::token_seed)
/// and a counter, so they never repeat for the life of the client.
#[derive(Debug, Clone)]
pub(crate) struct Provision {
  next_id: Id,
  token_seed: u16,
  tokens_issued: u64,
}

impl Provision {
  pub(crate) fn new(config: &Config) -> Self {
    let mut rand = rand_chacha::ChaCha8Rng::seed_from_u64(config.msg.id_seed);

    Self { next_id: Id(rand.gen()),
           token_seed: config.msg.token_seed,
           tokens_issued: 0 }
  }

  pub(crate) fn next_id(&mut self) -> Id {
    let id = self.next_id;
    self.next_id = id.next();
    id
  }

  pub(crate) fn next_token(&mut self) -> Token {
    #[allow(clippy::many_single_char_names)]
    let bytes = {
      let ([a, b], [c, d, e, f, g, h, i, j]) =
        (self.token_seed.to_be_bytes(), self.tokens_issued.to_be_bytes());
      [a, b, c, d, e, f, g, h, i, j]
    };

    self.tokens_issued = self.tokens_issued.wrapping_add(1);
    Token::opaque(&bytes)
  }
}
