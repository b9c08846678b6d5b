//! Append-only ledger secured by proof-of-work, with a toy currency on top.
//!
//! [`Ledger`] owns the chain of immutable [`Block`]s and the pending-transaction
//! buffer. Blocks verify themselves against their immediate predecessor, so
//! [`Ledger::invalid_blocks`] pinpoints tampering locally. [`Currency`] consumes the
//! ledger's read/append surface to keep wallet balances.

pub mod block;
pub mod constants;
pub mod currency;
pub mod error;
pub mod ledger;
pub mod mine;
pub mod pow;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use block::{Block, BlockFactory, BlockForger, StandardBlockFactory};
pub use currency::{Currency, CurrencyConfig};
pub use error::{BlockError, CurrencyError};
pub use ledger::Ledger;
pub use pow::{ProofOfWork, SuffixProofOfWork, TrivialProofOfWork};

pub type Hash = [u8; 32];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: u64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

pub fn sha256(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}
