use thiserror::Error;

/// Why a block failed validation. Detected on query, never raised on construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("corrupted payload in block {index} (hash mismatch)")]
    CorruptedPayload { index: u64 },

    #[error("block {index} has no predecessor but is not a genesis block")]
    InvalidGenesis { index: u64 },

    #[error("block {index} does not follow block {previous}")]
    OutOfSequence { index: u64, previous: u64 },

    #[error("hash mismatch in block {index}")]
    BrokenLinkage { index: u64 },

    #[error("invalid proof-of-work in block {index}")]
    InvalidProof { index: u64 },

    #[error("malformed payload in block {index}: {reason}")]
    MalformedPayload { index: u64, reason: String },
}

impl BlockError {
    pub fn index(&self) -> u64 {
        match self {
            BlockError::CorruptedPayload { index }
            | BlockError::InvalidGenesis { index }
            | BlockError::OutOfSequence { index, .. }
            | BlockError::BrokenLinkage { index }
            | BlockError::InvalidProof { index }
            | BlockError::MalformedPayload { index, .. } => *index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    #[error("no such wallet {0}")]
    NoSuchWallet(String),

    #[error("can't transfer to same wallet {0}")]
    SelfTransfer(String),

    #[error("wallet {wallet} doesn't contain enough to cover {amount}")]
    InsufficientFunds { wallet: String, amount: u64 },

    #[error(transparent)]
    Block(#[from] BlockError),
}
