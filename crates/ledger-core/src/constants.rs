use crate::Hash;

pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// A proof is valid when the hex digest ends in this many `0` characters.
pub const POW_TRAILING_ZERO_NIBBLES: u32 = 4;
/// Nonces handed to the thread pool per round of the proof search.
pub const NONCE_SEARCH_BATCH: u64 = 1 << 14;

pub const GENESIS_INDEX: u64 = 0;
pub const GENESIS_PROOF: u64 = 1;
pub const GENESIS_PREVIOUS_HASH: Hash = [0u8; HASH_SIZE];

/// Source id for coins created out of thin air (issuance, mining rewards).
pub const MINT_SOURCE: &str = "0";
pub const GENESIS_WALLET: &str = "genesis";
pub const MINING_REWARD: u64 = 100_000;
pub const INITIAL_AMOUNT: u64 = (1 << 20) * 1_000_000_000;
