use crate::constants::POW_TRAILING_ZERO_NIBBLES;
use crate::{mine, sha256, Hash};

/// Searches for and checks the nonce that links a block to its predecessor.
///
/// Implementations are stateless; blocks and the ledger only ever see this trait, so
/// tests can swap in a trivial strategy.
pub trait ProofOfWork: Send + Sync {
    /// Smallest non-negative proof for which [`ProofOfWork::valid`] holds.
    fn find(&self, last_proof: u64, last_hash: &Hash) -> u64;

    fn valid(&self, last_proof: u64, last_hash: &Hash, proof: u64) -> bool;
}

/// Requires the hex digest of `"{last_proof}:{last_hash}:{proof}"` to end in
/// [`POW_TRAILING_ZERO_NIBBLES`] zeros.
#[derive(Clone, Copy, Debug, Default)]
pub struct SuffixProofOfWork;

impl ProofOfWork for SuffixProofOfWork {
    fn find(&self, last_proof: u64, last_hash: &Hash) -> u64 {
        mine::first_valid_nonce(|proof| self.valid(last_proof, last_hash, proof))
    }

    fn valid(&self, last_proof: u64, last_hash: &Hash, proof: u64) -> bool {
        let digest = proof_digest(last_proof, last_hash, proof);
        count_trailing_zero_nibbles(&digest) >= POW_TRAILING_ZERO_NIBBLES
    }
}

/// Accepts every proof. Lets tests and benchmarks exercise chain shape without the search cost.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrivialProofOfWork;

impl ProofOfWork for TrivialProofOfWork {
    fn find(&self, _last_proof: u64, _last_hash: &Hash) -> u64 {
        0
    }

    fn valid(&self, _last_proof: u64, _last_hash: &Hash, _proof: u64) -> bool {
        true
    }
}

/// The string hashed when checking a proof. Colons keep `(1, h, 23)` and `(12, h, 3)` apart.
pub fn proof_input(last_proof: u64, last_hash: &Hash, proof: u64) -> String {
    format!("{}:{}:{}", last_proof, hex::encode(last_hash), proof)
}

pub fn proof_digest(last_proof: u64, last_hash: &Hash, proof: u64) -> Hash {
    sha256(proof_input(last_proof, last_hash, proof).as_bytes())
}

/// Number of trailing `0` characters in the lowercase hex form of `hash`.
pub fn count_trailing_zero_nibbles(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash.iter().rev() {
        if *b == 0 {
            total += 2;
        } else {
            if b & 0x0F == 0 {
                total += 1;
            }
            break;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat_hash(pattern: [u8; 4]) -> Hash {
        let mut h = [0u8; 32];
        for chunk in h.chunks_mut(4) {
            chunk.copy_from_slice(&pattern);
        }
        h
    }

    #[test]
    fn trailing_zero_nibbles_examples() {
        let mut h = [0u8; 32];
        assert_eq!(count_trailing_zero_nibbles(&h), 64);
        h[31] = 0xF0; // ...f0
        assert_eq!(count_trailing_zero_nibbles(&h), 1);
        h[31] = 0x0F; // ...0f
        assert_eq!(count_trailing_zero_nibbles(&h), 0);
        h = [0u8; 32];
        h[30] = 0x10; // ...1000
        assert_eq!(count_trailing_zero_nibbles(&h), 3);
        h[30] = 0x01; // ...0100
        assert_eq!(count_trailing_zero_nibbles(&h), 2);
    }

    #[test]
    fn proof_input_is_colon_separated() {
        let h = repeat_hash([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            proof_input(1121, &h, 7),
            format!("1121:{}:7", "deadbeef".repeat(8))
        );
        assert_ne!(proof_input(1, &h, 23), proof_input(12, &h, 3));
    }

    #[test]
    fn finds_known_proof() {
        let h = repeat_hash([0xde, 0xad, 0xbe, 0xef]);
        let proof = SuffixProofOfWork.find(1121, &h);
        assert_eq!(proof, 36105);
        assert_eq!(
            hex::encode(proof_digest(1121, &h, proof)),
            "9153bae55ff29881894c45ea939014858a9afcd034b5bc9986abcf907d0b0000"
        );
    }

    #[test]
    fn trivial_strategy_accepts_everything() {
        let h = repeat_hash([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(TrivialProofOfWork.find(1121, &h), 0);
        assert!(TrivialProofOfWork.valid(1121, &h, 36104));
        assert!(!SuffixProofOfWork.valid(1121, &h, 0));
    }

    #[test]
    fn finds_known_proof_for_zero_hash() {
        assert_eq!(SuffixProofOfWork.find(0, &[0u8; 32]), 9651);
    }

    #[test]
    fn knows_a_valid_proof_when_it_sees_one() {
        let h = repeat_hash([0xfa, 0xce, 0xde, 0xed]);
        assert!(SuffixProofOfWork.valid(8, &h, 38539));
        assert!(!SuffixProofOfWork.valid(8, &h, 38538));
        assert!(!SuffixProofOfWork.valid(9, &h, 38539));
    }

    #[test]
    fn found_proof_is_minimal() {
        let h = repeat_hash([0xde, 0xad, 0xbe, 0xef]);
        let proof = SuffixProofOfWork.find(1121, &h);
        assert!(SuffixProofOfWork.valid(1121, &h, proof));
        assert!((0..proof).all(|p| !SuffixProofOfWork.valid(1121, &h, p)));
    }

    #[test]
    fn find_is_deterministic() {
        let h = repeat_hash([1, 2, 3, 4]);
        assert_eq!(SuffixProofOfWork.find(42, &h), SuffixProofOfWork.find(42, &h));
    }
}
