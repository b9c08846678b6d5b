use crate::constants::{GENESIS_INDEX, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::BlockError;
use crate::pow::ProofOfWork;
use crate::{sha256, Hash, Transaction};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// An immutable, hash-addressed unit of the chain.
///
/// `previous` is a read-only handle used to recompute validity; the ledger's block
/// sequence owns block lifetimes. Predecessors never point forward, so no cycles.
#[derive(Clone)]
pub struct Block {
    pow: Arc<dyn ProofOfWork>,
    previous: Option<Arc<Block>>,
    index: u64,
    timestamp: u64,
    payload: Vec<u8>,
    payload_hash: Hash,
    proof: u64,
    previous_hash: Hash,
}

impl Block {
    /// Builds a genesis block when `previous` is `None`, otherwise the successor of
    /// `previous`, running the proof search against its `(proof, block_hash)`.
    pub fn new(
        pow: Arc<dyn ProofOfWork>,
        transactions: &[Transaction],
        previous: Option<Arc<Block>>,
    ) -> Self {
        let payload = encode_payload(transactions);
        let payload_hash = sha256(&payload);

        let (index, previous_hash, proof) = match &previous {
            Some(prev) => {
                let previous_hash = prev.block_hash();
                let proof = pow.find(prev.proof, &previous_hash);
                (prev.index + 1, previous_hash, proof)
            }
            None => (GENESIS_INDEX, GENESIS_PREVIOUS_HASH, GENESIS_PROOF),
        };

        let block = Self {
            pow,
            previous,
            index,
            timestamp: now_nanos(),
            payload,
            payload_hash,
            proof,
            previous_hash,
        };
        debug!(
            index = block.index,
            proof = block.proof,
            txs = transactions.len(),
            "created block"
        );
        block
    }

    pub fn genesis(pow: Arc<dyn ProofOfWork>, transactions: &[Transaction]) -> Self {
        Self::new(pow, transactions, None)
    }

    /// The next block in sequence, sharing this block's proof-of-work strategy.
    pub fn create_next(self: &Arc<Self>, transactions: &[Transaction]) -> Self {
        Self::new(self.pow.clone(), transactions, Some(self.clone()))
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_hash(&self) -> &Hash {
        &self.payload_hash
    }

    pub fn proof(&self) -> u64 {
        self.proof
    }

    pub fn previous_hash(&self) -> &Hash {
        &self.previous_hash
    }

    pub fn previous_block(&self) -> Option<&Arc<Block>> {
        self.previous.as_ref()
    }

    pub fn pow_strategy(&self) -> &Arc<dyn ProofOfWork> {
        &self.pow
    }

    pub fn is_genesis(&self) -> bool {
        self.previous.is_none()
    }

    /// Decodes the payload. Pure; every call re-reads the stored bytes.
    pub fn transactions(&self) -> Result<Vec<Transaction>, BlockError> {
        serde_json::from_slice(&self.payload).map_err(|e| BlockError::MalformedPayload {
            index: self.index,
            reason: e.to_string(),
        })
    }

    /// Digest a successor binds to as its `previous_hash`.
    pub fn block_hash(&self) -> Hash {
        sha256(&self.hash_bytes())
    }

    pub fn hash_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + 8 + 8 + self.payload.len() + 32 + 8 + 32);
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&(self.payload.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes.extend_from_slice(&self.payload_hash);
        bytes.extend_from_slice(&self.proof.to_le_bytes());
        bytes.extend_from_slice(&self.previous_hash);
        bytes
    }

    pub fn has_valid_payload(&self) -> bool {
        self.payload_hash == sha256(&self.payload)
    }

    /// A block without a predecessor must carry the genesis index, previous hash and proof.
    pub fn has_genesis_sentinels(&self) -> bool {
        match &self.previous {
            Some(_) => true,
            None => {
                self.index == GENESIS_INDEX
                    && self.previous_hash == GENESIS_PREVIOUS_HASH
                    && self.proof == GENESIS_PROOF
            }
        }
    }

    pub fn follows_previous_index(&self) -> bool {
        match &self.previous {
            Some(prev) => prev.index.checked_add(1) == Some(self.index),
            None => true,
        }
    }

    pub fn previous_hash_valid(&self) -> bool {
        match &self.previous {
            Some(prev) => self.previous_hash == prev.block_hash(),
            None => true,
        }
    }

    pub fn has_valid_proof(&self) -> bool {
        match &self.previous {
            Some(prev) => self.pow.valid(prev.proof, &self.previous_hash, self.proof),
            None => true,
        }
    }

    /// Reports the first failing check: payload, genesis sentinels, index, linkage, then proof.
    pub fn validate(&self) -> Result<(), BlockError> {
        let index = self.index;
        if !self.has_valid_payload() {
            return Err(BlockError::CorruptedPayload { index });
        }
        if !self.has_genesis_sentinels() {
            return Err(BlockError::InvalidGenesis { index });
        }
        if let Some(prev) = &self.previous {
            if !self.follows_previous_index() {
                return Err(BlockError::OutOfSequence {
                    index,
                    previous: prev.index,
                });
            }
        }
        if !self.previous_hash_valid() {
            return Err(BlockError::BrokenLinkage { index });
        }
        if !self.has_valid_proof() {
            return Err(BlockError::InvalidProof { index });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Starts a deliberately inconsistent copy of this block. `self` is left untouched.
    pub fn forge(&self) -> BlockForger {
        BlockForger {
            block: self.clone(),
        }
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // Unlink predecessors we hold the last handle to one at a time, so dropping the
        // tail of a long chain never recurses through every `previous`.
        let mut previous = self.previous.take();
        while let Some(block) = previous {
            match Arc::try_unwrap(block) {
                Ok(mut block) => previous = block.previous.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("index", &self.index)
            .field("previous_hash", &hex::encode(self.previous_hash))
            .field("proof", &self.proof)
            .field("payload_bytes", &self.payload.len())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Builds tampered blocks for tamper-detection tests and diagnostics.
///
/// Each step produces fields a correctly constructed block would never have; nothing
/// here is reachable from the ledger's append path.
pub struct BlockForger {
    block: Block,
}

impl BlockForger {
    /// Swaps the payload but keeps the stored `payload_hash`.
    pub fn transactions(mut self, transactions: &[Transaction]) -> Self {
        self.block.payload = encode_payload(transactions);
        self
    }

    pub fn raw_payload(mut self, payload: Vec<u8>) -> Self {
        self.block.payload = payload;
        self
    }

    pub fn rehash_payload(mut self) -> Self {
        self.block.payload_hash = sha256(&self.block.payload);
        self
    }

    pub fn proof(mut self, proof: u64) -> Self {
        self.block.proof = proof;
        self
    }

    /// Re-runs the proof search against the current predecessor and `previous_hash`.
    pub fn reprove(mut self) -> Self {
        if let Some(prev) = &self.block.previous {
            self.block.proof = self.block.pow.find(prev.proof, &self.block.previous_hash);
        }
        self
    }

    /// Points the navigation handle elsewhere without touching `previous_hash`.
    pub fn previous(mut self, previous: Arc<Block>) -> Self {
        self.block.previous = Some(previous);
        self
    }

    pub fn relink(mut self) -> Self {
        if let Some(prev) = &self.block.previous {
            self.block.previous_hash = prev.block_hash();
        }
        self
    }

    pub fn index(mut self, index: u64) -> Self {
        self.block.index = index;
        self
    }

    pub fn build(self) -> Block {
        self.block
    }
}

/// Hands out blocks to a ledger, so the ledger never names a concrete construction path.
pub trait BlockFactory: Send + Sync {
    fn genesis(&self, pow: Arc<dyn ProofOfWork>, transactions: &[Transaction]) -> Block;

    fn next(&self, previous: &Arc<Block>, transactions: &[Transaction]) -> Block;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StandardBlockFactory;

impl BlockFactory for StandardBlockFactory {
    fn genesis(&self, pow: Arc<dyn ProofOfWork>, transactions: &[Transaction]) -> Block {
        Block::genesis(pow, transactions)
    }

    fn next(&self, previous: &Arc<Block>, transactions: &[Transaction]) -> Block {
        previous.create_next(transactions)
    }
}

fn encode_payload(transactions: &[Transaction]) -> Vec<u8> {
    serde_json::to_vec(transactions).expect("transactions always serialize to JSON")
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
