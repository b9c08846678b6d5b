use crate::block::{Block, BlockFactory, StandardBlockFactory};
use crate::error::BlockError;
use crate::pow::{ProofOfWork, SuffixProofOfWork};
use crate::Transaction;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Owner of the block sequence and the pending-transaction buffer.
///
/// Append-only: the chain starts with a genesis block and grows by one block per
/// [`Ledger::add_block`]. All mutation goes through `&mut self`, so a ledger shared
/// between threads needs a mutex around it.
pub struct Ledger<F = StandardBlockFactory> {
    pow: Arc<dyn ProofOfWork>,
    factory: F,
    blocks: Vec<Arc<Block>>,
    pending: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Arc::new(SuffixProofOfWork), StandardBlockFactory)
    }
}

impl<F: BlockFactory> Ledger<F> {
    pub fn new(pow: Arc<dyn ProofOfWork>, factory: F) -> Self {
        Self::with_genesis_transactions(pow, factory, Vec::new())
    }

    /// Starts a chain whose genesis block carries `transactions`.
    pub fn with_genesis_transactions(
        pow: Arc<dyn ProofOfWork>,
        factory: F,
        transactions: Vec<Transaction>,
    ) -> Self {
        let genesis = Arc::new(factory.genesis(pow.clone(), &transactions));
        info!(txs = transactions.len(), "ledger created with genesis block");
        Self {
            pow,
            factory,
            blocks: vec![genesis],
            pending: Vec::new(),
        }
    }

    pub fn pow_strategy(&self) -> &Arc<dyn ProofOfWork> {
        &self.pow
    }

    /// Buffers a transaction for the next block. No checks happen at this layer.
    pub fn add_transaction(&mut self, from: impl Into<String>, to: impl Into<String>, amount: u64) {
        let tx = Transaction::new(from, to, amount);
        debug!(
            n = self.pending.len() + 1,
            block = self.blocks.len(),
            from = %tx.from,
            to = %tx.to,
            amount = tx.amount,
            "adding transaction"
        );
        self.pending.push(tx);
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn add_block(&mut self) -> Arc<Block> {
        self.add_block_with(|_| {})
    }

    /// Runs `before_commit` (which may buffer more transactions, e.g. a mining reward),
    /// then seals the pending buffer into the next block and clears it.
    pub fn add_block_with<C>(&mut self, before_commit: C) -> Arc<Block>
    where
        C: FnOnce(&mut Self),
    {
        before_commit(self);

        let block = Arc::new(self.factory.next(self.last_block(), &self.pending));
        self.blocks.push(block.clone());
        self.pending.clear();

        info!(
            index = block.index(),
            proof = block.proof(),
            previous_hash = %hex::encode(block.previous_hash()),
            "added block"
        );
        block
    }

    pub fn last_block(&self) -> &Arc<Block> {
        self.blocks
            .last()
            .expect("ledger always holds a genesis block")
    }

    pub fn block(&self, index: u64) -> Option<&Arc<Block>> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// Genesis to tail. Borrowing, so it can be restarted at will.
    pub fn each_block(&self) -> std::slice::Iter<'_, Arc<Block>> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`: the genesis block is never removed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.blocks.iter().all(|block| block.is_valid())
    }

    /// Every block whose own checks fail. Each block is judged against its immediate
    /// predecessor only.
    pub fn invalid_blocks(&self) -> Vec<Arc<Block>> {
        self.blocks
            .iter()
            .filter(|block| match block.validate() {
                Ok(()) => false,
                Err(e) => {
                    error!(index = block.index(), "{e}");
                    true
                }
            })
            .cloned()
            .collect()
    }

    /// The failing check for each invalid block, in chain order.
    pub fn validation_errors(&self) -> Vec<BlockError> {
        self.blocks
            .iter()
            .filter_map(|block| block.validate().err())
            .inspect(|e| error!(index = e.index(), "{e}"))
            .collect()
    }
}
