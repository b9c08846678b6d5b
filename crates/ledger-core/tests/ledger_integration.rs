mod helpers;

use helpers::{append_transfers, quick_ledger};
use ledger_core::{BlockError, Ledger, ProofOfWork, SuffixProofOfWork, Transaction};
use std::sync::Arc;

#[test]
fn fresh_ledger_is_valid_at_genesis() {
    let ledger = Ledger::default();
    assert!(ledger.is_valid());
    assert_eq!(ledger.last_block().index(), 0);
    assert!(ledger.invalid_blocks().is_empty());
}

#[test]
fn single_transfer_block_scenario() -> anyhow::Result<()> {
    let mut ledger = Ledger::default();
    let genesis = ledger.last_block().clone();

    ledger.add_transaction("A", "B", 10);
    let block = ledger.add_block();

    assert_eq!(block.index(), 1);
    assert_eq!(block.previous_hash(), &genesis.block_hash());
    assert_eq!(block.transactions()?, vec![Transaction::new("A", "B", 10)]);
    assert!(SuffixProofOfWork.valid(genesis.proof(), &genesis.block_hash(), block.proof()));
    assert_eq!(block.proof(), SuffixProofOfWork.find(genesis.proof(), &genesis.block_hash()));
    assert_eq!(ledger.len(), 2);
    assert!(ledger.is_valid());
    Ok(())
}

#[test]
fn mined_chain_stays_valid() -> anyhow::Result<()> {
    let mut ledger = Ledger::default();
    append_transfers(
        &mut ledger,
        &[("me", "escrow", 3), ("escrow", "you", 2), ("you", "vault", 1)],
    );
    assert_eq!(ledger.len(), 4);
    assert!(ledger.is_valid());

    let indices: Vec<u64> = ledger.each_block().map(|b| b.index()).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    for pair in ledger.each_block().collect::<Vec<_>>().windows(2) {
        assert_eq!(pair[1].previous_hash(), &pair[0].block_hash());
        assert!(Arc::ptr_eq(pair[1].previous_block().expect("linked"), pair[0]));
    }
    Ok(())
}

#[test]
fn forged_block_outside_the_ledger_is_detected() -> anyhow::Result<()> {
    let mut ledger = quick_ledger();
    append_transfers(&mut ledger, &[("a", "b", 1), ("b", "c", 1)]);

    let middle = ledger.block(1).expect("block 1").clone();
    let forged = middle
        .forge()
        .transactions(&[Transaction::new("a", "attacker", 1)])
        .build();

    assert_eq!(forged.validate(), Err(BlockError::CorruptedPayload { index: 1 }));
    assert_eq!(forged.transactions()?, vec![Transaction::new("a", "attacker", 1)]);
    // the ledger still holds the untouched original
    assert!(ledger.is_valid());
    assert_eq!(ledger.block(1).expect("block 1").transactions()?, vec![Transaction::new("a", "b", 1)]);
    Ok(())
}

#[test]
fn pending_buffer_clears_per_block() {
    let mut ledger = quick_ledger();
    ledger.add_transaction("a", "b", 1);
    ledger.add_transaction("b", "c", 2);
    assert_eq!(ledger.pending_transactions().len(), 2);

    let block = ledger.add_block();
    assert!(ledger.pending_transactions().is_empty());
    assert_eq!(block.transactions().map(|t| t.len()), Ok(2));

    let empty = ledger.add_block();
    assert_eq!(empty.transactions().map(|t| t.len()), Ok(0));
}

#[test]
fn ledger_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Ledger>();
    assert_send_sync::<ledger_core::Currency>();
    assert_send_sync::<ledger_core::Block>();
}
