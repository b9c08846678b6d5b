use crate::block::{Block, StandardBlockFactory};
use crate::constants::{GENESIS_WALLET, INITIAL_AMOUNT, MINING_REWARD, MINT_SOURCE};
use crate::error::CurrencyError;
use crate::ledger::Ledger;
use crate::pow::{ProofOfWork, SuffixProofOfWork};
use crate::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Coins credited to the miner of each block.
    pub mining_reward: u64,
    /// Coins issued to `genesis_wallet` in the genesis block.
    pub initial_amount: u64,
    /// Sender id for minted coins; never debited as a wallet.
    pub mint_source: String,
    pub genesis_wallet: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            mining_reward: MINING_REWARD,
            initial_amount: INITIAL_AMOUNT,
            mint_source: MINT_SOURCE.to_string(),
            genesis_wallet: GENESIS_WALLET.to_string(),
        }
    }
}

/// An oversimplified currency built on the ledger's read/append contract.
///
/// Balances are a fold over every block's transactions. A transfer checks the sender's
/// balance (pending transactions included) and buffers the transaction under one
/// `&mut self` borrow, so wrapping a `Currency` in a mutex is enough to rule out
/// double spends between threads.
pub struct Currency {
    ledger: Ledger,
    wallets: HashSet<String>,
    config: CurrencyConfig,
}

impl Default for Currency {
    fn default() -> Self {
        Self::new()
    }
}

impl Currency {
    pub fn new() -> Self {
        Self::with_config(Arc::new(SuffixProofOfWork), CurrencyConfig::default())
    }

    pub fn with_config(pow: Arc<dyn ProofOfWork>, config: CurrencyConfig) -> Self {
        let issuance = Transaction::new(
            config.mint_source.clone(),
            config.genesis_wallet.clone(),
            config.initial_amount,
        );
        let ledger = Ledger::with_genesis_transactions(pow, StandardBlockFactory, vec![issuance]);
        let mut wallets = HashSet::new();
        wallets.insert(config.genesis_wallet.clone());
        Self {
            ledger,
            wallets,
            config,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn config(&self) -> &CurrencyConfig {
        &self.config
    }

    pub fn wallets(&self) -> &HashSet<String> {
        &self.wallets
    }

    pub fn genesis_wallet(&self) -> &str {
        &self.config.genesis_wallet
    }

    /// Registers a new wallet and returns its id.
    pub fn create_wallet(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        self.wallets.insert(id.clone());
        debug!(wallet = %id, "created wallet");
        id
    }

    pub fn transfer(&mut self, amount: u64, from: &str, to: &str) -> Result<(), CurrencyError> {
        self.ensure_wallet(to)?;
        self.ensure_wallet(from)?;
        if to == from {
            return Err(CurrencyError::SelfTransfer(to.to_string()));
        }
        if !self.wallet_has_at_least(from, amount)? {
            return Err(CurrencyError::InsufficientFunds {
                wallet: from.to_string(),
                amount,
            });
        }
        self.ledger.add_transaction(from, to, amount);
        Ok(())
    }

    /// Seals the pending transfers into a block and pays `wallet` the mining reward.
    pub fn process(&mut self, wallet: &str) -> Result<Arc<Block>, CurrencyError> {
        self.ensure_wallet(wallet)?;
        let mint = self.config.mint_source.clone();
        let reward = self.config.mining_reward;
        Ok(self
            .ledger
            .add_block_with(|ledger| ledger.add_transaction(mint, wallet, reward)))
    }

    pub fn wallet_has_at_least(&self, wallet: &str, amount: u64) -> Result<bool, CurrencyError> {
        let balance = self.balance_for(wallet, true)?;
        debug!(wallet, balance = %balance, "balance check");
        Ok(balance >= i128::from(amount))
    }

    pub fn balance_for(&self, wallet: &str, include_pending: bool) -> Result<i128, CurrencyError> {
        let mut total = 0i128;
        for block in self.ledger.each_block() {
            let change: i128 = block
                .transactions()?
                .iter()
                .map(|tx| change_for(wallet, tx))
                .sum();
            total += change;
        }
        debug!(wallet, total = %total, "total from chain");

        if include_pending {
            total += self
                .ledger
                .pending_transactions()
                .iter()
                .map(|tx| change_for(wallet, tx))
                .sum::<i128>();
            debug!(wallet, total = %total, "total after pending transactions");
        }
        Ok(total)
    }

    /// Net on-chain balance of every id that appears in a transaction, mint source included.
    pub fn all_wallet_balances(&self) -> Result<BTreeMap<String, i128>, CurrencyError> {
        let mut totals: BTreeMap<String, i128> = BTreeMap::new();
        for block in self.ledger.each_block() {
            for tx in block.transactions()? {
                *totals.entry(tx.from).or_default() -= i128::from(tx.amount);
                *totals.entry(tx.to).or_default() += i128::from(tx.amount);
            }
        }
        Ok(totals)
    }

    fn ensure_wallet(&self, wallet: &str) -> Result<(), CurrencyError> {
        if self.wallets.contains(wallet) {
            Ok(())
        } else {
            Err(CurrencyError::NoSuchWallet(wallet.to_string()))
        }
    }
}

fn change_for(wallet: &str, tx: &Transaction) -> i128 {
    if tx.from == wallet {
        -i128::from(tx.amount)
    } else if tx.to == wallet {
        i128::from(tx.amount)
    } else {
        0
    }
}
