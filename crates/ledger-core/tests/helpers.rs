#![allow(dead_code)]

use ledger_core::{Currency, CurrencyConfig, Ledger, StandardBlockFactory, TrivialProofOfWork};
use std::sync::Arc;

pub fn quick_ledger() -> Ledger {
    Ledger::new(Arc::new(TrivialProofOfWork), StandardBlockFactory)
}

pub fn quick_currency() -> Currency {
    Currency::with_config(Arc::new(TrivialProofOfWork), CurrencyConfig::default())
}

/// Appends one block per `(from, to, amount)` triple.
pub fn append_transfers(ledger: &mut Ledger, transfers: &[(&str, &str, u64)]) {
    for (from, to, amount) in transfers {
        ledger.add_transaction(*from, *to, *amount);
        ledger.add_block();
    }
}
