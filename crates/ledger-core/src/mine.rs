use crate::constants::NONCE_SEARCH_BATCH;
use rayon::prelude::*;
use tracing::info;

/// Returns the smallest nonce accepted by `is_valid`.
///
/// Nonces are scanned in consecutive batches of [`NONCE_SEARCH_BATCH`]. Each batch is
/// split across the rayon pool and searched with `find_first`, so the answer does not
/// depend on which thread happens to hit a match first.
pub fn first_valid_nonce<F>(is_valid: F) -> u64
where
    F: Fn(u64) -> bool + Sync,
{
    let mut start = 0u64;
    loop {
        let end = start.saturating_add(NONCE_SEARCH_BATCH);
        if let Some(nonce) = (start..end).into_par_iter().find_first(|n| is_valid(*n)) {
            info!(nonce, batches = start / NONCE_SEARCH_BATCH + 1, "nonce found");
            return nonce;
        }
        assert!(end < u64::MAX, "nonce space exhausted (practically impossible)");
        start = end;
    }
}
