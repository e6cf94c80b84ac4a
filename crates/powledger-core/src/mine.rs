//! Cancellable and parallel variants of the nonce search.
//!
//! [`Block::mine`] blocks its caller until a satisfying nonce turns up,
//! which at higher difficulties can be arbitrarily long. Concurrent hosts
//! can instead time-box the search with [`mine_cancellable`] or split it
//! across threads with [`mine_parallel`]. Both honor the same contract as
//! the sequential loop: the winning nonce is the first one at or above the
//! block's starting nonce whose hash meets the difficulty.

use crate::{meets_difficulty, Block};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MineError {
    #[error("mining cancelled before a satisfying nonce was found")]
    Cancelled,
}

/// Like [`Block::mine`], but checks `cancel` between nonce increments.
/// On cancellation the block is left exactly as it was handed in.
pub fn mine_cancellable(
    block: &mut Block,
    difficulty: usize,
    cancel: &AtomicBool,
) -> Result<(), MineError> {
    let start_nonce = block.nonce;
    let start_hash = block.hash.clone();
    loop {
        if meets_difficulty(&block.hash, difficulty) {
            info!(hash = %block.hash, nonce = block.nonce, "mining complete");
            return Ok(());
        }
        if cancel.load(Ordering::Relaxed) {
            block.nonce = start_nonce;
            block.hash = start_hash;
            return Err(MineError::Cancelled);
        }
        block.nonce += 1;
        block.hash = block.compute_hash();
    }
}

/// Splits the nonce scan across rayon workers. `find_first` keeps the
/// sequential contract: the lowest satisfying nonce wins even though
/// higher ranges are probed concurrently.
pub fn mine_parallel(block: &mut Block, difficulty: usize) {
    if meets_difficulty(&block.hash, difficulty) {
        return;
    }

    // The transactions, previous hash, and timestamp are fixed for the
    // whole search; only the nonce rendering varies per attempt.
    let body = block.serialize_transactions();
    let previous_hash = block.previous_hash.clone();
    let timestamp = block.timestamp.to_string();

    let winner = (block.nonce..u64::MAX)
        .into_par_iter()
        .find_first(|nonce| {
            let mut hasher = Sha256::new();
            hasher.update(body.as_bytes());
            hasher.update(previous_hash.as_bytes());
            hasher.update(nonce.to_string().as_bytes());
            hasher.update(timestamp.as_bytes());
            meets_difficulty(&hex::encode(hasher.finalize()), difficulty)
        })
        .expect("nonce space exhausted (practically impossible)");

    block.nonce = winner;
    block.hash = block.compute_hash();
    info!(hash = %block.hash, nonce = block.nonce, "mining complete");
}
