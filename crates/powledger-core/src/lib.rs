use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::info;

pub mod constants;
pub mod mine;

use constants::{MINER_REWARD, POW_DIFFICULTY, STARTING_NONCE};

/// A value transfer between two string-identified parties.
///
/// An empty `from` marks a system-minted mining reward. Amounts and
/// addresses are stored verbatim; the ledger trusts all transaction input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: u64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// A system-minted reward paid out by a mining round.
    pub fn reward(to: impl Into<String>, amount: u64) -> Self {
        Self::new("", to, amount)
    }

    pub fn is_reward(&self) -> bool {
        self.from.is_empty()
    }
}

/// True when the first `difficulty` characters of `hash` are all `'0'`.
///
/// Difficulty counts leading zero hex digits, so each extra unit multiplies
/// the expected nonce search by 16. Difficulty 0 is always satisfied.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    difficulty <= hash.len() && hash.as_bytes()[..difficulty].iter().all(|&b| b == b'0')
}

/// One unit of chain growth: an ordered batch of transactions bound to the
/// predecessor block by `previous_hash` and sealed by proof-of-work.
///
/// Fields are private; a block mutates only inside the mining loop and the
/// chain's re-link path, and is settled once appended to a [`chain::Chain`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    transactions: Vec<Transaction>,
    previous_hash: String,
    hash: String,
    timestamp: u64,
    nonce: u64,
}

impl Block {
    /// Builds a block over `transactions`, capturing the current time and
    /// computing the hash immediately. The nonce starts at 1.
    pub fn new(transactions: Vec<Transaction>, previous_hash: impl Into<String>) -> Self {
        let mut block = Self {
            transactions,
            previous_hash: previous_hash.into(),
            hash: String::new(),
            timestamp: unix_now(),
            nonce: STARTING_NONCE,
        };
        block.hash = block.compute_hash();
        block
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Canonical hashing rendition of the transaction list: each entry as a
    /// compact JSON object followed by a comma, concatenated in insertion
    /// order with no enclosing brackets. The trailing comma is part of the
    /// format; prior chains hashed exactly these bytes.
    pub fn serialize_transactions(&self) -> String {
        let mut out = String::new();
        for tx in &self.transactions {
            out.push_str(&serde_json::to_string(tx).expect("transaction serializes to JSON"));
            out.push(',');
        }
        out
    }

    /// SHA-256 over the serialized transactions, the previous hash, and the
    /// decimal renderings of nonce and timestamp, as 64 lowercase hex chars.
    ///
    /// Pure: identical inputs always produce identical output. Chain
    /// integrity rests on this determinism.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.serialize_transactions().as_bytes());
        hasher.update(self.previous_hash.as_bytes());
        hasher.update(self.nonce.to_string().as_bytes());
        hasher.update(self.timestamp.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Brute-force nonce search: increments the nonce and recomputes the
    /// hash until [`meets_difficulty`] holds. Monotonic from the starting
    /// nonce, no skipping. Blocks the caller; see [`mine`](crate::mine) for
    /// the cancellable and parallel variants.
    pub fn mine(&mut self, difficulty: usize) {
        while !meets_difficulty(&self.hash, difficulty) {
            self.nonce += 1;
            self.hash = self.compute_hash();
        }
        info!(hash = %self.hash, nonce = self.nonce, "mining complete");
    }

    /// Overwrites a settled transaction amount without recomputing the hash.
    /// Exists only to simulate in-place corruption for the validator.
    #[cfg(any(test, feature = "tamper"))]
    pub fn tamper_amount(&mut self, index: usize, amount: u64) {
        self.transactions[index].amount = amount;
    }

    /// Overwrites the previous-hash link without touching the predecessor.
    #[cfg(any(test, feature = "tamper"))]
    pub fn tamper_previous_hash(&mut self, previous_hash: impl Into<String>) {
        self.previous_hash = previous_hash.into();
    }

    /// Recomputes and stores the hash over the current contents. Paired with
    /// the tamper mutators to model an attacker who re-seals a forged block.
    #[cfg(any(test, feature = "tamper"))]
    pub fn reseal(&mut self) {
        self.hash = self.compute_hash();
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block {{")?;
        writeln!(f, "  transactions : {}", self.serialize_transactions())?;
        writeln!(f, "  previous_hash: {}", self.previous_hash)?;
        writeln!(f, "  hash         : {}", self.hash)?;
        write!(f, "}}")
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs()
}

/// Why a chain failed validation, naming the offending block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("block {index}: stored hash does not match recomputed contents")]
    ContentTampered { index: usize },
    #[error("block {index}: previous-hash link does not match predecessor")]
    BrokenLink { index: usize },
}

pub mod chain {
    use super::*;
    use tracing::warn;

    /// Immutable mining parameters, fixed at chain construction.
    #[derive(Clone, Copy, Debug)]
    pub struct ChainConfig {
        /// Amount minted to the reward address each mining round.
        pub miner_reward: u64,
        /// Required leading zero hex digits in every mined block hash.
        pub difficulty: usize,
    }

    impl Default for ChainConfig {
        fn default() -> Self {
            Self {
                miner_reward: MINER_REWARD,
                difficulty: POW_DIFFICULTY,
            }
        }
    }

    /// The append-only ledger: hash-linked blocks plus the pool of
    /// transactions waiting for the next mining round.
    ///
    /// Never empty; index 0 is always the genesis block with an empty
    /// previous hash. Grows monotonically, no forks, no reordering.
    pub struct Chain {
        blocks: Vec<Block>,
        pending: Vec<Transaction>,
        config: ChainConfig,
    }

    impl Chain {
        pub fn new() -> Self {
            Self::with_config(ChainConfig::default())
        }

        /// Creates the chain and mints the genesis block synchronously:
        /// empty transaction set, empty previous hash.
        pub fn with_config(config: ChainConfig) -> Self {
            let genesis = Block::new(Vec::new(), "");
            Self {
                blocks: vec![genesis],
                pending: Vec::new(),
                config,
            }
        }

        pub fn config(&self) -> ChainConfig {
            self.config
        }

        pub fn blocks(&self) -> &[Block] {
            &self.blocks
        }

        pub fn pending(&self) -> &[Transaction] {
            &self.pending
        }

        pub fn latest_block(&self) -> &Block {
            self.blocks.last().expect("chain is never empty")
        }

        /// Accepts `tx` into the pending pool. No validation; submission
        /// order is preserved and becomes part of the hashed content.
        pub fn add_transaction(&mut self, tx: Transaction) {
            self.pending.push(tx);
        }

        /// The single state transition that advances the ledger: appends a
        /// reward for `reward_address` to the pool, seals the whole pool
        /// into a block linked to the current tip, mines it, and appends.
        /// The pool is empty afterwards.
        pub fn mine_pending(&mut self, reward_address: &str) {
            self.pending
                .push(Transaction::reward(reward_address, self.config.miner_reward));
            let previous_hash = self.latest_block().hash.clone();
            let mut block = Block::new(std::mem::take(&mut self.pending), previous_hash);
            block.mine(self.config.difficulty);
            self.blocks.push(block);
        }

        /// Secondary path for externally built blocks. The caller's linkage
        /// is never trusted: `previous_hash` is overwritten with the current
        /// tip hash and the block is re-hashed and re-mined before append.
        /// Transactions placed in `block` bypass the pending pool.
        pub fn add_block(&mut self, mut block: Block) {
            block.previous_hash = self.latest_block().hash.clone();
            block.hash = block.compute_hash();
            block.mine(self.config.difficulty);
            self.blocks.push(block);
        }

        /// Linear integrity scan. For each block past genesis: the stored
        /// hash must match a fresh recomputation (in-place tampering), and
        /// `previous_hash` must equal the predecessor's hash (broken or
        /// reordered linkage). The single-block case checks only the genesis
        /// recomputation. Stops at the first failure.
        pub fn verify(&self) -> Result<(), ChainError> {
            if self.blocks.len() == 1 {
                let genesis = &self.blocks[0];
                if genesis.hash != genesis.compute_hash() {
                    return Err(ChainError::ContentTampered { index: 0 });
                }
                return Ok(());
            }
            for index in 1..self.blocks.len() {
                let block = &self.blocks[index];
                if block.hash != block.compute_hash() {
                    return Err(ChainError::ContentTampered { index });
                }
                if block.previous_hash != self.blocks[index - 1].hash {
                    return Err(ChainError::BrokenLink { index });
                }
            }
            Ok(())
        }

        /// [`verify`](Self::verify) as a plain query: logs the diagnostic
        /// and answers with a bool. Never panics, never mutates.
        pub fn is_valid(&self) -> bool {
            match self.verify() {
                Ok(()) => true,
                Err(err) => {
                    warn!(%err, "chain validation failed");
                    false
                }
            }
        }

        /// Test-only access to a settled block, for the tamper mutators.
        #[cfg(any(test, feature = "tamper"))]
        pub fn block_mut(&mut self, index: usize) -> &mut Block {
            &mut self.blocks[index]
        }
    }

    impl Default for Chain {
        fn default() -> Self {
            Self::new()
        }
    }
}
