pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Minted to the reward address each mining round.
pub const MINER_REWARD: u64 = 50;
/// Default required leading zero hex digits in a block hash.
pub const POW_DIFFICULTY: usize = 1;
pub const STARTING_NONCE: u64 = 1;
