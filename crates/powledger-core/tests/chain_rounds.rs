use powledger_core::chain::{Chain, ChainConfig};
use powledger_core::Transaction;
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn repeated_rounds_stay_valid_and_linked() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut chain = Chain::new();
    let num_rounds = 5;

    for round in 0..num_rounds {
        let num_txs = rng.gen_range(0..4);
        for i in 0..num_txs {
            chain.add_transaction(Transaction::new(
                format!("addr_{round}_{i}"),
                format!("addr_{round}_{}", i + 1),
                rng.gen_range(1..100),
            ));
        }
        chain.mine_pending("miner");
        assert!(chain.is_valid(), "chain invalid after round {round}");
        assert!(chain.pending().is_empty());
    }

    assert_eq!(chain.blocks().len(), num_rounds + 1);

    // Every block past genesis links to its predecessor and ends with
    // exactly one reward transaction.
    for i in 1..chain.blocks().len() {
        let block = &chain.blocks()[i];
        assert_eq!(block.previous_hash(), chain.blocks()[i - 1].hash());
        assert!(block.hash().starts_with('0'));
        let rewards: Vec<_> = block
            .transactions()
            .iter()
            .filter(|tx| tx.is_reward())
            .collect();
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].amount, 50);
        assert_eq!(rewards[0].to, "miner");
        assert!(block.transactions().last().unwrap().is_reward());
    }
}

#[test]
fn custom_config_drives_reward_and_difficulty() {
    let mut chain = Chain::with_config(ChainConfig {
        miner_reward: 7,
        difficulty: 2,
    });
    chain.add_transaction(Transaction::new("add1", "add2", 10));
    chain.mine_pending("add3");

    let block = chain.latest_block();
    assert!(block.hash().starts_with("00"));
    assert_eq!(block.transactions().last().unwrap().amount, 7);
    assert!(chain.is_valid());
}

#[test]
fn external_blocks_interleave_with_pool_rounds() {
    let mut chain = Chain::new();
    chain.add_transaction(Transaction::new("add1", "add2", 10));
    chain.mine_pending("add3");

    let external = powledger_core::Block::new(vec![Transaction::new("add9", "add1", 3)], "stale");
    chain.add_block(external);

    chain.add_transaction(Transaction::new("add2", "add1", 5));
    chain.mine_pending("add3");

    assert_eq!(chain.blocks().len(), 4);
    assert!(chain.is_valid());
}
