use anyhow::Result;
use clap::Parser;
use powledger_core::chain::{Chain, ChainConfig};
use powledger_core::Transaction;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "powledger")]
#[command(about = "Mine a demo proof-of-work ledger and verify its integrity")]
struct Cli {
    /// Required leading zero hex digits in each block hash
    #[arg(long, default_value_t = 1)]
    difficulty: usize,

    /// Reward minted to the miner each round
    #[arg(long, default_value_t = 50)]
    reward: u64,

    /// Address credited with the mining reward
    #[arg(long, default_value = "add3")]
    miner: String,

    /// Extra reward-only rounds to mine after the demo round
    #[arg(long, default_value_t = 0)]
    rounds: u32,

    /// Corrupt a settled transaction before validating, to show detection
    #[cfg(feature = "tamper")]
    #[arg(long)]
    tamper: bool,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let mut chain = Chain::with_config(ChainConfig {
        miner_reward: cli.reward,
        difficulty: cli.difficulty,
    });

    chain.add_transaction(Transaction::new("add1", "add2", 10));
    chain.add_transaction(Transaction::new("add2", "add1", 5));
    chain.mine_pending(&cli.miner);

    for _ in 0..cli.rounds {
        chain.mine_pending(&cli.miner);
    }
    info!(blocks = chain.blocks().len(), "mining finished");

    #[cfg(feature = "tamper")]
    if cli.tamper {
        chain.block_mut(1).tamper_amount(0, 1_000);
    }

    for block in chain.blocks() {
        println!("{block}");
    }
    println!("chain valid: {}", chain.is_valid());

    Ok(())
}
