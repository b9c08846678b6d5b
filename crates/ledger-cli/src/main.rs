use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ledger_core::constants::{GENESIS_WALLET, HASH_HEX_SIZE, INITIAL_AMOUNT, MINING_REWARD, MINT_SOURCE};
use ledger_core::{Currency, CurrencyConfig, Hash, ProofOfWork, SuffixProofOfWork};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Drive an in-memory proof-of-work ledger")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. info, ledger_core=debug)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mint a currency, move coins between two wallets and print the resulting chain
    Simulate {
        /// Transfer/mine rounds to run
        #[arg(long, default_value_t = 2)]
        rounds: u32,
        /// Amount sent from the first wallet to the second each round
        #[arg(long, default_value_t = 245)]
        transfer: u64,
        /// Amount sent back each round
        #[arg(long, default_value_t = 20)]
        refund: u64,
        /// Coins paid for mining a block
        #[arg(long, default_value_t = MINING_REWARD)]
        mining_reward: u64,
        /// Coins issued in the genesis block
        #[arg(long, default_value_t = INITIAL_AMOUNT)]
        initial_amount: u64,
        /// Print the final state as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Search for the proof that follows (last_proof, last_hash)
    FindProof {
        #[arg(long)]
        last_proof: u64,
        /// 64 hex characters
        #[arg(long)]
        last_hash: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt().with_env_filter(filter).init();

    match cli.cmd {
        Command::Simulate {
            rounds,
            transfer,
            refund,
            mining_reward,
            initial_amount,
            json,
        } => {
            let config = CurrencyConfig {
                mining_reward,
                initial_amount,
                mint_source: MINT_SOURCE.to_string(),
                genesis_wallet: GENESIS_WALLET.to_string(),
            };
            let coin = simulate(config, rounds, transfer, refund)?;
            if json {
                print_json(&coin)?;
            } else {
                print_state(&coin)?;
            }
        }
        Command::FindProof {
            last_proof,
            last_hash,
        } => {
            let last_hash = parse_hash(&last_hash)?;
            let proof = SuffixProofOfWork.find(last_proof, &last_hash);
            println!("{proof}");
        }
    }
    Ok(())
}

fn simulate(config: CurrencyConfig, rounds: u32, transfer: u64, refund: u64) -> Result<Currency> {
    let mut coin = Currency::with_config(Arc::new(SuffixProofOfWork), config);
    let me = coin.create_wallet();
    info!("created wallet {me}");
    let other = coin.create_wallet();
    info!("created wallet {other}");

    coin.process(&me)?;
    for round in 1..=rounds {
        coin.transfer(transfer, &me, &other)
            .with_context(|| format!("round {round}: transfer"))?;
        coin.transfer(refund, &other, &me)
            .with_context(|| format!("round {round}: refund"))?;
        coin.process(&me)?;
    }

    if !coin.ledger().is_valid() {
        bail!("chain failed validation: {:?}", coin.ledger().validation_errors());
    }
    Ok(coin)
}

fn print_state(coin: &Currency) -> Result<()> {
    println!("Chain");
    println!(" Idx   Timestamp (ns)        Proof   Previous hash");
    for block in coin.ledger().each_block() {
        println!(
            "{:05}  {:<20}  {:>6}  {}",
            block.index(),
            block.timestamp(),
            block.proof(),
            hex::encode(block.previous_hash())
        );
        for tx in block.transactions()? {
            println!("    {:>20}  [{} -> {}]", tx.amount, tx.from, tx.to);
        }
    }

    println!();
    println!("Wallets");
    for (wallet, amount) in coin.all_wallet_balances()? {
        println!("  {wallet:<36}  {amount:>20}");
    }
    println!();
    println!("valid: {}", coin.ledger().is_valid());
    Ok(())
}

fn print_json(coin: &Currency) -> Result<()> {
    let blocks = coin
        .ledger()
        .each_block()
        .map(|block| -> Result<serde_json::Value> {
            Ok(serde_json::json!({
                "index": block.index(),
                "timestamp": block.timestamp(),
                "proof": block.proof(),
                "previous_hash": hex::encode(block.previous_hash()),
                "block_hash": hex::encode(block.block_hash()),
                "transactions": block.transactions()?,
            }))
        })
        .collect::<Result<Vec<_>>>()?;
    let balances = coin
        .all_wallet_balances()?
        .into_iter()
        .map(|(wallet, amount)| (wallet, serde_json::Value::String(amount.to_string())))
        .collect::<serde_json::Map<_, _>>();
    let out = serde_json::json!({
        "valid": coin.ledger().is_valid(),
        "blocks": blocks,
        "balances": balances,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn parse_hash(text: &str) -> Result<Hash> {
    if text.len() != HASH_HEX_SIZE {
        bail!("expected {HASH_HEX_SIZE} hex characters, got {}", text.len());
    }
    let bytes = hex::decode(text).context("last hash is not hex")?;
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}
