use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use stake_pool_query::common::typedefs::serializable_pubkey::SerializablePubkey;
use stake_pool_query::common::{setup_logging, LoggingFormat};
use stake_pool_query::proxy::{QueryProxy, QueryProxyMock};
use stake_pool_query::stake_pool::{
    StakePoolQueryConfig, StakePoolReport, DEFAULT_NONCE, JITO_SOL_POOL, SOLANA_MAINNET_RPC,
};

/// Mock a cross-chain query for a stake pool's total stake and pool token supply
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Solana RPC the mock proxy reads accounts from
    #[arg(short, long, default_value = SOLANA_MAINNET_RPC)]
    rpc_url: String,

    /// Stake pool account to query
    #[arg(short, long, default_value = JITO_SOL_POOL)]
    stake_pool: SerializablePubkey,

    #[arg(long, default_value_t = DEFAULT_NONCE)]
    nonce: u32,

    /// Logging format
    #[arg(short, long, default_value_t = LoggingFormat::Standard)]
    logging_format: LoggingFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.logging_format);

    let config = StakePoolQueryConfig {
        nonce: args.nonce,
        ..StakePoolQueryConfig::two_field(args.stake_pool)
    };
    let request = config.build_query_request()?;

    info!("Mocking query for {} using {}", args.stake_pool, args.rpc_url);
    let mock = QueryProxyMock::solana(args.rpc_url.clone())?;
    let response = mock
        .query(&request)
        .await
        .context("Mock query failed")?;

    let report = StakePoolReport::from_response_bytes(response.bytes.as_slice())?;
    println!("{}", report);
    Ok(())
}
