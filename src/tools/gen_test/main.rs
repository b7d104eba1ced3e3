use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use stake_pool_query::common::typedefs::serializable_pubkey::SerializablePubkey;
use stake_pool_query::common::{setup_logging, LoggingFormat};
use stake_pool_query::proxy::{QueryProxy, QueryProxyMock};
use stake_pool_query::query::signature::signatures_to_evm_structs;
use stake_pool_query::stake_pool::fixture::render_solidity_fixture;
use stake_pool_query::stake_pool::{
    StakePoolQueryConfig, StakePoolReport, JITO_SOL_POOL, SOLANA_MAINNET_RPC,
};

/// Mock a stake pool + clock query and print it as Solidity test fixtures
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Solana RPC the mock proxy reads accounts from
    #[arg(short, long, default_value = SOLANA_MAINNET_RPC)]
    rpc_url: String,

    /// Stake pool account to query
    #[arg(short, long, default_value = JITO_SOL_POOL)]
    stake_pool: SerializablePubkey,

    /// Logging format
    #[arg(short, long, default_value_t = LoggingFormat::Standard)]
    logging_format: LoggingFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.logging_format);

    info!("Mocking query using {}", args.rpc_url);
    let request = StakePoolQueryConfig::with_clock(args.stake_pool).build_query_request()?;
    let mock = QueryProxyMock::solana(args.rpc_url.clone())?;
    let response = mock
        .query(&request)
        .await
        .context("Mock query failed")?;

    let report = StakePoolReport::from_response_bytes(response.bytes.as_slice())?;
    println!("{}", report);

    let signatures = signatures_to_evm_structs(&response.signatures);
    let signature = signatures
        .first()
        .ok_or_else(|| anyhow!("Mock response carries no signatures"))?;
    let fixture = render_solidity_fixture(&response.bytes.to_hex(), signature, &report)?;
    println!("\n\n*****\nmock result for Solidity\n*****\n\n");
    println!("{}", fixture);
    Ok(())
}
