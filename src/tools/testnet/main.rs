use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use solana_sdk::commitment_config::CommitmentConfig;
use stake_pool_query::common::typedefs::rpc_client_with_uri::RpcClientWithUri;
use stake_pool_query::common::typedefs::serializable_pubkey::SerializablePubkey;
use stake_pool_query::common::{fetch_slot_with_commitment, setup_logging, LoggingFormat};
use stake_pool_query::proxy::{QueryProxy, QueryProxyClient};
use stake_pool_query::stake_pool::{
    StakePoolQueryConfig, StakePoolReport, DEVNET_STAKE_POOL, SOLANA_DEVNET_RPC,
    TESTNET_QUERY_URL,
};

/// Slots added to the current finalized slot to get the query's minimum context slot
const MIN_CONTEXT_SLOT_LEAD: u64 = 2;

/// Query a devnet stake pool through the Wormhole testnet query proxy
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Query proxy API key
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Query proxy endpoint
    #[arg(short, long, default_value = TESTNET_QUERY_URL)]
    query_url: String,

    /// Solana RPC used to look up the current finalized slot
    #[arg(short, long, default_value = SOLANA_DEVNET_RPC)]
    rpc_url: String,

    /// Stake pool account to query
    #[arg(short, long, default_value = DEVNET_STAKE_POOL)]
    stake_pool: SerializablePubkey,

    /// Logging format
    #[arg(short, long, default_value_t = LoggingFormat::Standard)]
    logging_format: LoggingFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.logging_format);

    let proxy = QueryProxyClient::new(args.query_url.clone(), args.api_key.clone())?;

    let rpc = RpcClientWithUri::new(args.rpc_url.clone());
    let current_slot = fetch_slot_with_commitment(&rpc, CommitmentConfig::finalized()).await?;
    let min_context_slot = current_slot + MIN_CONTEXT_SLOT_LEAD;
    info!(
        "Performing query against {}, current slot: {}, using min context slot: {}",
        proxy.url(),
        current_slot,
        min_context_slot
    );

    let request = StakePoolQueryConfig::with_clock(args.stake_pool)
        .with_min_context_slot(min_context_slot)
        .build_query_request()?;
    let before = Instant::now();
    let response = proxy
        .query(&request)
        .await
        .context("Query proxy request failed")?;
    let elapsed = before.elapsed();

    let report = StakePoolReport::from_response_bytes(response.bytes.as_slice())?;
    println!("{}", report);
    if report.slot_number == min_context_slot {
        info!("Returned slot matches requested slot.");
    } else {
        error!(
            "Slot mismatch: slot number: {}, min context slot: {}",
            report.slot_number, min_context_slot
        );
    }
    info!(
        "Query completed in {:.2}ms.",
        elapsed.as_secs_f64() * 1000.0
    );
    Ok(())
}
