use std::path::PathBuf;

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use stake_pool_query::common::typedefs::serializable_pubkey::SerializablePubkey;
use stake_pool_query::common::{setup_logging, LoggingFormat};
use stake_pool_query::evm::{
    load_contract_bytecode, verify_on_chain_state, EvmClient, OnChainPoolState,
    StakePoolRateConfig, StakePoolRateContract,
};
use stake_pool_query::proxy::{QueryProxy, QueryProxyClient, QueryProxyMock};
use stake_pool_query::query::signature::signatures_to_evm_structs;
use stake_pool_query::stake_pool::{
    StakePoolQueryConfig, StakePoolReport, JITO_SOL_POOL, SOLANA_MAINNET_RPC,
    SPL_STAKE_POOL_PROGRAM, TESTNET_QUERY_URL, THIRTY_MINUTES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProxyKind {
    /// Sign responses locally with the devnet guardian key
    Mock,
    /// Send the query to a live query proxy
    Live,
}

/// Query a stake pool and push the signed response to the rate contract on an EVM chain
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Where the signed response comes from
    #[arg(long, value_enum, default_value_t = ProxyKind::Mock)]
    proxy: ProxyKind,

    /// Solana RPC the mock proxy reads accounts from
    #[arg(short, long, default_value = SOLANA_MAINNET_RPC)]
    rpc_url: String,

    /// Query proxy endpoint, for `--proxy live`
    #[arg(short, long, default_value = TESTNET_QUERY_URL)]
    query_url: String,

    /// Query proxy API key, for `--proxy live`
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// EVM JSON-RPC endpoint with an unlocked sender account
    #[arg(short, long, default_value = "http://127.0.0.1:8545")]
    evm_rpc_url: String,

    /// Already deployed rate contract. When omitted, a new one is deployed from `--artifact`.
    #[arg(long)]
    contract: Option<Address>,

    /// Foundry/Hardhat artifact or hex file with the rate contract's creation code
    #[arg(long)]
    artifact: Option<PathBuf>,

    /// Wormhole core contract passed to the rate contract's constructor
    #[arg(long)]
    wormhole: Option<Address>,

    /// Stake pool account to query
    #[arg(short, long, default_value = JITO_SOL_POOL)]
    stake_pool: SerializablePubkey,

    /// Owner program the contract expects the stake pool account to have
    #[arg(long, default_value = SPL_STAKE_POOL_PROGRAM)]
    stake_pool_owner: SerializablePubkey,

    /// Maximum age, in seconds, of a response the contract accepts
    #[arg(long, default_value_t = THIRTY_MINUTES)]
    allowed_update_staleness: u64,

    /// Logging format
    #[arg(short, long, default_value_t = LoggingFormat::Standard)]
    logging_format: LoggingFormat,
}

fn build_proxy(args: &Args) -> Result<Box<dyn QueryProxy>> {
    let proxy: Box<dyn QueryProxy> = match args.proxy {
        ProxyKind::Mock => Box::new(QueryProxyMock::solana(args.rpc_url.clone())?),
        ProxyKind::Live => Box::new(QueryProxyClient::new(
            args.query_url.clone(),
            args.api_key.clone(),
        )?),
    };
    Ok(proxy)
}

async fn connect_contract(args: &Args) -> Result<StakePoolRateContract> {
    let client = EvmClient::new(&args.evm_rpc_url)
        .with_context(|| format!("Failed to connect to {}", args.evm_rpc_url))?;
    if let Some(address) = args.contract {
        let sender = client.default_sender().await?;
        info!("Using rate contract at {}", address);
        return Ok(StakePoolRateContract::attach(client, address, sender));
    }

    let artifact = args
        .artifact
        .as_ref()
        .ok_or_else(|| anyhow!("Either --contract or --artifact is required"))?;
    let wormhole = args
        .wormhole
        .ok_or_else(|| anyhow!("--wormhole is required to deploy the rate contract"))?;
    let bytecode = load_contract_bytecode(artifact)
        .with_context(|| format!("Failed to load bytecode from {}", artifact.display()))?;
    let config = StakePoolRateConfig {
        wormhole,
        stake_pool: args.stake_pool,
        stake_pool_owner: args.stake_pool_owner,
        allowed_update_staleness: args.allowed_update_staleness,
    };
    Ok(StakePoolRateContract::deploy(client, &bytecode, &config).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.logging_format);

    let proxy = build_proxy(&args)?;
    let contract = connect_contract(&args).await?;

    let request = StakePoolQueryConfig::with_clock(args.stake_pool).build_query_request()?;
    let response = proxy
        .query(&request)
        .await
        .context("Stake pool query failed")?;
    let report = StakePoolReport::from_response_bytes(response.bytes.as_slice())?;
    println!("{}", report);

    let signatures = signatures_to_evm_structs(&response.signatures);
    contract
        .update_pool(response.bytes.as_slice(), &signatures)
        .await
        .context("updatePool failed")?;

    let expected = OnChainPoolState::expected_from_report(&report)?;
    let actual = contract.read_state().await?;
    verify_on_chain_state(&expected, &actual)?;
    info!(
        "Contract {} holds rate {} at slot {}",
        contract.address(),
        actual.rate,
        actual.slot
    );
    Ok(())
}
