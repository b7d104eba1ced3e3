use std::{env, fmt, path::PathBuf};

use clap::ValueEnum;
use log::debug;
use solana_sdk::commitment_config::CommitmentConfig;

use crate::proxy::ProxyError;
use typedefs::rpc_client_with_uri::RpcClientWithUri;

pub mod typedefs;

pub fn relative_project_path(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoggingFormat {
    Standard,
    Json,
}

impl fmt::Display for LoggingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingFormat::Standard => write!(f, "standard"),
            LoggingFormat::Json => write!(f, "json"),
        }
    }
}

pub fn setup_logging(logging_format: LoggingFormat) {
    let env_filter = env::var("RUST_LOG").unwrap_or("info,hyper=warn,reqwest=warn".to_string());
    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter);
    match logging_format {
        LoggingFormat::Standard => subscriber.init(),
        LoggingFormat::Json => subscriber.json().init(),
    }
}

/// `getSlot` at `commitment`, with the node's URI attached to any failure.
pub async fn fetch_slot_with_commitment(
    rpc_client: &RpcClientWithUri,
    commitment: CommitmentConfig,
) -> Result<u64, ProxyError> {
    let slot = rpc_client
        .client
        .get_slot_with_commitment(commitment)
        .await
        .map_err(|e| ProxyError::Rpc(format!("getSlot on {}: {}", rpc_client.uri, e)))?;
    debug!(
        "{:?} slot on {} is {}",
        commitment.commitment, rpc_client.uri, slot
    );
    Ok(slot)
}
