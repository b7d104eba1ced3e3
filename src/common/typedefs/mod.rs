pub mod block_time;
pub mod hash;
pub mod hex_bytes;
pub mod rpc_client_with_uri;
pub mod serializable_pubkey;
