pub mod common;
pub mod evm;
pub mod proxy;
pub mod query;
pub mod stake_pool;
