use alloy_primitives::{Address, U256};
use stake_pool_query::{
    common::typedefs::serializable_pubkey::SerializablePubkey,
    evm::{
        verify_on_chain_state, EvmClient, EvmError, OnChainPoolState, StakePoolRateConfig,
        StakePoolRateContract,
    },
    proxy::{QueryProxy, QueryProxyResponse},
    query::signature::signatures_to_evm_structs,
    stake_pool::{StakePoolQueryConfig, StakePoolReport, SPL_STAKE_POOL_PROGRAM, THIRTY_MINUTES},
};

use crate::fake_evm_node::FakeEvmNode;
use crate::utils::*;

/// Creation code of `contract Empty {}`; the fake node only reads the constructor arguments.
const RATE_CONTRACT_BYTECODE: &[u8] = &[
    0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15, 0x60, 0x0f, 0x57, 0x60, 0x00, 0x80, 0xfd,
];

fn rate_config(stake_pool: SerializablePubkey) -> StakePoolRateConfig {
    StakePoolRateConfig {
        wormhole: Address::repeat_byte(0x22),
        stake_pool,
        stake_pool_owner: SerializablePubkey::try_from(SPL_STAKE_POOL_PROGRAM).unwrap(),
        allowed_update_staleness: THIRTY_MINUTES,
    }
}

async fn deploy_rate_contract(
    node: &FakeEvmNode,
    stake_pool: SerializablePubkey,
) -> StakePoolRateContract {
    let client = EvmClient::new(&node.url).unwrap();
    StakePoolRateContract::deploy(client, RATE_CONTRACT_BYTECODE, &rate_config(stake_pool))
        .await
        .unwrap()
}

async fn signed_pool_response() -> (QueryProxyResponse, StakePoolReport) {
    let request = StakePoolQueryConfig::with_clock(jito_pool())
        .build_query_request()
        .unwrap();
    let response = mock_proxy().query(&request).await.unwrap();
    let report = StakePoolReport::from_response_bytes(response.bytes.as_slice()).unwrap();
    (response, report)
}

#[tokio::test]
async fn test_deploy_uses_first_unlocked_account() {
    setup_logging();
    let node = FakeEvmNode::start().await;
    let client = EvmClient::new(&node.url).unwrap();
    assert_eq!(client.accounts().await.unwrap(), vec![node.sender]);
    assert_eq!(client.default_sender().await.unwrap(), node.sender);

    let contract = deploy_rate_contract(&node, jito_pool()).await;
    assert_eq!(contract.address(), node.sender.create(0));

    let untouched = contract.read_state().await.unwrap();
    assert_eq!(untouched.slot, 0);
    assert_eq!(untouched.rate, U256::ZERO);
}

#[tokio::test]
async fn test_update_pool_then_read_state_matches_response() {
    setup_logging();
    let node = FakeEvmNode::start().await;
    let contract = deploy_rate_contract(&node, jito_pool()).await;
    let (response, report) = signed_pool_response().await;

    let signatures = signatures_to_evm_structs(&response.signatures);
    let receipt = contract
        .update_pool(response.bytes.as_slice(), &signatures)
        .await
        .unwrap();
    assert!(receipt.status());
    assert_eq!(receipt.to, Some(contract.address()));

    let expected = OnChainPoolState::expected_from_report(&report).unwrap();
    let actual = contract.read_state().await.unwrap();
    assert_eq!(verify_on_chain_state(&expected, &actual), Ok(()));
    assert_eq!(actual.slot, NODE_SLOT);
    assert_eq!(actual.total_active_stake, POOL_TOTAL_ACTIVE_STAKE);
    assert_eq!(actual.pool_token_supply, POOL_TOKEN_SUPPLY);
    assert_eq!(actual.rate, U256::from(1_098_719_330_308_576_848u128));
}

#[tokio::test]
async fn test_tampered_response_reverts() {
    setup_logging();
    let node = FakeEvmNode::start().await;
    let contract = deploy_rate_contract(&node, jito_pool()).await;
    let (response, _) = signed_pool_response().await;

    // Bump the last byte of the account data: still decodes, no longer matches the signature.
    let mut tampered = response.bytes.as_slice().to_vec();
    if let Some(last) = tampered.last_mut() {
        *last ^= 0x01;
    }
    let signatures = signatures_to_evm_structs(&response.signatures);
    let err = contract.update_pool(&tampered, &signatures).await.unwrap_err();
    assert!(matches!(err, EvmError::Reverted { .. }));
    assert_eq!(contract.read_state().await.unwrap().slot, 0);
}

#[tokio::test]
async fn test_response_for_other_pool_reverts() {
    setup_logging();
    let node = FakeEvmNode::start().await;
    let contract = deploy_rate_contract(&node, SerializablePubkey::new_unique()).await;
    let (response, _) = signed_pool_response().await;

    let signatures = signatures_to_evm_structs(&response.signatures);
    let err = contract
        .update_pool(response.bytes.as_slice(), &signatures)
        .await
        .unwrap_err();
    assert!(matches!(err, EvmError::Reverted { .. }));
}
