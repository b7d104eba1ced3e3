use alloy_primitives::U256;
use insta::{assert_json_snapshot, assert_snapshot};
use stake_pool_query::{
    common::typedefs::serializable_pubkey::SerializablePubkey,
    evm::{verify_on_chain_state, OnChainPoolState},
    proxy::{ProxyError, QueryProxy},
    query::signature::{query_response_digest, signatures_to_evm_structs, DEVNET_GUARDIAN_ADDRESS},
    stake_pool::{fixture::render_solidity_fixture, StakePoolQueryConfig, StakePoolReport},
};

use crate::utils::*;

#[derive(Debug, Clone, Copy)]
enum QueryShape {
    TwoField,
    WithClock,
}

impl QueryShape {
    fn config(self) -> StakePoolQueryConfig {
        match self {
            QueryShape::TwoField => StakePoolQueryConfig::two_field(jito_pool()),
            QueryShape::WithClock => StakePoolQueryConfig::with_clock(jito_pool()),
        }
    }
}

#[rstest]
#[tokio::test]
async fn test_mock_query_decodes_pool_fields(
    #[values(QueryShape::TwoField, QueryShape::WithClock)] shape: QueryShape,
) {
    let request = shape.config().build_query_request().unwrap();
    let response = mock_proxy().query(&request).await.unwrap();
    let report = StakePoolReport::from_response_bytes(response.bytes.as_slice()).unwrap();

    assert_eq!(report.account, jito_pool());
    assert_eq!(report.slot_number, NODE_SLOT);
    assert_eq!(
        report.block_time.as_unix_seconds(),
        NODE_BLOCK_TIME_SECONDS as u64
    );
    assert_eq!(report.fields.total_active_stake, POOL_TOTAL_ACTIVE_STAKE);
    assert_eq!(report.fields.pool_token_supply, POOL_TOKEN_SUPPLY);
    match shape {
        QueryShape::TwoField => {
            assert_eq!(report.data.len(), 16);
            assert_eq!(report.fields.last_update_epoch, None);
            assert_eq!(report.clock_epoch(), None);
        }
        QueryShape::WithClock => {
            assert_eq!(report.data.len(), 282);
            assert_eq!(report.fields.last_update_epoch, Some(POOL_LAST_UPDATE_EPOCH));
            assert_eq!(report.clock_epoch(), Some(CLOCK_EPOCH));
        }
    }
}

#[tokio::test]
async fn test_two_field_report_rendering() {
    let request = QueryShape::TwoField.config().build_query_request().unwrap();
    let response = mock_proxy().query(&request).await.unwrap();
    let report = StakePoolReport::from_response_bytes(response.bytes.as_slice()).unwrap();

    assert_snapshot!(report.to_string(), @r###"
    account (base58)   Jito4APyf642JPZPx3hGc6WWJ8zPKtRbRs4P815Awbb
    account (hex)      048a3e08c3b495be17f45427d89bec5b80c7e2695c1864d76743db39bed346d6
    slot number        251234567
    block time         2024-02-08T18:30:04.000Z
    block hash         5TeWSsjg2gbxCyWVniXeCmwM7UtHTCK7svzJr5xYJzHf
    owner (base58)     SPoo1Ku8WFXoNDMHPsrGSTSG1Y47rzgn41SLUNakuHy
    owner (hex)        06814ed4caf68a174672fdac86031a63e84ea15efa1d44b72293f6dbdb001650
    data               992ddfcb9f1d2900cf22e912e76b2500
    total active stake 11573046202543513
    pool token supply  10533214337180367
    pool token value   1.0987193303085767
    "###);
}

#[tokio::test]
async fn test_mock_response_is_signed_by_devnet_guardian() {
    let request = QueryShape::WithClock.config().build_query_request().unwrap();
    let response = mock_proxy().query(&request).await.unwrap();

    let decoded = response.decode().unwrap();
    assert_eq!(decoded.request, request);
    assert_eq!(decoded.request_chain_id, 0);

    assert_eq!(response.signatures.len(), 1);
    let signature = response.signatures[0];
    assert_eq!(signature.guardian_index, 0);
    let address = signature
        .recover_address(&query_response_digest(response.bytes.as_slice()))
        .unwrap();
    assert_eq!(hex::encode(address), DEVNET_GUARDIAN_ADDRESS);

    let evm = signatures_to_evm_structs(&response.signatures);
    assert!(evm[0].v == 27 || evm[0].v == 28);
    assert_eq!(evm[0].r, signature.r);
}

#[tokio::test]
async fn test_expected_contract_state() {
    let request = QueryShape::WithClock.config().build_query_request().unwrap();
    let response = mock_proxy().query(&request).await.unwrap();
    let report = StakePoolReport::from_response_bytes(response.bytes.as_slice()).unwrap();

    let expected = OnChainPoolState::expected_from_report(&report).unwrap();
    assert_eq!(expected.rate, U256::from(1_098_719_330_308_576_848u128));
    assert_json_snapshot!(serde_json::json!({
        "blockTime": expected.block_time,
        "poolTokenSupply": expected.pool_token_supply,
        "rate": expected.rate.to_string(),
        "slot": expected.slot,
        "totalActiveStake": expected.total_active_stake,
    }), @r###"
    {
      "blockTime": 1707417004000000,
      "poolTokenSupply": 10533214337180367,
      "rate": "1098719330308576848",
      "slot": 251234567,
      "totalActiveStake": 11573046202543513
    }
    "###);

    let tampered = OnChainPoolState {
        pool_token_supply: expected.pool_token_supply + 1,
        ..expected
    };
    let err = verify_on_chain_state(&expected, &tampered).unwrap_err();
    assert_eq!(err.mismatches.len(), 1);
    assert_eq!(err.mismatches[0].field, "poolTokenSupply");
}

#[tokio::test]
async fn test_solidity_fixture_from_mock_response() {
    let request = QueryShape::WithClock.config().build_query_request().unwrap();
    let response = mock_proxy().query(&request).await.unwrap();
    let report = StakePoolReport::from_response_bytes(response.bytes.as_slice()).unwrap();
    let signatures = signatures_to_evm_structs(&response.signatures);

    let fixture =
        render_solidity_fixture(&response.bytes.to_hex(), &signatures[0], &report).unwrap();
    let lines: Vec<&str> = fixture.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "    // some happy case defaults");
    assert_eq!(
        lines[1],
        format!(
            "    bytes mockMainnetResponse = hex\"{}\";",
            response.bytes.to_hex()
        )
    );
    assert_eq!(
        lines[3],
        format!("    bytes32 mockMainnetSigR = 0x{};", hex::encode(signatures[0].r))
    );
    assert_eq!(lines[5], "    uint64 mockSlot = 251234567;");
    assert_eq!(lines[6], "    uint64 mockBlockTime = 1707417004000000;");
    assert_eq!(lines[7], "    uint64 mockEpoch = 578;");
    assert!(lines[10].starts_with("    uint256 mockRate = 1098719330308576848;"));
}

#[tokio::test]
async fn test_min_context_slot_not_reached() {
    let request = QueryShape::WithClock
        .config()
        .with_min_context_slot(NODE_SLOT + 2)
        .build_query_request()
        .unwrap();
    let err = mock_proxy().query(&request).await.unwrap_err();
    assert!(matches!(err, ProxyError::Rpc(_)));
}

#[tokio::test]
async fn test_missing_stake_pool_account() {
    let unknown = SerializablePubkey::new_unique();
    let request = StakePoolQueryConfig::two_field(unknown)
        .build_query_request()
        .unwrap();
    let err = mock_proxy().query(&request).await.unwrap_err();
    assert!(matches!(
        err,
        ProxyError::MissingAccount { account } if account == unknown.to_base58()
    ));
}
