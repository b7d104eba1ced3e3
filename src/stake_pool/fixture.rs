//! Renders a signed mock response as Solidity test defaults.

use super::{StakePoolError, StakePoolReport};
use crate::query::signature::EvmSignature;

/// Formats the `// some happy case defaults` block pasted into the rate contract's Forge tests.
///
/// Needs a report decoded from a query that included the clock sysvar.
pub fn render_solidity_fixture(
    response_hex: &str,
    signature: &EvmSignature,
    report: &StakePoolReport,
) -> Result<String, StakePoolError> {
    let epoch = report.clock_epoch().ok_or(StakePoolError::MissingClock)?;
    let rate = report.exchange_rate()?;
    let response_hex = response_hex.strip_prefix("0x").unwrap_or(response_hex);

    let lines = [
        "    // some happy case defaults".to_string(),
        format!("    bytes mockMainnetResponse = hex\"{}\";", response_hex),
        format!("    uint8 mockMainnetSigV = 0x{:02x};", signature.v),
        format!("    bytes32 mockMainnetSigR = 0x{};", hex::encode(signature.r)),
        format!("    bytes32 mockMainnetSigS = 0x{};", hex::encode(signature.s)),
        format!("    uint64 mockSlot = {};", report.slot_number),
        format!("    uint64 mockBlockTime = {};", report.block_time.as_micros()),
        format!("    uint64 mockEpoch = {};", epoch),
        format!(
            "    uint64 mockTotalActiveStake = {};",
            report.fields.total_active_stake
        ),
        format!(
            "    uint64 mockPoolTokenSupply = {};",
            report.fields.pool_token_supply
        ),
        format!(
            "    uint256 mockRate = {}; // (mockTotalActiveStake * (10 ** 18)) / mockPoolTokenSupply",
            rate
        ),
    ];
    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}
