//! Decoding of JSON-RPC quantities into display values.
//!
//! Node providers encode numeric results as `0x`-prefixed hexadecimal strings.
//! The helpers here parse those quantities and render them in the units the
//! dashboard shows (gwei for gas, plain decimal for block heights).

use serde_json::Value;

use crate::error::{FetchError, FetchResult};

const WEI_PER_GWEI_HUNDREDTH: u128 = 10_000_000;
const MAX_HEX_DIGITS: usize = 32;
const MAX_TOKEN_DECIMALS: u8 = 36;
const DISPLAY_DECIMALS: u32 = 4;

/// Parses a `0x`-prefixed hexadecimal quantity.
pub fn parse_hex_quantity(raw: &str) -> FetchResult<u128> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| FetchError::decode(format!("quantity '{raw}' is missing the 0x prefix")))?;

    if digits.is_empty() || digits.len() > MAX_HEX_DIGITS {
        return Err(FetchError::decode(format!(
            "quantity '{raw}' must have between 1 and {MAX_HEX_DIGITS} hex digits"
        )));
    }

    u128::from_str_radix(digits, 16)
        .map_err(|e| FetchError::decode(format!("quantity '{raw}' is not hexadecimal: {e}")))
}

/// Renders a wei amount as gwei with two decimals, rounding half up.
pub fn wei_to_gwei_string(wei: u128) -> String {
    let hundredths = wei / WEI_PER_GWEI_HUNDREDTH
        + u128::from(wei % WEI_PER_GWEI_HUNDREDTH >= WEI_PER_GWEI_HUNDREDTH / 2);
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// Decoder for `eth_gasPrice` results: hex wei to a gwei string.
pub fn decode_gas_price(result: &Value) -> FetchResult<String> {
    let wei = parse_hex_quantity(expect_str(result, "eth_gasPrice")?)?;
    Ok(wei_to_gwei_string(wei))
}

/// Decoder for `eth_blockNumber` results: hex height to a decimal string.
pub fn decode_block_number(result: &Value) -> FetchResult<String> {
    let height = parse_hex_quantity(expect_str(result, "eth_blockNumber")?)?;
    Ok(height.to_string())
}

/// Formats an integer base-unit amount with four decimals.
///
/// `format_token_amount("1000000000000000000", 18)` yields `"1.0000"`.
pub fn format_token_amount(raw: &str, decimals: u8) -> FetchResult<String> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(FetchError::decode(format!(
            "token decimals {decimals} exceed the supported maximum {MAX_TOKEN_DECIMALS}"
        )));
    }

    let amount: u128 = raw
        .trim()
        .parse()
        .map_err(|e| FetchError::decode(format!("token amount '{raw}' is not an integer: {e}")))?;

    let unit = 10_u128.pow(u32::from(decimals));
    let mut whole = amount / unit;
    let remainder = amount % unit;
    let display_unit = 10_u128.pow(DISPLAY_DECIMALS);

    let mut fraction = if u32::from(decimals) >= DISPLAY_DECIMALS {
        let divisor = 10_u128.pow(u32::from(decimals) - DISPLAY_DECIMALS);
        remainder / divisor + u128::from(divisor > 1 && remainder % divisor >= divisor / 2)
    } else {
        remainder * 10_u128.pow(DISPLAY_DECIMALS - u32::from(decimals))
    };

    if fraction >= display_unit {
        whole += 1;
        fraction -= display_unit;
    }

    Ok(format!("{whole}.{fraction:04}"))
}

fn expect_str<'a>(result: &'a Value, method: &str) -> FetchResult<&'a str> {
    result
        .as_str()
        .ok_or_else(|| {
            FetchError::decode(format!("{method} result must be a hex string, got {result}"))
        })
}
