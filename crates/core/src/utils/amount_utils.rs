use rust_decimal::Decimal;
use std::str::FromStr;

use crate::constants::AGGREGATE_DECIMAL_PLACES;
use crate::errors::Result;

/// Parses a stored or submitted amount.
///
/// Accepts plain decimals (`"25"`, `"25.0"`, `"25.00"`) and the exponent
/// form older clients wrote for large floats (`"1.0E7"`).
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if trimmed.contains(['e', 'E']) {
        return Ok(Decimal::from_scientific(trimmed)?);
    }
    Ok(Decimal::from_str(trimmed)?)
}

/// Formats an amount with exactly two fractional digits.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(AGGREGATE_DECIMAL_PLACES);
    rounded.rescale(AGGREGATE_DECIMAL_PLACES);
    rounded.to_string()
}
