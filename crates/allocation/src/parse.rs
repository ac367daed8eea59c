use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a user-typed number. Plain and scientific notation are accepted.
pub(crate) fn parse_decimal(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}
