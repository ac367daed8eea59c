// In crates/core-types/src/request.rs
//
// Raw inputs exactly as the user typed them. Nothing here is validated.

use serde::{Deserialize, Serialize};

/// Per-instrument fields supplied at calculation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInstrumentInput {
    pub name: String,
    pub live_price: String,
    /// Overrides the configured minimum stake.
    #[serde(default)]
    pub min_stake: Option<String>,
    /// Overrides the configured margin at minimum stake.
    #[serde(default)]
    pub margin_at_min_stake: Option<String>,
}

impl RawInstrumentInput {
    pub fn new(name: impl Into<String>, live_price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            live_price: live_price.into(),
            ..Default::default()
        }
    }

    pub fn with_min_stake(
        mut self,
        min_stake: impl Into<String>,
        margin_at_min_stake: impl Into<String>,
    ) -> Self {
        self.min_stake = Some(min_stake.into());
        self.margin_at_min_stake = Some(margin_at_min_stake.into());
        self
    }
}

/// A sizing request against a configured portfolio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSizingRequest {
    pub account_balance: String,
    /// Percentage units: "20" means 20%.
    pub margin_usage_percent: String,
    pub instruments: Vec<RawInstrumentInput>,
}

impl RawSizingRequest {
    pub fn input(&self, name: &str) -> Option<&RawInstrumentInput> {
        self.instruments.iter().find(|i| i.name == name)
    }
}

/// One row of a user-defined instrument table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub name: String,
    pub sector: String,
    /// Percentage units.
    pub weight: String,
    pub live_price: String,
    pub min_stake: String,
    pub margin_at_min_stake: String,
}

impl TableRow {
    /// Parses `name,sector,weight,price,min_stake,margin_at_min`. Missing trailing
    /// fields are left blank so the row is excluded later, not rejected here.
    pub fn from_csv(line: &str) -> Self {
        let mut fields = line.split(',').map(|f| f.trim().to_string());
        let mut next = || fields.next().unwrap_or_default();
        Self {
            name: next(),
            sector: next(),
            weight: next(),
            live_price: next(),
            min_stake: next(),
            margin_at_min_stake: next(),
        }
    }
}

/// A dynamic-table sizing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTableRequest {
    pub account_balance: String,
    pub margin_usage_percent: String,
    pub rows: Vec<TableRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_row_pads_missing_fields() {
        let row = TableRow::from_csv(" Gilt , Bond, 44.3 ,95.2");
        assert_eq!(row.name, "Gilt");
        assert_eq!(row.sector, "Bond");
        assert_eq!(row.weight, "44.3");
        assert_eq!(row.live_price, "95.2");
        assert!(row.min_stake.is_empty());
        assert!(row.margin_at_min_stake.is_empty());
    }
}
