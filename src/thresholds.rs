//! Ascending threshold tables partitioning smoothed rates into tiers

use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Threshold table used by the BrowserBeats demo
pub const DEFAULT_THRESHOLDS: [f64; 5] = [100.0, 200.0, 500.0, 1000.0, 2000.0];

/// Immutable ascending sequence of tier boundaries.
///
/// A table of length `n` yields tiers `0..=n`; tier `n` means the smoothed
/// rate is at or above every threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ThresholdTable {
    thresholds: Vec<f64>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
        }
    }
}

impl ThresholdTable {
    /// Build a table, rejecting non-finite values and descending neighbours
    pub fn new(thresholds: Vec<f64>) -> Result<Self, ComputeError> {
        if let Some(bad) = thresholds.iter().find(|t| !t.is_finite()) {
            return Err(ComputeError::InvalidThresholds(format!(
                "threshold {} is not finite",
                bad
            )));
        }

        if let Some(i) = thresholds.windows(2).position(|w| w[1] < w[0]) {
            return Err(ComputeError::InvalidThresholds(format!(
                "thresholds must be ascending, but {} follows {} at index {}",
                thresholds[i + 1],
                thresholds[i],
                i + 1
            )));
        }

        Ok(Self { thresholds })
    }

    /// Classify a smoothed rate: index of the first threshold strictly above
    /// it, or `len()` when none is.
    pub fn classify(&self, smoothed_rate: i64) -> usize {
        let rate = smoothed_rate as f64;
        self.thresholds
            .iter()
            .position(|&t| rate < t)
            .unwrap_or(self.thresholds.len())
    }

    /// Number of thresholds (also the highest reachable tier)
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Number of distinct tiers this table produces
    pub fn tier_count(&self) -> usize {
        self.thresholds.len() + 1
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.thresholds
    }

    /// Parse a comma-separated list such as `100,200,500`
    pub fn parse_list(list: &str) -> Result<Self, ComputeError> {
        let thresholds = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>().map_err(|e| {
                    ComputeError::InvalidThresholds(format!("'{}' is not a number: {}", s, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(thresholds)
    }
}

impl TryFrom<Vec<f64>> for ThresholdTable {
    type Error = ComputeError;

    fn try_from(thresholds: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(thresholds)
    }
}

impl From<ThresholdTable> for Vec<f64> {
    fn from(table: ThresholdTable) -> Self {
        table.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_classification() {
        let table = ThresholdTable::default();
        assert_eq!(table.classify(50), 0);
        assert_eq!(table.classify(150), 1);
        assert_eq!(table.classify(499), 2);
        assert_eq!(table.classify(999), 3);
        assert_eq!(table.classify(1999), 4);
        assert_eq!(table.classify(3000), 5);
    }

    #[test]
    fn test_boundary_is_not_below() {
        let table = ThresholdTable::default();
        // Strictly-below comparison: equal to a threshold moves up a tier
        assert_eq!(table.classify(100), 1);
        assert_eq!(table.classify(2000), 5);
    }

    #[test]
    fn test_empty_table_is_single_tier() {
        let table = ThresholdTable::new(vec![]).unwrap();
        assert_eq!(table.classify(0), 0);
        assert_eq!(table.classify(1_000_000), 0);
        assert_eq!(table.tier_count(), 1);
    }

    #[test]
    fn test_rejects_descending() {
        let err = ThresholdTable::new(vec![100.0, 50.0]).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidThresholds(_)));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(ThresholdTable::new(vec![100.0, f64::NAN]).is_err());
        assert!(ThresholdTable::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn test_equal_neighbours_accepted() {
        let table = ThresholdTable::new(vec![100.0, 100.0, 200.0]).unwrap();
        assert_eq!(table.classify(99), 0);
        assert_eq!(table.classify(100), 2);
    }

    #[test]
    fn test_classification_is_monotonic() {
        let table = ThresholdTable::default();
        let mut last = 0;
        for rate in (0..3000).step_by(7) {
            let tier = table.classify(rate);
            assert!(tier >= last);
            last = tier;
        }
    }

    #[test]
    fn test_parse_list() {
        let table = ThresholdTable::parse_list("100, 200,500").unwrap();
        assert_eq!(table.as_slice(), &[100.0, 200.0, 500.0]);
        assert!(ThresholdTable::parse_list("100,abc").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let table: ThresholdTable = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(table.len(), 3);
        assert!(serde_json::from_str::<ThresholdTable>("[3, 2]").is_err());
        assert_eq!(serde_json::to_string(&table).unwrap(), "[1.0,2.0,3.0]");
    }
}
