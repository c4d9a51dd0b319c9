//! Disjoint particle-size bins from the cumulative counts a PMS5003-style
//! sensor reports.
//!
//! The sensor gives "particles at or above size X" for six thresholds. The
//! dashboard plots how many particles fall *between* neighbouring thresholds,
//! so each bin is derived from the largest size downwards:
//!
//! - `>10.0um` is the raw count at 10.0
//! - every smaller bin subtracts all bins above it from its own raw count
//!
//! Noise on the sensor side can make a bin negative. That is kept by default
//! and can be clamped through [`NegativeBinPolicy`].
use serde::{Deserialize, Serialize};
/// Size thresholds in micrometres, smallest first.
pub const THRESHOLDS_UM: [f64; 6] = [0.3, 0.5, 1.0, 2.5, 5.0, 10.0];
/// Number of bins (and raw counts) per reading.
pub const BIN_COUNT: usize = THRESHOLDS_UM.len();
/// Default channel names, one per bin, smallest first.
pub const CHANNEL_NAMES: [&str; BIN_COUNT] =
    [">0.3um", ">0.5um", ">1.0um", ">2.5um", ">5.0um", ">10.0um"];
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeBinPolicy {
    /// Record negative bins as they are; they are noise, not an error.
    #[default]
    Keep,
    /// Floor every bin at zero after the full derivation.
    Clamp,
}
/// Raw counts per unit volume at or above each threshold, smallest first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CumulativeCounts(pub [f64; BIN_COUNT]);
/// Disjoint counts per size band, smallest first:
/// `[0.3-0.5, 0.5-1.0, 1.0-2.5, 2.5-5.0, 5.0-10.0, 10.0+]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticulateBins(pub [f64; BIN_COUNT]);
impl CumulativeCounts {
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let counts: [f64; BIN_COUNT] = values.try_into().ok()?;
        Some(Self(counts))
    }
    pub fn derive_bins(&self, policy: NegativeBinPolicy) -> ParticulateBins {
        let mut bins = [0.0; BIN_COUNT];
        let mut larger = 0.0;
        for idx in (0..BIN_COUNT).rev() {
            bins[idx] = self.0[idx] - larger;
            larger += bins[idx];
        }
        if policy == NegativeBinPolicy::Clamp {
            for bin in &mut bins {
                *bin = bin.max(0.0);
            }
        }
        ParticulateBins(bins)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn bins_match_reference_counts() {
        let counts = CumulativeCounts([100.0, 80.0, 55.0, 30.0, 12.0, 3.0]);
        let bins = counts.derive_bins(NegativeBinPolicy::Keep);
        assert_eq!(bins.0, [20.0, 25.0, 25.0, 18.0, 9.0, 3.0]);
    }
    #[test]
    fn bins_sum_back_to_smallest_threshold() {
        let counts = CumulativeCounts([912.0, 301.0, 44.0, 7.0, 2.0, 0.0]);
        let bins = counts.derive_bins(NegativeBinPolicy::Keep);
        assert_eq!(bins.0.iter().sum::<f64>(), 912.0);
    }
    #[test]
    fn noisy_counts_keep_negative_bins_by_default() {
        // 2.5um reads lower than 5.0um.
        let counts = CumulativeCounts([50.0, 40.0, 20.0, 5.0, 8.0, 1.0]);
        let kept = counts.derive_bins(NegativeBinPolicy::Keep);
        assert_eq!(kept.0[3], -3.0);
        let clamped = counts.derive_bins(NegativeBinPolicy::Clamp);
        assert_eq!(clamped.0[3], 0.0);
        // Clamping happens after derivation; other bins are untouched.
        assert_eq!(clamped.0[2], kept.0[2]);
    }
    #[test]
    fn from_slice_requires_six_values() {
        assert!(CumulativeCounts::from_slice(&[1.0, 2.0]).is_none());
        assert!(CumulativeCounts::from_slice(&[6.0, 5.0, 4.0, 3.0, 2.0, 1.0]).is_some());
    }
    #[test]
    fn policy_parses_lowercase() {
        let policy: NegativeBinPolicy = serde_json::from_str("\"clamp\"").unwrap();
        assert_eq!(policy, NegativeBinPolicy::Clamp);
    }
}
