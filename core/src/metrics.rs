//! Metric calculator: pure, total ratio functions.
//!
//! Every function here returns a finite number for any input.
//! A zero (or non-finite) denominator yields 0, never NaN or infinity.

use crate::types::Money;
use serde::{Deserialize, Serialize};

/// Reach is priced per thousand impressions.
pub const CPM_UNIT: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoiRoas {
    pub roas: f64,
    pub roi: f64,
}

/// ROAS = revenue / payout, ROI = (revenue - payout) / payout.
/// Both are 0 when payout is not positive.
pub fn compute_roi_roas(revenue: Money, payout: Money) -> RoiRoas {
    if !payout.is_finite() || payout <= 0.0 || !revenue.is_finite() {
        return RoiRoas::default();
    }
    RoiRoas {
        roas: revenue / payout,
        roi: (revenue - payout) / payout,
    }
}

/// (likes + comments) / reach. Summed in f64 so counts near `u64::MAX`
/// cannot overflow.
pub fn engagement_rate(likes: u64, comments: u64, reach: u64) -> f64 {
    if reach == 0 {
        return 0.0;
    }
    (likes as f64 + comments as f64) / reach as f64
}

/// Payout per thousand reach.
pub fn cpm(payout: Money, reach: u64) -> f64 {
    if reach == 0 || !payout.is_finite() {
        return 0.0;
    }
    payout / (reach as f64 / CPM_UNIT)
}

/// Payout per engagement (like or comment).
pub fn cpe(payout: Money, likes: u64, comments: u64) -> f64 {
    let engagements = likes as f64 + comments as f64;
    if engagements == 0.0 || !payout.is_finite() {
        return 0.0;
    }
    payout / engagements
}

/// Plain ratio guarded the same way as ROAS. Used for report KPIs.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if !denominator.is_finite() || denominator <= 0.0 || !numerator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}
