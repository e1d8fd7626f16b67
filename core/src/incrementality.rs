//! Incrementality estimator: iROAS against one global baseline.
//!
//! The baseline is Σ revenue / Σ payout over the full, unfiltered
//! campaign table. It is computed once per snapshot and never per
//! filter, so iROAS values stay comparable across filtered views.

use crate::{
    aggregate::{CampaignSummary, InfluencerSummary},
    metrics::safe_ratio,
};

/// Σ campaign revenue / Σ campaign payout, 0 when total payout is 0.
pub fn baseline_roas(campaigns: &[CampaignSummary]) -> f64 {
    let revenue: f64 = campaigns.iter().map(|c| c.revenue).sum();
    let payout: f64 = campaigns.iter().map(|c| c.total_payout).sum();
    safe_ratio(revenue, payout)
}

/// Compute the baseline and write `iroas = roas - baseline` into every
/// row of both tables. Returns the baseline.
pub fn apply_incrementality(
    influencers: &mut [InfluencerSummary],
    campaigns: &mut [CampaignSummary],
) -> f64 {
    let baseline = baseline_roas(campaigns);
    for c in campaigns.iter_mut() {
        c.iroas = c.roas - baseline;
    }
    for i in influencers.iter_mut() {
        i.iroas = i.roas - baseline;
    }
    log::info!("incrementality: baseline ROAS {baseline:.4}");
    baseline
}
