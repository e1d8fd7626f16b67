//! Report views over a filtered view.
//!
//! These are the numbers each report page shows: overview KPIs, the
//! top-N tables, best posts, payout details and the underperformer
//! review. All functions are pure and never fail; an empty view gives
//! zeroed KPIs and empty tables.

use crate::{
    aggregate::{CampaignSummary, InfluencerSummary},
    filter::FilteredView,
    join::MergedRow,
    metrics::compute_roi_roas,
    types::Money,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_revenue: Money,
    pub total_payout: Money,
    pub roas: f64,
    pub roi: f64,
    pub baseline_roas: f64,
}

/// Headline KPIs, summed over the filtered influencer table.
pub fn overview(view: &FilteredView) -> Overview {
    let total_revenue: Money = view.influencers.iter().map(|i| i.total_revenue).sum();
    let total_payout: Money = view.influencers.iter().map(|i| i.total_payout).sum();
    let m = compute_roi_roas(total_revenue, total_payout);
    Overview {
        total_revenue,
        total_payout,
        roas: m.roas,
        roi: m.roi,
        baseline_roas: view.baseline_roas,
    }
}

pub fn top_campaigns_by_roas(view: &FilteredView, n: usize) -> Vec<CampaignSummary> {
    let mut rows = view.campaigns.clone();
    rows.sort_by(|a, b| b.roas.total_cmp(&a.roas));
    rows.truncate(n);
    rows
}

/// Campaigns ordered by iROAS, best first.
pub fn campaigns_by_iroas(view: &FilteredView) -> Vec<CampaignSummary> {
    let mut rows = view.campaigns.clone();
    rows.sort_by(|a, b| b.iroas.total_cmp(&a.iroas));
    rows
}

pub fn top_influencers_by_revenue(view: &FilteredView, n: usize) -> Vec<InfluencerSummary> {
    let mut rows = view.influencers.clone();
    rows.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    rows.truncate(n);
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSortKey {
    #[default]
    PostRevenue,
    Likes,
    EngagementRate,
}

impl PostSortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post_revenue" => Some(Self::PostRevenue),
            "likes" => Some(Self::Likes),
            "engagement_rate" => Some(Self::EngagementRate),
            _ => None,
        }
    }

    fn value(&self, row: &MergedRow) -> f64 {
        match self {
            Self::PostRevenue => row.post_revenue,
            Self::Likes => row.likes as f64,
            Self::EngagementRate => row.engagement_rate,
        }
    }
}

pub fn top_posts(view: &FilteredView, key: PostSortKey, n: usize) -> Vec<MergedRow> {
    let mut rows = view.posts.clone();
    rows.sort_by(|a, b| key.value(b).total_cmp(&key.value(a)));
    rows.truncate(n);
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutLine {
    pub name: String,
    pub total_payout: Money,
}

/// Distinct (name, payout) pairs in influencer order.
pub fn payout_details(view: &FilteredView) -> Vec<PayoutLine> {
    let mut seen: BTreeSet<(&str, u64)> = BTreeSet::new();
    view.influencers
        .iter()
        .filter(|i| seen.insert((i.name.as_str(), i.total_payout.to_bits())))
        .map(|i| PayoutLine {
            name: i.name.clone(),
            total_payout: i.total_payout,
        })
        .collect()
}

/// Paid influencers whose ROAS falls below `roas_threshold`.
pub fn underperformers(view: &FilteredView, roas_threshold: f64) -> Vec<InfluencerSummary> {
    view.influencers
        .iter()
        .filter(|i| i.roas < roas_threshold && i.total_payout > 0.0)
        .cloned()
        .collect()
}
