//! Aggregator: merged rows into influencer and campaign summaries.
//!
//! Influencers are grouped by id alone. The first row seen for an id
//! supplies its attributes, so inconsistent attribute values across rows
//! never split one influencer into several summaries.
//!
//! Campaigns are grouped by campaign name. Rows without a campaign are
//! left out of the campaign table and tallied in `Unattributed`.
//!
//! Both tables come out sorted by their key.

use crate::{
    config::PayoutAttribution,
    join::MergedRow,
    metrics::compute_roi_roas,
    types::{Campaign, InfluencerId, Money},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluencerSummary {
    pub influencer_id: InfluencerId,
    pub name: String,
    pub category: String,
    pub follower_count: u64,
    pub platform: String,
    pub total_payout: Money,
    pub post_count: u64,
    pub total_revenue: Money,
    pub total_orders: u64,
    pub total_reach: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_engagement_rate: f64,
    pub roas: f64,
    pub roi: f64,
    /// Filled in by the incrementality estimator.
    pub iroas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub campaign: Campaign,
    pub revenue: Money,
    pub total_payout: Money,
    pub unique_influencers: u64,
    pub roas: f64,
    pub roi: f64,
    /// Filled in by the incrementality estimator.
    pub iroas: f64,
}

/// Rows that could not be placed in one of the summary tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unattributed {
    /// Posts with no campaign (no tracking, or an empty campaign cell).
    pub posts_without_campaign: u64,
    pub revenue_without_campaign: Money,
    /// Posts whose influencer_id matched no influencer record.
    pub posts_without_influencer: u64,
    pub revenue_without_influencer: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub influencers: Vec<InfluencerSummary>,
    pub campaigns: Vec<CampaignSummary>,
    pub unattributed: Unattributed,
}

// ── Influencer level ─────────────────────────────────────────────────────────

struct InfluencerAcc {
    summary: InfluencerSummary,
    engagement_sum: f64,
}

pub fn aggregate_influencers(rows: &[MergedRow]) -> Vec<InfluencerSummary> {
    let mut groups: BTreeMap<&str, InfluencerAcc> = BTreeMap::new();

    for row in rows {
        // A row without an influencer record has no attributes to group by.
        let (Some(name), Some(category), Some(follower_count), Some(platform)) = (
            row.name.as_ref(),
            row.category.as_ref(),
            row.follower_count,
            row.platform.as_ref(),
        ) else {
            continue;
        };

        let acc = groups
            .entry(row.influencer_id.as_str())
            .or_insert_with(|| InfluencerAcc {
                summary: InfluencerSummary {
                    influencer_id: row.influencer_id.clone(),
                    name: name.clone(),
                    category: category.clone(),
                    follower_count,
                    platform: platform.clone(),
                    total_payout: row.payout_or_zero(),
                    post_count: 0,
                    total_revenue: 0.0,
                    total_orders: 0,
                    total_reach: 0,
                    total_likes: 0,
                    total_comments: 0,
                    avg_engagement_rate: 0.0,
                    roas: 0.0,
                    roi: 0.0,
                    iroas: 0.0,
                },
                engagement_sum: 0.0,
            });

        if acc.summary.name != *name || acc.summary.category != *category {
            log::debug!(
                "influencer {} has drifting attributes; keeping first-seen values",
                row.influencer_id
            );
        }

        let s = &mut acc.summary;
        s.post_count += 1;
        s.total_revenue += row.post_revenue;
        // Counts come straight from the CSV; sums saturate instead of wrapping.
        s.total_orders = s.total_orders.saturating_add(row.post_orders);
        s.total_reach = s.total_reach.saturating_add(row.reach);
        s.total_likes = s.total_likes.saturating_add(row.likes);
        s.total_comments = s.total_comments.saturating_add(row.comments);
        acc.engagement_sum += row.engagement_rate;
    }

    groups
        .into_values()
        .map(|acc| {
            let mut s = acc.summary;
            s.avg_engagement_rate = if s.post_count > 0 {
                acc.engagement_sum / s.post_count as f64
            } else {
                0.0
            };
            let m = compute_roi_roas(s.total_revenue, s.total_payout);
            s.roas = m.roas;
            s.roi = m.roi;
            s
        })
        .collect()
}

// ── Campaign level ───────────────────────────────────────────────────────────

#[derive(Default)]
struct CampaignAcc<'a> {
    revenue: Money,
    per_post_payout: Money,
    influencer_payouts: BTreeMap<&'a str, Money>,
}

pub fn aggregate_campaigns(
    rows: &[MergedRow],
    attribution: PayoutAttribution,
) -> Vec<CampaignSummary> {
    let mut groups: BTreeMap<&str, CampaignAcc<'_>> = BTreeMap::new();

    for row in rows {
        let Some(campaign) = row.campaign.as_deref() else {
            continue;
        };
        let acc = groups.entry(campaign).or_default();
        acc.revenue += row.post_revenue;
        acc.per_post_payout += row.payout_or_zero();
        acc.influencer_payouts
            .entry(row.influencer_id.as_str())
            .or_insert_with(|| row.payout_or_zero());
    }

    groups
        .into_iter()
        .map(|(campaign, acc)| {
            let total_payout = match attribution {
                PayoutAttribution::PerPost => acc.per_post_payout,
                PayoutAttribution::PerInfluencer => acc.influencer_payouts.values().sum(),
            };
            let m = compute_roi_roas(acc.revenue, total_payout);
            CampaignSummary {
                campaign: campaign.to_string(),
                revenue: acc.revenue,
                total_payout,
                unique_influencers: acc.influencer_payouts.len() as u64,
                roas: m.roas,
                roi: m.roi,
                iroas: 0.0,
            }
        })
        .collect()
}

// ── Both levels ──────────────────────────────────────────────────────────────

pub fn unattributed(rows: &[MergedRow]) -> Unattributed {
    let mut u = Unattributed::default();
    for row in rows {
        if row.campaign.is_none() {
            u.posts_without_campaign += 1;
            u.revenue_without_campaign += row.post_revenue;
        }
        if !row.has_influencer() {
            u.posts_without_influencer += 1;
            u.revenue_without_influencer += row.post_revenue;
        }
    }
    u
}

pub fn aggregate(rows: &[MergedRow], attribution: PayoutAttribution) -> Aggregates {
    let influencers = aggregate_influencers(rows);
    let campaigns = aggregate_campaigns(rows, attribution);
    let unattributed = unattributed(rows);

    if unattributed.posts_without_campaign > 0 {
        log::warn!(
            "{} posts have no campaign and are left out of the campaign table",
            unattributed.posts_without_campaign
        );
    }

    let distinct: BTreeSet<&str> = rows.iter().map(|r| r.influencer_id.as_str()).collect();
    log::info!(
        "aggregate: {} influencer rows ({} distinct ids in posts), {} campaign rows",
        influencers.len(),
        distinct.len(),
        campaigns.len(),
    );

    Aggregates {
        influencers,
        campaigns,
        unattributed,
    }
}
