//! Join engine: one denormalized row per post.
//!
//! JOIN ORDER (fixed):
//! ```text
//!   1. posts ⟕ influencers   on posts.influencer_id = influencers.ID
//!   2.       ⟕ payouts       on influencer_id
//!   3. tracking grouped by source (Σ orders, Σ revenue, first campaign)
//!   4.       ⟕ tracking agg  on posts.post_id = source
//! ```
//!
//! Every join is a left join. Unmatched keys never fail: influencer
//! fields become `None`, tracking totals become 0.

use crate::{
    loader::{Influencer, Payout, Post, RawTables, TrackingRecord},
    metrics,
    types::{Campaign, InfluencerId, Money, PostId},
};
use serde::{Deserialize, Serialize};
use std::collections::{hash_map::Entry, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub post_id: PostId,
    pub influencer_id: InfluencerId,
    pub caption: String,
    pub reach: u64,
    pub likes: u64,
    pub comments: u64,

    // Influencer side. `None` when the post's influencer is unknown.
    pub name: Option<String>,
    pub category: Option<String>,
    pub follower_count: Option<u64>,
    pub platform: Option<String>,

    // Payout side. `None` when the influencer has no payout record.
    pub total_payout: Option<Money>,

    // Tracking side.
    pub post_orders: u64,
    pub post_revenue: Money,
    pub campaign: Option<Campaign>,

    // Per-row metrics.
    pub engagement_rate: f64,
    pub cpm: f64,
    pub cpe: f64,
}

impl MergedRow {
    /// True when the post's influencer_id matched an influencer record.
    pub fn has_influencer(&self) -> bool {
        self.name.is_some()
    }

    pub fn payout_or_zero(&self) -> Money {
        self.total_payout.unwrap_or(0.0)
    }
}

/// Tracking totals for a single post.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PostPerformance {
    pub post_orders: u64,
    pub post_revenue: Money,
    pub campaign: Option<Campaign>,
}

/// Group tracking rows by `source`. The first non-empty campaign seen
/// for a source (in row order) wins; later different values are
/// discarded with a warning.
pub fn aggregate_tracking(tracking: &[TrackingRecord]) -> HashMap<PostId, PostPerformance> {
    let mut by_source: HashMap<PostId, PostPerformance> = HashMap::new();

    for record in tracking {
        let perf = by_source.entry(record.source.clone()).or_default();
        perf.post_orders = perf.post_orders.saturating_add(record.orders);
        perf.post_revenue += record.revenue;

        match (&perf.campaign, &record.campaign) {
            (None, Some(c)) => perf.campaign = Some(c.clone()),
            (Some(first), Some(c)) if first != c => {
                log::warn!(
                    "post {} tracked under several campaigns: keeping '{first}', dropping '{c}'",
                    record.source,
                );
            }
            _ => {}
        }
    }

    by_source
}

/// Index a table by key, keeping the first row per key.
fn index_first<'a, T>(
    rows: &'a [T],
    table: &str,
    key: impl Fn(&T) -> &InfluencerId,
) -> HashMap<&'a str, &'a T> {
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        match index.entry(key(row).as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(slot) => {
                log::warn!("duplicate {table} row for influencer {}: keeping the first", slot.key());
            }
        }
    }
    index
}

/// Merge the four raw tables into one row per post, in post order.
pub fn merge(
    influencers: &[Influencer],
    posts: &[Post],
    tracking: &[TrackingRecord],
    payouts: &[Payout],
) -> Vec<MergedRow> {
    let influencer_index = index_first(influencers, "influencer", |i| &i.id);
    let payout_index = index_first(payouts, "payout", |p| &p.influencer_id);
    let performance = aggregate_tracking(tracking);

    let mut orphans = 0usize;
    let mut matched_sources = 0usize;

    let rows: Vec<MergedRow> = posts
        .iter()
        .map(|post| {
            let influencer = influencer_index.get(post.influencer_id.as_str()).copied();
            if influencer.is_none() {
                orphans += 1;
            }
            let total_payout = payout_index
                .get(post.influencer_id.as_str())
                .map(|p| p.total_payout);
            let perf = performance.get(&post.post_id);
            if perf.is_some() {
                matched_sources += 1;
            }
            let perf = perf.cloned().unwrap_or_default();
            let payout = total_payout.unwrap_or(0.0);

            MergedRow {
                post_id: post.post_id.clone(),
                influencer_id: post.influencer_id.clone(),
                caption: post.caption.clone(),
                reach: post.reach,
                likes: post.likes,
                comments: post.comments,
                name: influencer.map(|i| i.name.clone()),
                category: influencer.map(|i| i.category.clone()),
                follower_count: influencer.map(|i| i.follower_count),
                platform: influencer.map(|i| i.platform.clone()),
                total_payout,
                post_orders: perf.post_orders,
                post_revenue: perf.post_revenue,
                campaign: perf.campaign,
                engagement_rate: metrics::engagement_rate(post.likes, post.comments, post.reach),
                cpm: metrics::cpm(payout, post.reach),
                cpe: metrics::cpe(payout, post.likes, post.comments),
            }
        })
        .collect();

    if orphans > 0 {
        log::warn!("{orphans} posts reference an unknown influencer");
    }
    let unmatched_tracking = performance.len().saturating_sub(matched_sources);
    if unmatched_tracking > 0 {
        log::debug!("{unmatched_tracking} tracking sources match no post");
    }
    log::info!("join: {} merged rows", rows.len());

    rows
}

/// Convenience over `merge` for a loaded table set.
pub fn merge_tables(tables: &RawTables) -> Vec<MergedRow> {
    merge(
        &tables.influencers,
        &tables.posts,
        &tables.tracking,
        &tables.payouts,
    )
}
