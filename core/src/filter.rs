//! Filter engine: pure views over an immutable snapshot.
//!
//! Influencers are filtered by category and follower range, campaigns
//! by name. Posts are never filtered by their own predicates: a post is
//! kept when its influencer is in the filtered influencer set and its
//! campaign is in the filtered campaign set, so post tables always agree
//! with the summary tables next to them.

use crate::{
    aggregate::{CampaignSummary, InfluencerSummary},
    join::MergedRow,
    snapshot::{FollowerRange, ReportSnapshot},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub campaigns: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub followers: FollowerRange,
}

impl FilterSpec {
    /// Select every campaign, every category and the full follower range.
    pub fn all(snapshot: &ReportSnapshot) -> Self {
        let domains = &snapshot.domains;
        Self {
            campaigns: domains.campaigns.iter().cloned().collect(),
            categories: domains.categories.iter().cloned().collect(),
            followers: domains
                .followers
                .unwrap_or(FollowerRange { min: 0, max: u64::MAX }),
        }
    }

    pub fn with_campaigns<I, S>(mut self, campaigns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.campaigns = campaigns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_followers(mut self, min: u64, max: u64) -> Self {
        self.followers = FollowerRange { min, max };
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewTable {
    Influencers,
    Campaigns,
    Posts,
}

/// Non-fatal conditions attached to a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterWarning {
    /// The selection produced no rows for this table.
    EmptyResult { table: ViewTable },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredView {
    pub influencers: Vec<InfluencerSummary>,
    pub campaigns: Vec<CampaignSummary>,
    pub posts: Vec<MergedRow>,
    /// Always the snapshot's baseline.
    pub baseline_roas: f64,
    pub warnings: Vec<FilterWarning>,
}

impl FilteredView {
    pub fn is_empty(&self) -> bool {
        self.influencers.is_empty() && self.campaigns.is_empty() && self.posts.is_empty()
    }
}

pub fn apply_filters(snapshot: &ReportSnapshot, spec: &FilterSpec) -> FilteredView {
    let influencers: Vec<InfluencerSummary> = snapshot
        .influencers
        .iter()
        .filter(|i| spec.categories.contains(&i.category) && spec.followers.contains(i.follower_count))
        .cloned()
        .collect();

    let campaigns: Vec<CampaignSummary> = snapshot
        .campaigns
        .iter()
        .filter(|c| spec.campaigns.contains(&c.campaign))
        .cloned()
        .collect();

    let influencer_ids: BTreeSet<&str> = influencers.iter().map(|i| i.influencer_id.as_str()).collect();
    let campaign_names: BTreeSet<&str> = campaigns.iter().map(|c| c.campaign.as_str()).collect();

    let posts: Vec<MergedRow> = snapshot
        .merged
        .iter()
        .filter(|row| {
            influencer_ids.contains(row.influencer_id.as_str())
                && row
                    .campaign
                    .as_deref()
                    .is_some_and(|c| campaign_names.contains(c))
        })
        .cloned()
        .collect();

    let mut warnings = Vec::new();
    for (table, empty) in [
        (ViewTable::Influencers, influencers.is_empty()),
        (ViewTable::Campaigns, campaigns.is_empty()),
        (ViewTable::Posts, posts.is_empty()),
    ] {
        if empty {
            warnings.push(FilterWarning::EmptyResult { table });
        }
    }
    if !warnings.is_empty() {
        log::debug!("filter produced empty tables: {warnings:?}");
    }

    FilteredView {
        influencers,
        campaigns,
        posts,
        baseline_roas: snapshot.baseline_roas,
        warnings,
    }
}
