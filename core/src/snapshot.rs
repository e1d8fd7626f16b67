//! Report snapshot and its cache.
//!
//! A snapshot is the complete, immutable output of one pipeline run:
//! the merged table, both summary tables, the baseline and the filter
//! domains. It is shared behind an `Arc` and never mutated.
//!
//! The cache holds at most one snapshot, keyed by a SHA-256 fingerprint
//! of the four raw inputs together with the payout attribution the
//! snapshot was computed under. Identical inputs under the same
//! attribution return the cached `Arc`.

use crate::{
    aggregate::{CampaignSummary, InfluencerSummary, Unattributed},
    config::PayoutAttribution,
    join::MergedRow,
    loader::{RawInputs, SourceTable},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{collections::BTreeSet, fmt, sync::Arc};

// ── Fingerprint ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFingerprint(String);

impl InputFingerprint {
    /// Hash the four tables in a fixed order. Each table is prefixed by
    /// its name and byte length so content cannot shift between tables.
    pub fn of(inputs: &RawInputs) -> Self {
        let mut hasher = Sha256::new();
        for table in SourceTable::all() {
            let bytes = inputs.bytes(table);
            hasher.update(table.name().as_bytes());
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

/// Inclusive follower-count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerRange {
    pub min: u64,
    pub max: u64,
}

impl FollowerRange {
    pub fn contains(&self, followers: u64) -> bool {
        self.min <= followers && followers <= self.max
    }
}

/// Values the presentation layer offers as filter choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDomains {
    pub campaigns: Vec<String>,
    pub categories: Vec<String>,
    /// `None` when there are no influencer rows.
    pub followers: Option<FollowerRange>,
}

impl FilterDomains {
    pub fn from_tables(influencers: &[InfluencerSummary], campaigns: &[CampaignSummary]) -> Self {
        let campaign_set: BTreeSet<&str> = campaigns.iter().map(|c| c.campaign.as_str()).collect();
        let category_set: BTreeSet<&str> =
            influencers.iter().map(|i| i.category.as_str()).collect();
        let min = influencers.iter().map(|i| i.follower_count).min();
        let max = influencers.iter().map(|i| i.follower_count).max();

        Self {
            campaigns: campaign_set.into_iter().map(String::from).collect(),
            categories: category_set.into_iter().map(String::from).collect(),
            followers: min.zip(max).map(|(min, max)| FollowerRange { min, max }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub fingerprint: InputFingerprint,
    /// Campaign payout rule the tables were computed with.
    pub attribution: PayoutAttribution,
    pub merged: Vec<MergedRow>,
    pub influencers: Vec<InfluencerSummary>,
    pub campaigns: Vec<CampaignSummary>,
    pub baseline_roas: f64,
    pub unattributed: Unattributed,
    pub domains: FilterDomains,
}

// ── Cache ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SnapshotCache {
    entry: Option<Arc<ReportSnapshot>>,
    hits: u64,
    misses: u64,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached snapshot for `fingerprint` computed under `attribution`, if any.
    pub fn get(
        &mut self,
        fingerprint: &InputFingerprint,
        attribution: PayoutAttribution,
    ) -> Option<Arc<ReportSnapshot>> {
        match &self.entry {
            Some(snapshot)
                if snapshot.fingerprint == *fingerprint && snapshot.attribution == attribution =>
            {
                self.hits += 1;
                log::debug!("snapshot cache hit ({fingerprint})");
                Some(Arc::clone(snapshot))
            }
            _ => {
                self.misses += 1;
                log::debug!("snapshot cache miss ({fingerprint})");
                None
            }
        }
    }

    /// Replace the cached snapshot.
    pub fn store(&mut self, snapshot: ReportSnapshot) -> Arc<ReportSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.entry = Some(Arc::clone(&snapshot));
        snapshot
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::debug!("snapshot cache invalidated");
        }
    }

    pub fn current(&self) -> Option<Arc<ReportSnapshot>> {
        self.entry.clone()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
