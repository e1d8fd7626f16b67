//! The report engine: runs the pipeline and owns the snapshot cache.
//!
//! EXECUTION ORDER (fixed, never reordered):
//!   1. Read all four sources          (loader)
//!   2. Fingerprint the raw bytes      (snapshot)  → cache hit returns here
//!      (a hit also needs the same payout attribution)
//!   3. Parse into typed tables        (loader)
//!   4. Join into one row per post     (join, per-row metrics)
//!   5. Group by influencer, campaign  (aggregate, per-group metrics)
//!   6. Baseline ROAS and iROAS        (incrementality)
//!   7. Filter domains, snapshot
//!
//! RULES:
//!   - A failure at any step returns the error; nothing is cached.
//!   - The snapshot is immutable once built. Filters read it by reference.

use crate::{
    aggregate::{self, Aggregates},
    config::{PayoutAttribution, ReportConfig},
    error::ReportResult,
    filter::{apply_filters, FilterSpec, FilteredView},
    incrementality::apply_incrementality,
    join,
    loader::{RawInputs, RawTables, TableSource},
    snapshot::{FilterDomains, InputFingerprint, ReportSnapshot, SnapshotCache},
};
use std::sync::Arc;

pub struct ReportEngine {
    pub config: ReportConfig,
    cache: SnapshotCache,
}

impl ReportEngine {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            cache: SnapshotCache::new(),
        }
    }

    /// Snapshot for the current content of `source`. Recomputes only
    /// when the inputs or the payout attribution changed since the
    /// cached snapshot was built.
    pub fn snapshot(&mut self, source: &dyn TableSource) -> ReportResult<Arc<ReportSnapshot>> {
        let inputs = RawInputs::read_all(source)?;
        let fingerprint = InputFingerprint::of(&inputs);

        // A hit needs the same attribution as well as the same bytes.
        if let Some(snapshot) = self.cache.get(&fingerprint, self.config.campaign_payout) {
            return Ok(snapshot);
        }

        let snapshot = build_snapshot(&inputs, fingerprint, self.config.campaign_payout)?;
        Ok(self.cache.store(snapshot))
    }

    /// Snapshot filtered by `spec`. The baseline is the unfiltered one.
    pub fn filtered(
        &mut self,
        source: &dyn TableSource,
        spec: &FilterSpec,
    ) -> ReportResult<FilteredView> {
        let snapshot = self.snapshot(source)?;
        Ok(apply_filters(&snapshot, spec))
    }

    /// Drop the cached snapshot; the next call recomputes.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }
}

/// Parse and compute a snapshot from raw inputs.
pub fn build_snapshot(
    inputs: &RawInputs,
    fingerprint: InputFingerprint,
    attribution: PayoutAttribution,
) -> ReportResult<ReportSnapshot> {
    let tables = inputs.parse()?;
    Ok(compute_snapshot(&tables, fingerprint, attribution))
}

/// Steps 4–7 on already-parsed tables. Infallible.
pub fn compute_snapshot(
    tables: &RawTables,
    fingerprint: InputFingerprint,
    attribution: PayoutAttribution,
) -> ReportSnapshot {
    let merged = join::merge_tables(tables);

    let Aggregates {
        mut influencers,
        mut campaigns,
        unattributed,
    } = aggregate::aggregate(&merged, attribution);

    let baseline_roas = apply_incrementality(&mut influencers, &mut campaigns);
    let domains = FilterDomains::from_tables(&influencers, &campaigns);

    log::info!(
        "snapshot {}: {} posts, {} influencers, {} campaigns",
        fingerprint,
        merged.len(),
        influencers.len(),
        campaigns.len(),
    );

    ReportSnapshot {
        fingerprint,
        attribution,
        merged,
        influencers,
        campaigns,
        baseline_roas,
        unattributed,
        domains,
    }
}
