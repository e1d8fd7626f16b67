mod common;

use common::*;
use influence_core::{
    config::{PayoutAttribution, ReportConfig},
    dataset_generator::{self, GeneratorConfig},
    engine::ReportEngine,
    loader::{DirSource, SourceTable},
};
use std::sync::Arc;

#[test]
fn identical_inputs_give_identical_snapshots() {
    let a = fixture_snapshot();
    let b = fixture_snapshot();

    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(*a, *b);
}

#[test]
fn unchanged_inputs_hit_the_cache() {
    let source = fixture_source();
    let mut engine = ReportEngine::new(ReportConfig::default());

    let first = engine.snapshot(&source).unwrap();
    let second = engine.snapshot(&source).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.cache().misses(), 1);
    assert_eq!(engine.cache().hits(), 1);
}

#[test]
fn changed_inputs_recompute() {
    let mut source = fixture_source();
    let mut engine = ReportEngine::new(ReportConfig::default());
    let before = engine.snapshot(&source).unwrap();

    source.set_table(
        SourceTable::Payouts,
        "influencer_id,total_payout\nINF1,500\nINF2,1000\nINF3,300\n",
    );
    let after = engine.snapshot(&source).unwrap();

    assert_ne!(before.fingerprint, after.fingerprint);
    assert_eq!(engine.cache().misses(), 2);
    let inf1 = after.influencers.iter().find(|i| i.influencer_id == "INF1").unwrap();
    assert_close(inf1.roas, 3.0, "roas after payout change");
}

#[test]
fn invalidate_forces_a_rebuild_with_the_same_result() {
    let source = fixture_source();
    let mut engine = ReportEngine::new(ReportConfig::default());
    let first = engine.snapshot(&source).unwrap();

    engine.invalidate();
    assert!(engine.cache().current().is_none());
    let second = engine.snapshot(&source).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
}

/// The cached tables depend on the payout rule, not only on the bytes.
#[test]
fn switching_attribution_recomputes() {
    let source = fixture_source();
    let mut engine = ReportEngine::new(ReportConfig::default());
    let per_post = engine.snapshot(&source).unwrap();
    assert_close(per_post.baseline_roas, 0.7, "per-post baseline");

    engine.config.campaign_payout = PayoutAttribution::PerInfluencer;
    let per_influencer = engine.snapshot(&source).unwrap();

    assert!(!Arc::ptr_eq(&per_post, &per_influencer));
    assert_eq!(per_influencer.attribution, PayoutAttribution::PerInfluencer);
    assert_close(per_influencer.baseline_roas, 1.05, "per-influencer baseline");
    assert_eq!(engine.cache().misses(), 2);

    // Switching back is another miss: the cache holds one snapshot.
    engine.config.campaign_payout = PayoutAttribution::PerPost;
    let again = engine.snapshot(&source).unwrap();
    assert_close(again.baseline_roas, 0.7, "per-post baseline again");
    assert_eq!(engine.cache().hits(), 0);
}

#[test]
fn failed_load_caches_nothing() {
    let source = source_from(INFLUENCERS, POSTS, TRACKING, "influencer_id\nINF1\n");
    let mut engine = ReportEngine::new(ReportConfig::default());

    assert!(engine.snapshot(&source).is_err());
    assert!(engine.cache().current().is_none());
}

#[test]
fn fingerprint_depends_on_which_table_holds_the_bytes() {
    let a = source_from(INFLUENCERS, POSTS, TRACKING, PAYOUTS);
    let mut b = fixture_source();
    // Same bytes overall, moved between tables.
    b.set_table(SourceTable::Tracking, format!("{TRACKING}{PAYOUTS}"));
    b.set_table(SourceTable::Payouts, "");

    let inputs_a = influence_core::loader::RawInputs::read_all(&a).unwrap();
    let inputs_b = influence_core::loader::RawInputs::read_all(&b).unwrap();
    assert_ne!(
        influence_core::snapshot::InputFingerprint::of(&inputs_a),
        influence_core::snapshot::InputFingerprint::of(&inputs_b)
    );
}

#[test]
fn generated_dataset_runs_through_the_pipeline() {
    let tables = dataset_generator::generate(&GeneratorConfig::default());
    let source = dataset_generator::to_memory_source(&tables).unwrap();
    let snapshot = snapshot_with(&source, PayoutAttribution::PerPost);

    assert_eq!(snapshot.merged.len(), tables.posts.len());
    assert_eq!(snapshot.influencers.len(), tables.influencers.len());
    assert_eq!(snapshot.unattributed.posts_without_influencer, 0);

    // Every post has an influencer, so all revenue reaches the influencer table.
    let posts: f64 = snapshot.merged.iter().map(|r| r.post_revenue).sum();
    let influencers: f64 = snapshot.influencers.iter().map(|i| i.total_revenue).sum();
    let campaigns: f64 = snapshot.campaigns.iter().map(|c| c.revenue).sum::<f64>()
        + snapshot.unattributed.revenue_without_campaign;
    assert!((posts - influencers).abs() < 1e-3);
    assert!((posts - campaigns).abs() < 1e-3);
}

#[test]
fn generated_dataset_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReportConfig::default();
    let tables = dataset_generator::generate(&GeneratorConfig {
        seed: 7,
        influencers: 12,
        ..GeneratorConfig::default()
    });
    dataset_generator::write_dataset(&tables, dir.path(), &config.sources).unwrap();

    let loaded = influence_core::loader::load(&DirSource::new(dir.path(), config.sources)).unwrap();

    assert_eq!(loaded.influencers, tables.influencers);
    assert_eq!(loaded.posts.len(), tables.posts.len());
    assert_eq!(loaded.payouts.len(), tables.payouts.len());
}
