//! Shared fixtures for the integration tests.
//!
//! The standard fixture covers every join edge case at once:
//!   - INF1 has two posts in "Summer" (revenue 600 + 900, payout 1000)
//!   - P2 has zero reach
//!   - P4 (INF3) has no tracking rows
//!   - P5 references INF9, which does not exist
#![allow(dead_code)]

use influence_core::{
    config::{PayoutAttribution, ReportConfig},
    engine::ReportEngine,
    loader::{MemorySource, SourceTable},
    snapshot::ReportSnapshot,
};
use std::sync::Arc;

pub const INFLUENCERS: &str = "\
ID,name,category,follower_count,platform
INF1,Asha Rao,Fitness,10000,Instagram
INF2,Ben Clark,Nutrition,50000,YouTube
INF3,Chitra Sen,Fitness,2000,Instagram
";

pub const POSTS: &str = "\
post_id,influencer_id,platform,caption,reach,likes,comments
P1,INF1,Twitter,Leg day shake,5000,400,100
P2,INF1,Instagram,Morning whey,0,0,0
P3,INF2,YouTube,Immunity stack,20000,900,100
P4,INF3,Instagram,Untracked post,1000,50,10
P5,INF9,Instagram,Ghost post,3000,30,0
";

pub const TRACKING: &str = "\
source,campaign,orders,revenue
P1,Summer,4,600
P2,Summer,6,900
P3,Winter,2,500
P5,Winter,1,100
";

pub const PAYOUTS: &str = "\
influencer_id,total_payout
INF1,1000
INF2,1000
INF3,300
";

pub fn source_from(influencers: &str, posts: &str, tracking: &str, payouts: &str) -> MemorySource {
    MemorySource::new()
        .with_table(SourceTable::Influencers, influencers)
        .with_table(SourceTable::Posts, posts)
        .with_table(SourceTable::Tracking, tracking)
        .with_table(SourceTable::Payouts, payouts)
}

/// Route engine logs through the test harness; `RUST_LOG=debug` shows them.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fixture_source() -> MemorySource {
    init_logging();
    source_from(INFLUENCERS, POSTS, TRACKING, PAYOUTS)
}

pub fn snapshot_with(source: &MemorySource, attribution: PayoutAttribution) -> Arc<ReportSnapshot> {
    let config = ReportConfig {
        campaign_payout: attribution,
        ..ReportConfig::default()
    };
    ReportEngine::new(config)
        .snapshot(source)
        .expect("fixture snapshot")
}

pub fn fixture_snapshot() -> Arc<ReportSnapshot> {
    snapshot_with(&fixture_source(), PayoutAttribution::PerPost)
}

pub fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "{what}: expected {expected}, got {actual}"
    );
}
