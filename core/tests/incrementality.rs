mod common;

use common::*;
use influence_core::{
    aggregate::CampaignSummary,
    config::PayoutAttribution,
    filter::{apply_filters, FilterSpec},
    incrementality::{apply_incrementality, baseline_roas},
    metrics::compute_roi_roas,
};

fn campaign(name: &str, revenue: f64, payout: f64) -> CampaignSummary {
    let m = compute_roi_roas(revenue, payout);
    CampaignSummary {
        campaign: name.into(),
        revenue,
        total_payout: payout,
        unique_influencers: 1,
        roas: m.roas,
        roi: m.roi,
        iroas: 0.0,
    }
}

/// Summer (1500 / 1000) and Winter (500 / 1000): baseline 2000 / 2000.
#[test]
fn iroas_is_roas_minus_global_baseline() {
    let mut campaigns = vec![campaign("Summer", 1500.0, 1000.0), campaign("Winter", 500.0, 1000.0)];

    let baseline = apply_incrementality(&mut [], &mut campaigns);

    assert_close(baseline, 1.0, "baseline");
    assert_close(campaigns[0].iroas, 0.5, "Summer iroas");
    assert_close(campaigns[1].roas, 0.5, "Winter roas");
    assert_close(campaigns[1].iroas, -0.5, "Winter iroas");
}

/// The same scenario end to end, from CSV through the engine.
#[test]
fn iroas_scenario_through_the_pipeline() {
    let posts = "\
post_id,influencer_id,caption,reach,likes,comments
P1,INF1,Leg day shake,5000,400,100
P2,INF1,Morning whey,0,0,0
P3,INF2,Immunity stack,20000,900,100
";
    let tracking = "\
source,campaign,orders,revenue
P1,Summer,4,600
P2,Summer,6,900
P3,Winter,2,500
";
    let source = source_from(INFLUENCERS, posts, tracking, PAYOUTS);
    let snapshot = snapshot_with(&source, PayoutAttribution::PerInfluencer);

    assert_close(snapshot.baseline_roas, 1.0, "baseline");
    let summer = &snapshot.campaigns[0];
    let winter = &snapshot.campaigns[1];
    assert_eq!(summer.campaign, "Summer");
    assert_close(summer.iroas, 0.5, "Summer iroas");
    assert_close(winter.roas, 0.5, "Winter roas");
    assert_close(winter.iroas, -0.5, "Winter iroas");

    // Influencers are measured against the same baseline.
    let inf1 = snapshot.influencers.iter().find(|i| i.influencer_id == "INF1").unwrap();
    assert_close(inf1.iroas, 0.5, "INF1 iroas");
}

#[test]
fn baseline_is_zero_without_payout() {
    let campaigns = vec![campaign("Summer", 1500.0, 0.0), campaign("Winter", 500.0, 0.0)];
    assert_eq!(baseline_roas(&campaigns), 0.0);
    assert_eq!(baseline_roas(&[]), 0.0);
}

#[test]
fn missing_payout_table_rows_give_zero_baseline() {
    let source = source_from(INFLUENCERS, POSTS, TRACKING, "influencer_id,total_payout\n");
    let snapshot = snapshot_with(&source, PayoutAttribution::PerPost);

    assert_eq!(snapshot.baseline_roas, 0.0);
    for c in &snapshot.campaigns {
        assert_eq!(c.roas, 0.0, "{} roas", c.campaign);
        assert_eq!(c.iroas, 0.0, "{} iroas", c.campaign);
    }
}

/// Baseline over the fixture: 2100 revenue / 3000 per-post payout.
#[test]
fn baseline_matches_campaign_totals() {
    let snapshot = fixture_snapshot();
    assert_close(snapshot.baseline_roas, 0.7, "per-post baseline");

    let per_influencer = snapshot_with(&fixture_source(), PayoutAttribution::PerInfluencer);
    assert_close(per_influencer.baseline_roas, 1.05, "per-influencer baseline");
}

#[test]
fn baseline_survives_filtering() {
    let snapshot = fixture_snapshot();
    let spec = FilterSpec::all(&snapshot).with_campaigns(["Winter"]);

    let view = apply_filters(&snapshot, &spec);

    assert_eq!(view.baseline_roas, snapshot.baseline_roas);
    let winter = &view.campaigns[0];
    assert_close(winter.iroas, 0.6 - 0.7, "Winter iroas against the full baseline");
}
