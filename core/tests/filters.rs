mod common;

use common::*;
use influence_core::{
    filter::{apply_filters, FilterSpec, FilterWarning, ViewTable},
    snapshot::FollowerRange,
};

fn post_ids(posts: &[influence_core::join::MergedRow]) -> Vec<&str> {
    posts.iter().map(|p| p.post_id.as_str()).collect()
}

#[test]
fn domains_cover_the_unfiltered_tables() {
    let snapshot = fixture_snapshot();
    let d = &snapshot.domains;

    assert_eq!(d.campaigns, ["Summer", "Winter"]);
    assert_eq!(d.categories, ["Fitness", "Nutrition"]);
    assert_eq!(d.followers, Some(FollowerRange { min: 2000, max: 50_000 }));
}

#[test]
fn select_all_keeps_every_attributed_row() {
    let snapshot = fixture_snapshot();

    let view = apply_filters(&snapshot, &FilterSpec::all(&snapshot));

    assert_eq!(view.influencers.len(), 3);
    assert_eq!(view.campaigns.len(), 2);
    // P4 has no campaign and P5 no influencer record.
    assert_eq!(post_ids(&view.posts), ["P1", "P2", "P3"]);
    assert!(view.warnings.is_empty());
}

#[test]
fn category_filter_limits_influencers_and_their_posts() {
    let snapshot = fixture_snapshot();
    let spec = FilterSpec::all(&snapshot).with_categories(["Fitness"]);

    let view = apply_filters(&snapshot, &spec);

    let ids: Vec<&str> = view.influencers.iter().map(|i| i.influencer_id.as_str()).collect();
    assert_eq!(ids, ["INF1", "INF3"]);
    assert_eq!(view.campaigns.len(), 2, "campaigns are not filtered by category");
    assert_eq!(post_ids(&view.posts), ["P1", "P2"]);
}

#[test]
fn campaign_filter_limits_campaigns_and_posts() {
    let snapshot = fixture_snapshot();
    let spec = FilterSpec::all(&snapshot).with_campaigns(["Winter"]);

    let view = apply_filters(&snapshot, &spec);

    assert_eq!(view.campaigns.len(), 1);
    assert_eq!(view.campaigns[0].campaign, "Winter");
    assert_eq!(view.influencers.len(), 3, "influencers are not filtered by campaign");
    assert_eq!(post_ids(&view.posts), ["P3"]);
}

#[test]
fn follower_range_is_inclusive() {
    let snapshot = fixture_snapshot();

    let view = apply_filters(&snapshot, &FilterSpec::all(&snapshot).with_followers(20_000, 60_000));
    let ids: Vec<&str> = view.influencers.iter().map(|i| i.influencer_id.as_str()).collect();
    assert_eq!(ids, ["INF2"]);

    let view = apply_filters(&snapshot, &FilterSpec::all(&snapshot).with_followers(2000, 10_000));
    let ids: Vec<&str> = view.influencers.iter().map(|i| i.influencer_id.as_str()).collect();
    assert_eq!(ids, ["INF1", "INF3"]);
}

#[test]
fn empty_selection_warns_instead_of_failing() {
    let snapshot = fixture_snapshot();
    let spec = FilterSpec::all(&snapshot).with_categories(["Beauty"]);

    let view = apply_filters(&snapshot, &spec);

    assert!(view.influencers.is_empty());
    assert!(view.posts.is_empty());
    assert_eq!(
        view.warnings,
        [
            FilterWarning::EmptyResult { table: ViewTable::Influencers },
            FilterWarning::EmptyResult { table: ViewTable::Posts },
        ]
    );
    assert!(!view.is_empty(), "campaign table is still populated");
}

#[test]
fn deselecting_everything_gives_an_empty_view() {
    let snapshot = fixture_snapshot();
    let spec = FilterSpec::all(&snapshot)
        .with_campaigns(Vec::<String>::new())
        .with_categories(Vec::<String>::new());

    let view = apply_filters(&snapshot, &spec);

    assert!(view.is_empty());
    assert_eq!(view.warnings.len(), 3);
}

#[test]
fn filtering_never_touches_the_snapshot() {
    let snapshot = fixture_snapshot();
    let before = (*snapshot).clone();

    let _ = apply_filters(&snapshot, &FilterSpec::all(&snapshot).with_categories(["Nutrition"]));

    assert_eq!(*snapshot, before);
}

#[test]
fn warnings_serialize_with_a_type_tag() {
    let warning = FilterWarning::EmptyResult { table: ViewTable::Posts };
    let json = serde_json::to_value(&warning).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "empty_result", "table": "posts" }));
}
