//! Synthetic dataset generator: four CSV tables from one seed.
//!
//! Output matches the loader's column contract exactly, so a generated
//! directory can be fed straight back into the pipeline.
//!
//! Shape of the data:
//!   - follower counts are Pareto-distributed (a few very large creators)
//!   - reach is a fraction of followers, likes a fraction of reach,
//!     comments a fraction of likes
//!   - each tracked post belongs to exactly one campaign
//!   - a small share of posts has no tracking and a small share of
//!     influencers has no payout record

use crate::{
    config::SourceFiles,
    error::ReportResult,
    loader::{Influencer, MemorySource, Payout, Post, RawTables, SourceTable, TrackingRecord},
    name_generator::NameGenerator,
    rng::{RngBank, StreamRng, StreamSlot},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CATEGORIES: [&str; 5] = ["Fitness", "Nutrition", "Wellness", "Lifestyle", "Beauty"];
pub const PLATFORMS: [&str; 3] = ["Instagram", "YouTube", "Twitter"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub influencers: usize,
    pub min_posts: u64,
    pub max_posts: u64,
    pub campaigns: Vec<String>,
    /// Probability that a post has any tracking rows.
    pub tracked_post_rate: f64,
    /// Probability that an influencer has a payout record.
    pub payout_rate: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            influencers: 50,
            min_posts: 1,
            max_posts: 4,
            campaigns: ["Summer Shred", "Immunity Boost", "Winter Bulk", "Glow Up"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            tracked_post_rate: 0.85,
            payout_rate: 0.95,
        }
    }
}

pub fn generate(config: &GeneratorConfig) -> RawTables {
    let bank = RngBank::new(config.seed);
    let mut inf_rng = bank.for_stream(StreamSlot::Influencers);
    let mut post_rng = bank.for_stream(StreamSlot::Posts);
    let mut trk_rng = bank.for_stream(StreamSlot::Tracking);
    let mut pay_rng = bank.for_stream(StreamSlot::Payouts);

    let influencers: Vec<Influencer> = (1..=config.influencers)
        .map(|n| Influencer {
            id: format!("INF{n:03}"),
            name: NameGenerator::generate_full_name(&mut inf_rng),
            category: inf_rng.pick(&CATEGORIES).to_string(),
            follower_count: (inf_rng.pareto(5_000.0, 1.2).min(5_000_000.0)) as u64,
            platform: inf_rng.pick(&PLATFORMS).to_string(),
        })
        .collect();

    let mut posts = Vec::new();
    let mut tracking = Vec::new();
    for influencer in &influencers {
        let count = post_rng.range_inclusive(config.min_posts, config.max_posts);
        for _ in 0..count {
            let post = generate_post(&mut post_rng, influencer, posts.len() + 1);
            if !config.campaigns.is_empty() && trk_rng.chance(config.tracked_post_rate) {
                tracking.extend(generate_tracking(&mut trk_rng, &post, &config.campaigns));
            }
            posts.push(post);
        }
    }

    let mut payouts = Vec::new();
    for influencer in &influencers {
        if !pay_rng.chance(config.payout_rate) {
            continue;
        }
        let rate = 0.01 + pay_rng.next_f64() * 0.04;
        payouts.push(Payout {
            influencer_id: influencer.id.clone(),
            total_payout: round_cents(influencer.follower_count as f64 * rate),
        });
    }

    log::info!(
        "generated seed={} influencers={} posts={} tracking={} payouts={}",
        config.seed,
        influencers.len(),
        posts.len(),
        tracking.len(),
        payouts.len(),
    );

    RawTables {
        influencers,
        posts,
        tracking,
        payouts,
    }
}

fn generate_post(rng: &mut StreamRng, influencer: &Influencer, n: usize) -> Post {
    let reach = (influencer.follower_count as f64 * (0.05 + rng.next_f64() * 0.35)) as u64;
    let likes = (reach as f64 * (0.01 + rng.next_f64() * 0.09)) as u64;
    let comments = (likes as f64 * (0.02 + rng.next_f64() * 0.08)) as u64;
    Post {
        post_id: format!("P{n:04}"),
        influencer_id: influencer.id.clone(),
        platform: Some(influencer.platform.clone()),
        caption: NameGenerator::generate_caption(rng, &influencer.category),
        reach,
        likes,
        comments,
    }
}

fn generate_tracking(rng: &mut StreamRng, post: &Post, campaigns: &[String]) -> Vec<TrackingRecord> {
    let campaign = rng.pick(campaigns).clone();
    let rows = rng.range_inclusive(1, 5);
    (0..rows)
        .map(|_| {
            let orders = rng.range_inclusive(0, 20);
            let unit_price = 500.0 + rng.next_f64() * 2_500.0;
            TrackingRecord {
                source: post.post_id.clone(),
                campaign: Some(campaign.clone()),
                orders,
                revenue: round_cents(orders as f64 * unit_price),
            }
        })
        .collect()
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ── Output ───────────────────────────────────────────────────────────────────

fn to_csv<T: Serialize>(rows: &[T]) -> ReportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render one table as CSV text with the loader's headers.
pub fn table_csv(tables: &RawTables, table: SourceTable) -> ReportResult<String> {
    match table {
        SourceTable::Influencers => to_csv(&tables.influencers),
        SourceTable::Posts => to_csv(&tables.posts),
        SourceTable::Tracking => to_csv(&tables.tracking),
        SourceTable::Payouts => to_csv(&tables.payouts),
    }
}

/// Write all four tables into `dir` (created if missing).
pub fn write_dataset(tables: &RawTables, dir: &Path, files: &SourceFiles) -> ReportResult<()> {
    std::fs::create_dir_all(dir)?;
    for table in SourceTable::all() {
        let path = dir.join(files.file_name(table));
        std::fs::write(&path, table_csv(tables, table)?)?;
        log::debug!("wrote {}", path.display());
    }
    Ok(())
}

/// Hold all four tables in memory as CSV text.
pub fn to_memory_source(tables: &RawTables) -> ReportResult<MemorySource> {
    let mut source = MemorySource::new();
    for table in SourceTable::all() {
        source.set_table(table, table_csv(tables, table)?);
    }
    Ok(source)
}
