use crate::loader::SourceTable;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File names of the four input tables inside a data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub influencers: String,
    pub posts: String,
    pub tracking: String,
    pub payouts: String,
}

impl SourceFiles {
    pub fn file_name(&self, table: SourceTable) -> &str {
        match table {
            SourceTable::Influencers => &self.influencers,
            SourceTable::Posts => &self.posts,
            SourceTable::Tracking => &self.tracking,
            SourceTable::Payouts => &self.payouts,
        }
    }
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            influencers: "influencers.csv".into(),
            posts: "posts.csv".into(),
            tracking: "tracking_data.csv".into(),
            payouts: "payouts.csv".into(),
        }
    }
}

/// How an influencer's payout is attributed to a campaign row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutAttribution {
    /// Sum `total_payout` over every post row of the campaign. An influencer
    /// with three posts in a campaign contributes their payout three times.
    #[default]
    PerPost,
    /// Count each distinct influencer's payout once per campaign.
    PerInfluencer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub sources: SourceFiles,
    pub campaign_payout: PayoutAttribution,
    /// Row limit for the top-N report tables.
    pub top_n: usize,
    /// Influencers with ROAS strictly below this (and a non-zero payout)
    /// are listed for performance review.
    pub underperformer_roas_threshold: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sources: SourceFiles::default(),
            campaign_payout: PayoutAttribution::PerPost,
            top_n: 5,
            underperformer_roas_threshold: 1.0,
        }
    }
}

impl ReportConfig {
    /// Load from a JSON file. Missing keys fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let config: ReportConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid report config {}", path.display()))?;
        anyhow::ensure!(config.top_n > 0, "top_n must be at least 1");
        anyhow::ensure!(
            config.underperformer_roas_threshold.is_finite(),
            "underperformer_roas_threshold must be finite"
        );
        Ok(config)
    }
}
