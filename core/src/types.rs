//! Shared primitive types used across the reporting pipeline.

/// Identifier of an influencer (the `ID` / `influencer_id` column).
pub type InfluencerId = String;

/// Identifier of a post (the `post_id` column, `source` on tracking rows).
pub type PostId = String;

/// A campaign label as it appears in the tracking data.
pub type Campaign = String;

/// Currency amounts (revenue, payout). Unit-less in the engine.
pub type Money = f64;
