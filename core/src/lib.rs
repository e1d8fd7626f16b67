//! Influencer marketing ROI engine.
//!
//! Loads influencers, posts, tracking and payouts, joins them into one
//! row per post, aggregates by influencer and by campaign, and scores
//! both levels against a global baseline ROAS. Results are held in an
//! immutable `ReportSnapshot` that filters and report views read from.

pub mod aggregate;
pub mod config;
pub mod dataset_generator;
pub mod engine;
pub mod error;
pub mod filter;
pub mod incrementality;
pub mod join;
pub mod loader;
pub mod metrics;
pub mod name_generator;
pub mod report;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;
