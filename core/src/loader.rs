//! Record loader: the four raw CSV sources into typed tables.
//!
//! RULE: a load either yields all four tables or fails.
//! Every source is read into memory before any of them is parsed,
//! so a missing file is reported before any parsing work happens
//! and nothing downstream ever sees a partial load.

use crate::{
    config::SourceFiles,
    error::{ReportError, ReportResult},
    types::{InfluencerId, Money, PostId},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

// ── Source tables ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    Influencers,
    Posts,
    Tracking,
    Payouts,
}

impl SourceTable {
    pub fn all() -> [SourceTable; 4] {
        [
            SourceTable::Influencers,
            SourceTable::Posts,
            SourceTable::Tracking,
            SourceTable::Payouts,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Influencers => "influencers",
            Self::Posts => "posts",
            Self::Tracking => "tracking_data",
            Self::Payouts => "payouts",
        }
    }

    /// Columns that must be present in the header row. Each entry lists
    /// the accepted spellings; the first is the canonical name.
    pub fn required_columns(&self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Influencers => &[
                &["ID", "influencer_id"],
                &["name"],
                &["category"],
                &["follower_count"],
                &["platform"],
            ],
            Self::Posts => &[
                &["post_id"],
                &["influencer_id"],
                &["caption"],
                &["reach"],
                &["likes"],
                &["comments"],
            ],
            Self::Tracking => &[&["source"], &["campaign"], &["orders"], &["revenue"]],
            Self::Payouts => &[&["influencer_id"], &["total_payout"]],
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Raw records ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Influencer {
    #[serde(rename = "ID", alias = "influencer_id")]
    pub id: InfluencerId,
    pub name: String,
    pub category: String,
    pub follower_count: u64,
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    pub influencer_id: InfluencerId,
    /// Discarded by the join; the influencer's platform is authoritative.
    #[serde(default)]
    pub platform: Option<String>,
    pub caption: String,
    pub reach: u64,
    pub likes: u64,
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub source: PostId,
    pub campaign: Option<String>,
    pub orders: u64,
    pub revenue: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub influencer_id: InfluencerId,
    pub total_payout: Money,
}

/// The four typed input tables, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTables {
    pub influencers: Vec<Influencer>,
    pub posts: Vec<Post>,
    pub tracking: Vec<TrackingRecord>,
    pub payouts: Vec<Payout>,
}

// ── Sources ──────────────────────────────────────────────────────────────────

/// Anything that can hand over the raw bytes of the four tables.
pub trait TableSource {
    /// Read one table in full. A table that does not exist must fail
    /// with `ReportError::MissingSource`.
    fn read_table(&self, table: SourceTable) -> ReportResult<Vec<u8>>;

    /// Human-readable location of a table, for logs.
    fn describe(&self, table: SourceTable) -> String;
}

/// CSV files in a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
    files: SourceFiles,
}

impl DirSource {
    pub fn new(dir: impl AsRef<Path>, files: SourceFiles) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            files,
        }
    }

    pub fn path_for(&self, table: SourceTable) -> PathBuf {
        self.dir.join(self.files.file_name(table))
    }
}

impl TableSource for DirSource {
    fn read_table(&self, table: SourceTable) -> ReportResult<Vec<u8>> {
        let path = self.path_for(table);
        std::fs::read(&path).map_err(|e| {
            log::error!("cannot read {}: {e}", path.display());
            ReportError::MissingSource {
                source_table: table,
                path: path.display().to_string(),
            }
        })
    }

    fn describe(&self, table: SourceTable) -> String {
        self.path_for(table).display().to_string()
    }
}

/// CSV text held in memory. Tables never inserted count as missing.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<SourceTable, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: SourceTable, csv_text: impl Into<String>) -> Self {
        self.tables.insert(table, csv_text.into());
        self
    }

    pub fn set_table(&mut self, table: SourceTable, csv_text: impl Into<String>) {
        self.tables.insert(table, csv_text.into());
    }
}

impl TableSource for MemorySource {
    fn read_table(&self, table: SourceTable) -> ReportResult<Vec<u8>> {
        self.tables
            .get(&table)
            .map(|text| text.as_bytes().to_vec())
            .ok_or_else(|| ReportError::MissingSource {
                source_table: table,
                path: self.describe(table),
            })
    }

    fn describe(&self, table: SourceTable) -> String {
        format!("memory:{}", table.name())
    }
}

// ── Raw inputs ───────────────────────────────────────────────────────────────

/// The unparsed bytes of all four tables. Hashing these gives the
/// snapshot cache key; parsing them gives `RawTables`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInputs {
    pub influencers: Vec<u8>,
    pub posts: Vec<u8>,
    pub tracking: Vec<u8>,
    pub payouts: Vec<u8>,
}

impl RawInputs {
    /// Read all four tables. Fails on the first missing one.
    pub fn read_all(source: &dyn TableSource) -> ReportResult<Self> {
        let influencers = source.read_table(SourceTable::Influencers)?;
        let posts = source.read_table(SourceTable::Posts)?;
        let tracking = source.read_table(SourceTable::Tracking)?;
        let payouts = source.read_table(SourceTable::Payouts)?;
        Ok(Self {
            influencers,
            posts,
            tracking,
            payouts,
        })
    }

    pub fn bytes(&self, table: SourceTable) -> &[u8] {
        match table {
            SourceTable::Influencers => &self.influencers,
            SourceTable::Posts => &self.posts,
            SourceTable::Tracking => &self.tracking,
            SourceTable::Payouts => &self.payouts,
        }
    }

    pub fn parse(&self) -> ReportResult<RawTables> {
        let influencers: Vec<Influencer> =
            parse_table(SourceTable::Influencers, &self.influencers)?;
        let posts: Vec<Post> = parse_table(SourceTable::Posts, &self.posts)?;
        let tracking: Vec<TrackingRecord> = parse_table(SourceTable::Tracking, &self.tracking)?;
        let payouts: Vec<Payout> = parse_table(SourceTable::Payouts, &self.payouts)?;

        for (i, t) in tracking.iter().enumerate() {
            check_amount(SourceTable::Tracking, "revenue", t.revenue, i)?;
        }
        for (i, p) in payouts.iter().enumerate() {
            check_amount(SourceTable::Payouts, "total_payout", p.total_payout, i)?;
        }

        log::info!(
            "loaded {} influencers, {} posts, {} tracking rows, {} payouts",
            influencers.len(),
            posts.len(),
            tracking.len(),
            payouts.len(),
        );

        Ok(RawTables {
            influencers,
            posts,
            tracking,
            payouts,
        })
    }
}

/// Read and parse all four tables from `source`.
pub fn load(source: &dyn TableSource) -> ReportResult<RawTables> {
    RawInputs::read_all(source)?.parse()
}

fn parse_table<T: DeserializeOwned>(table: SourceTable, bytes: &[u8]) -> ReportResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = canonical_headers(table, reader.headers()?);
    reader.set_headers(headers.clone());

    for spellings in table.required_columns() {
        let present = spellings
            .iter()
            .any(|name| headers.iter().any(|h| h == *name));
        if !present {
            return Err(ReportError::schema(
                table,
                spellings[0],
                "column not found in header",
            ));
        }
    }

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => return Err(schema_error(table, &headers, e)),
        }
    }
    Ok(rows)
}

/// When a column appears under both its canonical name and an alias,
/// the canonical column is read and the alias column is ignored.
fn canonical_headers(table: SourceTable, headers: &csv::StringRecord) -> csv::StringRecord {
    let mut shadowed: Vec<&str> = Vec::new();
    for spellings in table.required_columns() {
        if let Some((canonical, aliases)) = spellings.split_first() {
            if headers.iter().any(|h| h == *canonical) {
                shadowed.extend(aliases.iter().copied().filter(|a| headers.iter().any(|h| h == *a)));
            }
        }
    }
    if shadowed.is_empty() {
        return headers.clone();
    }
    log::debug!("{table}: ignoring alias columns {shadowed:?}");
    headers
        .iter()
        .map(|h| {
            if shadowed.contains(&h) {
                format!("{h}#ignored")
            } else {
                h.to_string()
            }
        })
        .collect()
}

/// Turn a csv deserialization failure into a `Schema` error naming the
/// offending column. Other csv failures pass through unchanged.
fn schema_error(table: SourceTable, headers: &csv::StringRecord, e: csv::Error) -> ReportError {
    if let csv::ErrorKind::Deserialize { pos, err } = e.kind() {
        let column = err
            .field()
            .and_then(|idx| headers.get(idx as usize))
            .unwrap_or("<unknown>")
            .to_string();
        let line = pos.as_ref().map(|p| p.line()).unwrap_or(0);
        return ReportError::Schema {
            source_table: table,
            column,
            detail: format!("line {line}: {}", err.kind()),
        };
    }
    ReportError::Csv(e)
}

fn check_amount(table: SourceTable, column: &str, value: Money, row: usize) -> ReportResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ReportError::schema(
            table,
            column,
            format!("row {}: expected a non-negative amount, got {value}", row + 1),
        ));
    }
    Ok(())
}
