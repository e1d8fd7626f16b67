//! SQLite persistence layer for report exports.
//!
//! RULE: Only the store talks to the database.
//! An export writes one snapshot (all three tables plus the baseline)
//! inside a single transaction, so readers never see half an export.

use crate::{error::ReportResult, snapshot::ReportSnapshot};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

mod tables;

pub struct ReportStore {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub export_id: String,
    pub fingerprint: String,
    pub baseline_roas: f64,
    pub version: String,
    pub created_at: String,
}

impl ReportStore {
    pub fn open(path: &str) -> ReportResult<Self> {
        let conn = Connection::open(path)?;
        // WAL only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ReportResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ReportResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_report.sql"))?;
        Ok(())
    }

    // ── Export ─────────────────────────────────────────────────

    /// Persist a full snapshot. Returns the new export id.
    pub fn export_snapshot(&self, snapshot: &ReportSnapshot, version: &str) -> ReportResult<String> {
        let export_id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        let u = &snapshot.unattributed;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO report_export (
                export_id, fingerprint, baseline_roas,
                posts_without_campaign, revenue_without_campaign,
                posts_without_influencer, revenue_without_influencer,
                version, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                export_id,
                snapshot.fingerprint.as_str(),
                snapshot.baseline_roas,
                u.posts_without_campaign as i64,
                u.revenue_without_campaign,
                u.posts_without_influencer as i64,
                u.revenue_without_influencer,
                version,
                created_at,
            ],
        )?;
        tables::insert_merged_rows(&tx, &export_id, &snapshot.merged)?;
        tables::insert_influencer_summaries(&tx, &export_id, &snapshot.influencers)?;
        tables::insert_campaign_summaries(&tx, &export_id, &snapshot.campaigns)?;
        tx.commit()?;

        log::info!(
            "exported snapshot {} as {export_id} ({} posts)",
            snapshot.fingerprint,
            snapshot.merged.len()
        );
        Ok(export_id)
    }

    pub fn latest_export(&self) -> ReportResult<Option<ExportRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT export_id, fingerprint, baseline_roas, version, created_at
                 FROM report_export ORDER BY created_at DESC, rowid DESC LIMIT 1",
                [],
                |row| {
                    Ok(ExportRecord {
                        export_id: row.get(0)?,
                        fingerprint: row.get(1)?,
                        baseline_roas: row.get(2)?,
                        version: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Whether a snapshot with this fingerprint has been exported before.
    pub fn has_fingerprint(&self, fingerprint: &str) -> ReportResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM report_export WHERE fingerprint = ?1",
            params![fingerprint],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
