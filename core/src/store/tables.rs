//! Row-level inserts and reads for the three exported tables.

use crate::{
    aggregate::{CampaignSummary, InfluencerSummary},
    error::{ReportError, ReportResult},
    join::MergedRow,
    loader::SourceTable,
};
use rusqlite::{params, Connection};

use super::ReportStore;

/// SQLite integers are signed. A count above `i64::MAX` is rejected
/// instead of being stored as a negative number.
fn sql_int(value: u64, table: SourceTable, column: &str) -> ReportResult<i64> {
    i64::try_from(value).map_err(|_| {
        ReportError::schema(
            table,
            column,
            format!("{value} exceeds the SQLite integer range"),
        )
    })
}

pub(super) fn insert_merged_rows(
    conn: &Connection,
    export_id: &str,
    rows: &[MergedRow],
) -> ReportResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO merged_post (
            export_id, row_index, post_id, influencer_id, caption,
            reach, likes, comments, name, category, follower_count, platform,
            total_payout, post_orders, post_revenue, campaign,
            engagement_rate, cpm, cpe
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
    )?;
    for (idx, r) in rows.iter().enumerate() {
        stmt.execute(params![
            export_id,
            idx as i64,
            r.post_id,
            r.influencer_id,
            r.caption,
            sql_int(r.reach, SourceTable::Posts, "reach")?,
            sql_int(r.likes, SourceTable::Posts, "likes")?,
            sql_int(r.comments, SourceTable::Posts, "comments")?,
            r.name,
            r.category,
            r.follower_count
                .map(|f| sql_int(f, SourceTable::Influencers, "follower_count"))
                .transpose()?,
            r.platform,
            r.total_payout,
            sql_int(r.post_orders, SourceTable::Tracking, "orders")?,
            r.post_revenue,
            r.campaign,
            r.engagement_rate,
            r.cpm,
            r.cpe,
        ])?;
    }
    Ok(())
}

pub(super) fn insert_influencer_summaries(
    conn: &Connection,
    export_id: &str,
    rows: &[InfluencerSummary],
) -> ReportResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO influencer_summary (
            export_id, influencer_id, name, category, follower_count, platform,
            total_payout, post_count, total_revenue, total_orders, total_reach,
            total_likes, total_comments, avg_engagement_rate, roas, roi, iroas
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
    )?;
    for s in rows {
        stmt.execute(params![
            export_id,
            s.influencer_id,
            s.name,
            s.category,
            sql_int(s.follower_count, SourceTable::Influencers, "follower_count")?,
            s.platform,
            s.total_payout,
            sql_int(s.post_count, SourceTable::Posts, "post_id")?,
            s.total_revenue,
            sql_int(s.total_orders, SourceTable::Tracking, "orders")?,
            sql_int(s.total_reach, SourceTable::Posts, "reach")?,
            sql_int(s.total_likes, SourceTable::Posts, "likes")?,
            sql_int(s.total_comments, SourceTable::Posts, "comments")?,
            s.avg_engagement_rate,
            s.roas,
            s.roi,
            s.iroas,
        ])?;
    }
    Ok(())
}

pub(super) fn insert_campaign_summaries(
    conn: &Connection,
    export_id: &str,
    rows: &[CampaignSummary],
) -> ReportResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO campaign_summary (
            export_id, campaign, revenue, total_payout, unique_influencers, roas, roi, iroas
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for c in rows {
        stmt.execute(params![
            export_id,
            c.campaign,
            c.revenue,
            c.total_payout,
            sql_int(c.unique_influencers, SourceTable::Influencers, "ID")?,
            c.roas,
            c.roi,
            c.iroas,
        ])?;
    }
    Ok(())
}

impl ReportStore {
    /// Campaign rows of one export, ordered by campaign name.
    pub fn campaign_summaries(&self, export_id: &str) -> ReportResult<Vec<CampaignSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT campaign, revenue, total_payout, unique_influencers, roas, roi, iroas
             FROM campaign_summary WHERE export_id = ?1
             ORDER BY campaign ASC",
        )?;
        let rows = stmt
            .query_map(params![export_id], |row| {
                Ok(CampaignSummary {
                    campaign: row.get(0)?,
                    revenue: row.get(1)?,
                    total_payout: row.get(2)?,
                    unique_influencers: row.get::<_, i64>(3)? as u64,
                    roas: row.get(4)?,
                    roi: row.get(5)?,
                    iroas: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Test / summary helpers ────────────────────────────────────────

    pub fn merged_row_count(&self, export_id: &str) -> ReportResult<i64> {
        self.count_rows("merged_post", export_id)
    }

    pub fn influencer_summary_count(&self, export_id: &str) -> ReportResult<i64> {
        self.count_rows("influencer_summary", export_id)
    }

    pub fn campaign_summary_count(&self, export_id: &str) -> ReportResult<i64> {
        self.count_rows("campaign_summary", export_id)
    }

    /// `table` is always one of the fixed names above, never user input.
    fn count_rows(&self, table: &str, export_id: &str) -> ReportResult<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE export_id = ?1"),
            params![export_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
