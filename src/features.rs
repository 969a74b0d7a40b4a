//! Feature derivation
//!
//! This module derives three columns from generated engagement data:
//! - Total negative engagement score
//! - Active notification responder flag
//! - Feed bias category
//!
//! Derivation is available on typed records and on loosely typed tables read
//! from disk. Both paths share the same formulas.

use crate::error::PipelineError;
use crate::table::{format_float, parse_number, Table};
use crate::types::{DerivedEngagementRecord, EngagementRecord, FeedBiasCategory, DERIVED_COLUMNS};

/// Weight of each rage click in the negative engagement score
const RAGE_CLICK_WEIGHT: f64 = 0.5;

/// Weight of each doomscroll minute in the negative engagement score
const DOOMSCROLL_WEIGHT: f64 = 0.7;

/// Upper (inclusive) edge of the left-leaning bucket
const LEFT_LEANING_MAX: f64 = 0.3;

/// Upper (inclusive) edge of the neutral bucket
const NEUTRAL_MAX: f64 = 0.7;

/// Feature deriver for engagement records
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Derive features for one typed record
    pub fn derive(record: EngagementRecord) -> DerivedEngagementRecord {
        let total_negative_engagement_score =
            compute_negative_engagement(record.rage_clicks as f64, record.doomscroll_length);
        let active_notif_responder = compute_active_responder(record.notif_response_time);
        let feed_bias_category = categorize_feed_bias(Some(record.feed_bias_score));

        DerivedEngagementRecord {
            record,
            total_negative_engagement_score,
            active_notif_responder,
            feed_bias_category,
        }
    }

    /// Derive features for every record, preserving order
    pub fn derive_all(records: Vec<EngagementRecord>) -> Vec<DerivedEngagementRecord> {
        records.into_iter().map(Self::derive).collect()
    }

    /// Derive features on a table, appending (or replacing) the derived columns.
    ///
    /// `rage_clicks`, `doomscroll_length` and `notif_response_time` must be
    /// present. A missing or unparsable `feed_bias_score` leaves that row's
    /// category empty instead of failing.
    pub fn derive_table(mut table: Table) -> Result<Table, PipelineError> {
        let rage_idx = table.require_column("rage_clicks")?;
        let doom_idx = table.require_column("doomscroll_length")?;
        let notif_idx = table.require_column("notif_response_time")?;
        let bias_idx = table.column_index("feed_bias_score");

        if bias_idx.is_none() {
            log::warn!("feed_bias_score column missing; feed_bias_category will be empty");
        }

        let mut negative_scores = Vec::with_capacity(table.len());
        let mut responders = Vec::with_capacity(table.len());
        let mut categories = Vec::with_capacity(table.len());
        let mut uncategorized = 0usize;

        for (row_num, row) in table.rows().iter().enumerate() {
            let rage_clicks = required_number(&row[rage_idx], row_num, "rage_clicks")?;
            let doomscroll = required_number(&row[doom_idx], row_num, "doomscroll_length")?;
            let response_time = parse_number(&row[notif_idx]);
            let bias = bias_idx.and_then(|idx| parse_number(&row[idx]));

            negative_scores.push(format_float(compute_negative_engagement(rage_clicks, doomscroll)));
            responders.push(compute_active_responder(response_time).to_string());

            match categorize_feed_bias(bias) {
                Some(category) => categories.push(category.as_str().to_string()),
                None => {
                    uncategorized += 1;
                    categories.push(String::new());
                }
            }
        }

        if uncategorized > 0 && bias_idx.is_some() {
            log::warn!(
                "{} row(s) have no usable feed_bias_score; feed_bias_category left empty",
                uncategorized
            );
        }

        let [negative_col, responder_col, category_col] = DERIVED_COLUMNS;
        table.set_column(negative_col, negative_scores)?;
        table.set_column(responder_col, responders)?;
        table.set_column(category_col, categories)?;

        Ok(table)
    }
}

/// `0.5 * rage_clicks + 0.7 * doomscroll_length`
pub fn compute_negative_engagement(rage_clicks: f64, doomscroll_length: f64) -> f64 {
    RAGE_CLICK_WEIGHT * rage_clicks + DOOMSCROLL_WEIGHT * doomscroll_length
}

/// 1 when a response time is present, 0 otherwise
pub fn compute_active_responder(notif_response_time: Option<f64>) -> u8 {
    match notif_response_time {
        Some(t) if !t.is_nan() => 1,
        _ => 0,
    }
}

/// Bucket a bias score into [0, 0.3], (0.3, 0.7], (0.7, 1.0]
///
/// Scores outside [0, 1], NaN and absent scores have no category.
pub fn categorize_feed_bias(score: Option<f64>) -> Option<FeedBiasCategory> {
    match score {
        Some(s) if (0.0..=LEFT_LEANING_MAX).contains(&s) => Some(FeedBiasCategory::LeftLeaning),
        Some(s) if s > LEFT_LEANING_MAX && s <= NEUTRAL_MAX => Some(FeedBiasCategory::Neutral),
        Some(s) if s > NEUTRAL_MAX && s <= 1.0 => Some(FeedBiasCategory::RightLeaning),
        _ => None,
    }
}

fn required_number(cell: &str, row: usize, column: &str) -> Result<f64, PipelineError> {
    parse_number(cell).ok_or_else(|| {
        PipelineError::SchemaViolation(format!(
            "row {}: column '{}' has non-numeric value '{}'",
            row, column, cell
        ))
    })
}
