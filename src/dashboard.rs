//! Dashboard views over a processed dataset
//!
//! Each dashboard section is computed independently from a loaded table. A
//! section whose columns are missing (or whose subject cannot be found)
//! degrades to [`Unavailable`] rather than failing the whole dashboard.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::error::PipelineError;
use crate::labeling::{matching_rule, LabelSignals};
use crate::store::read_table;
use crate::table::{parse_number, Table};
use crate::types::{AdEmotion, TraitLabel};

const OVERVIEW_COLUMNS: [&str; 5] = [
    "session_time",
    "doomscroll_length",
    "rage_clicks",
    "active_notif_responder",
    "total_negative_engagement_score",
];

const HEATMAP_COLUMNS: [&str; 5] = [
    "predicted_trait_label",
    "session_time",
    "doomscroll_length",
    "rage_clicks",
    "total_negative_engagement_score",
];

const AD_COLUMNS: [&str; 2] = ["ad_click_emotion", "ad_category_clicked"];

/// Widest bar drawn in text distributions
const BAR_WIDTH: usize = 40;

/// A dashboard section that cannot be shown
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{section} cannot be displayed: {reason}")]
pub struct Unavailable {
    pub section: String,
    pub reason: String,
}

impl Unavailable {
    fn missing(section: &str, columns: &[&str]) -> Self {
        Self {
            section: section.to_string(),
            reason: format!("missing column(s) {}", columns.join(", ")),
        }
    }
}

/// Which trait labels the aggregate sections include
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TraitFilter {
    #[default]
    All,
    Only(Vec<TraitLabel>),
}

impl TraitFilter {
    pub fn matches(&self, label_cell: &str) -> bool {
        match self {
            TraitFilter::All => true,
            TraitFilter::Only(traits) => label_cell
                .parse::<TraitLabel>()
                .map(|label| traits.contains(&label))
                .unwrap_or(false),
        }
    }
}

/// Headline metrics over the whole table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMetrics {
    pub records: usize,
    pub avg_session_time: Option<f64>,
    pub avg_doomscroll_length: Option<f64>,
    pub avg_rage_clicks: Option<f64>,
    /// Percent of users with `active_notif_responder == 1`
    pub notif_response_rate_pct: Option<f64>,
    pub avg_negative_engagement_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Mean engagement of the users carrying one trait label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitEngagement {
    pub trait_label: String,
    pub users: usize,
    pub avg_session_time: Option<f64>,
    pub avg_doomscroll_length: Option<f64>,
    pub avg_rage_clicks: Option<f64>,
    pub avg_negative_engagement_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdDistribution {
    pub emotions: Vec<CategoryCount>,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileField {
    pub name: String,
    pub value: String,
}

/// One user's row plus a rule-based explanation of their label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user_id: String,
    pub predicted_trait_label: Option<String>,
    pub fields: Vec<ProfileField>,
    pub explanation: Vec<String>,
}

/// Processed dataset loaded for display
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: Table,
}

impl Dashboard {
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    /// Load a persisted table
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        Ok(Self::from_table(read_table(path)?))
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Rows kept by `filter`; without a label column every row is kept
    fn filtered(&self, filter: &TraitFilter) -> Table {
        match (filter, self.table.column_index("predicted_trait_label")) {
            (TraitFilter::All, _) | (_, None) => self.table.clone(),
            (_, Some(idx)) => self
                .table
                .filter_rows(|t, row| filter.matches(&t.rows()[row][idx])),
        }
    }

    /// Filtered rows for `section`, which is unavailable when none remain
    fn filtered_rows(&self, section: &str, filter: &TraitFilter) -> Result<Table, Unavailable> {
        let table = self.filtered(filter);
        if table.is_empty() {
            return Err(Unavailable {
                section: section.to_string(),
                reason: "no rows match the selected traits".to_string(),
            });
        }
        Ok(table)
    }

    pub fn overview(&self) -> Result<OverviewMetrics, Unavailable> {
        require(&self.table, "Overall Behavioral Metrics", &OVERVIEW_COLUMNS)?;

        let records = self.table.len();
        let responders = column_values(&self.table, "active_notif_responder");
        let notif_response_rate_pct = if records == 0 {
            None
        } else {
            Some(responders.iter().filter(|v| **v == 1.0).count() as f64 / records as f64 * 100.0)
        };

        Ok(OverviewMetrics {
            records,
            avg_session_time: mean(&column_values(&self.table, "session_time")),
            avg_doomscroll_length: mean(&column_values(&self.table, "doomscroll_length")),
            avg_rage_clicks: mean(&column_values(&self.table, "rage_clicks")),
            notif_response_rate_pct,
            avg_negative_engagement_score: mean(&column_values(
                &self.table,
                "total_negative_engagement_score",
            )),
        })
    }

    pub fn trait_distribution(&self, filter: &TraitFilter) -> Result<Vec<CategoryCount>, Unavailable> {
        let section = "Trait distribution";
        require(&self.table, section, &["predicted_trait_label"])?;
        let table = self.filtered_rows(section, filter)?;
        let labels = table.column("predicted_trait_label").unwrap_or_default();
        Ok(value_counts(&labels))
    }

    pub fn engagement_by_trait(&self, filter: &TraitFilter) -> Result<Vec<TraitEngagement>, Unavailable> {
        let section = "Engagement heatmap";
        require(&self.table, section, &HEATMAP_COLUMNS)?;
        let table = self.filtered_rows(section, filter)?;

        let labels = table.column("predicted_trait_label").unwrap_or_default();
        let session = table.numeric_column("session_time").unwrap_or_default();
        let doom = table.numeric_column("doomscroll_length").unwrap_or_default();
        let rage = table.numeric_column("rage_clicks").unwrap_or_default();
        let negative = table
            .numeric_column("total_negative_engagement_score")
            .unwrap_or_default();

        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (row, &label) in labels.iter().enumerate() {
            groups.entry(label).or_default().push(row);
        }

        let group_mean = |column: &[Option<f64>], rows: &[usize]| -> Option<f64> {
            let values: Vec<f64> = rows.iter().filter_map(|&r| column[r]).collect();
            mean(&values)
        };

        Ok(groups
            .into_iter()
            .map(|(label, rows)| TraitEngagement {
                trait_label: label.to_string(),
                users: rows.len(),
                avg_session_time: group_mean(&session, &rows),
                avg_doomscroll_length: group_mean(&doom, &rows),
                avg_rage_clicks: group_mean(&rage, &rows),
                avg_negative_engagement_score: group_mean(&negative, &rows),
            })
            .collect())
    }

    pub fn ad_distribution(&self, filter: &TraitFilter) -> Result<AdDistribution, Unavailable> {
        let section = "Ad emotion & category distribution";
        require(&self.table, section, &AD_COLUMNS)?;
        let table = self.filtered_rows(section, filter)?;

        Ok(AdDistribution {
            emotions: value_counts(&table.column("ad_click_emotion").unwrap_or_default()),
            categories: value_counts(&table.column("ad_category_clicked").unwrap_or_default()),
        })
    }

    pub fn user_profile(&self, user_id: &str) -> Result<UserProfile, Unavailable> {
        let section = format!("Profile for {}", user_id);
        require(&self.table, &section, &["user_id"])?;

        let row = self
            .table
            .column("user_id")
            .and_then(|ids| ids.iter().position(|id| *id == user_id))
            .ok_or_else(|| Unavailable {
                section: section.clone(),
                reason: format!("user '{}' not found", user_id),
            })?;

        let fields = self
            .table
            .columns()
            .iter()
            .zip(&self.table.rows()[row])
            .map(|(name, value)| ProfileField {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();

        Ok(UserProfile {
            user_id: user_id.to_string(),
            predicted_trait_label: self.table.cell(row, "predicted_trait_label").map(str::to_string),
            fields,
            explanation: explain(&self.table, row),
        })
    }
}

/// Reconstruct why a row carries its label
fn explain(table: &Table, row: usize) -> Vec<String> {
    let number = |column: &str| table.cell(row, column).and_then(parse_number);
    let mut lines = Vec::new();

    let signals = match (
        number("rage_clicks"),
        number("doomscroll_length"),
        number("keyword_sentiment_score"),
        table
            .cell(row, "ad_click_emotion")
            .and_then(|c| c.parse::<AdEmotion>().ok()),
    ) {
        (Some(rage), Some(doom), Some(sentiment), Some(emotion)) if is_click_count(rage) => Some(LabelSignals {
            rage_clicks: rage as u32,
            doomscroll_length: doom,
            keyword_sentiment_score: sentiment,
            ad_click_emotion: emotion,
        }),
        _ => None,
    };

    match signals.as_ref().map(matching_rule) {
        Some(Some(rule)) => lines.push(format!(
            "Rule '{}' fired ({}), allowing: {}",
            rule.name,
            rule.condition,
            join_labels(rule.outcome.candidates())
        )),
        Some(None) => lines.push(
            "No specific rule matched; the label was drawn uniformly from all traits".to_string(),
        ),
        None => lines.push("Labeling inputs are unavailable for this row".to_string()),
    }

    if let (Some(score), Some(doom), Some(rage)) = (
        number("total_negative_engagement_score"),
        number("doomscroll_length"),
        number("rage_clicks"),
    ) {
        lines.push(format!(
            "Total negative engagement score {:.1} ({:.1} min doomscrolling, {} rage clicks)",
            score, doom, rage
        ));
    }

    if let Some(category) = table.cell(row, "feed_bias_category") {
        let category = if category.is_empty() { "unknown" } else { category };
        lines.push(format!("Content consumed with a '{}' feed bias", category));
    }

    if let Some(flag) = table.cell(row, "active_notif_responder") {
        let verb = if flag.trim() == "1" { "responded" } else { "did not respond" };
        lines.push(format!("User {} to the notification", verb));
    }

    lines
}

/// Whole, non-negative and within `u32`; anything else cannot be a click count
fn is_click_count(value: f64) -> bool {
    value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64
}

fn join_labels(labels: &[TraitLabel]) -> String {
    labels
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn require(table: &Table, section: &str, columns: &[&str]) -> Result<(), Unavailable> {
    let missing = table.missing_columns(columns);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Unavailable::missing(section, &missing))
    }
}

fn column_values(table: &Table, name: &str) -> Vec<f64> {
    table
        .numeric_column(name)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Counts per distinct value, most frequent first, ties by value
fn value_counts(values: &[&str]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(value, count)| CategoryCount {
            value: value.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    out
}

/// A section as shown in the assembled dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SectionView<T> {
    Available(T),
    Unavailable(Unavailable),
}

impl<T> From<Result<T, Unavailable>> for SectionView<T> {
    fn from(result: Result<T, Unavailable>) -> Self {
        match result {
            Ok(value) => SectionView::Available(value),
            Err(unavailable) => SectionView::Unavailable(unavailable),
        }
    }
}

/// Every dashboard section, assembled for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub overview: SectionView<OverviewMetrics>,
    pub trait_distribution: SectionView<Vec<CategoryCount>>,
    pub engagement_by_trait: SectionView<Vec<TraitEngagement>>,
    pub ad_distribution: SectionView<AdDistribution>,
    pub user_profile: Option<SectionView<UserProfile>>,
}

impl DashboardView {
    pub fn build(dashboard: &Dashboard, filter: &TraitFilter, user_id: Option<&str>) -> Self {
        Self {
            overview: dashboard.overview().into(),
            trait_distribution: dashboard.trait_distribution(filter).into(),
            engagement_by_trait: dashboard.engagement_by_trait(filter).into(),
            ad_distribution: dashboard.ad_distribution(filter).into(),
            user_profile: user_id.map(|id| dashboard.user_profile(id).into()),
        }
    }

    /// Render the dashboard as plain text
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "ShadowPersona Dashboard");
        let _ = writeln!(out, "=======================");

        heading(&mut out, "Overall Behavioral Metrics");
        match &self.overview {
            SectionView::Available(m) => {
                let _ = writeln!(out, "  Records:                       {}", m.records);
                let _ = writeln!(out, "  Avg Session Time (min):        {}", fmt_opt(m.avg_session_time));
                let _ = writeln!(out, "  Avg Doomscroll Length (min):   {}", fmt_opt(m.avg_doomscroll_length));
                let _ = writeln!(out, "  Avg Rage Clicks:               {}", fmt_opt(m.avg_rage_clicks));
                let _ = writeln!(
                    out,
                    "  Notification Response Rate:    {}",
                    m.notif_response_rate_pct
                        .map(|v| format!("{:.1}%", v))
                        .unwrap_or_else(|| "n/a".to_string())
                );
                let _ = writeln!(
                    out,
                    "  Avg Negative Engagement Score: {}",
                    fmt_opt(m.avg_negative_engagement_score)
                );
            }
            SectionView::Unavailable(u) => unavailable(&mut out, u),
        }

        heading(&mut out, "Distribution of Simulated Psychological Traits");
        match &self.trait_distribution {
            SectionView::Available(counts) => bars(&mut out, counts),
            SectionView::Unavailable(u) => unavailable(&mut out, u),
        }

        heading(&mut out, "Average Engagement Metrics by Simulated Trait");
        match &self.engagement_by_trait {
            SectionView::Available(rows) => {
                let _ = writeln!(
                    out,
                    "  {:<12} {:>6} {:>9} {:>11} {:>12} {:>14}",
                    "trait", "users", "session", "doomscroll", "rage_clicks", "neg_engagement"
                );
                for r in rows {
                    let _ = writeln!(
                        out,
                        "  {:<12} {:>6} {:>9} {:>11} {:>12} {:>14}",
                        r.trait_label,
                        r.users,
                        fmt_opt(r.avg_session_time),
                        fmt_opt(r.avg_doomscroll_length),
                        fmt_opt(r.avg_rage_clicks),
                        fmt_opt(r.avg_negative_engagement_score)
                    );
                }
            }
            SectionView::Unavailable(u) => unavailable(&mut out, u),
        }

        heading(&mut out, "Ad Emotion & Category Distribution");
        match &self.ad_distribution {
            SectionView::Available(ads) => {
                let _ = writeln!(out, "  Emotions:");
                bars(&mut out, &ads.emotions);
                let _ = writeln!(out, "  Categories:");
                bars(&mut out, &ads.categories);
            }
            SectionView::Unavailable(u) => unavailable(&mut out, u),
        }

        if let Some(profile) = &self.user_profile {
            match profile {
                SectionView::Available(p) => {
                    heading(&mut out, &format!("Simulated Psychological Profile for User: {}", p.user_id));
                    for field in &p.fields {
                        let value = if field.value.is_empty() { "n/a" } else { field.value.as_str() };
                        let _ = writeln!(out, "  {:<32} {}", field.name, value);
                    }
                    let _ = writeln!(out);
                    let _ = writeln!(
                        out,
                        "  Why was {} profiled as {}?",
                        p.user_id,
                        p.predicted_trait_label.as_deref().unwrap_or("n/a")
                    );
                    for line in &p.explanation {
                        let _ = writeln!(out, "  - {}", line);
                    }
                }
                SectionView::Unavailable(u) => {
                    heading(&mut out, &u.section);
                    unavailable(&mut out, u);
                }
            }
        }

        out
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

fn unavailable(out: &mut String, u: &Unavailable) {
    let _ = writeln!(out, "  [info] {}", u);
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn bars(out: &mut String, counts: &[CategoryCount]) {
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    for c in counts {
        let len = if max == 0 { 0 } else { c.count * BAR_WIDTH / max };
        let _ = writeln!(out, "  {:<14} {:>7} {}", c.value, c.count, "#".repeat(len));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureDeriver;
    use crate::generator::{GeneratorConfig, RecordCount, RecordGenerator};
    use pretty_assertions::assert_eq;

    fn processed(n: usize, seed: u64) -> Dashboard {
        let records = RecordGenerator::new(&GeneratorConfig::seeded(seed)).generate(RecordCount::new(n));
        Dashboard::from_table(FeatureDeriver::derive_table(Table::from_records(&records)).unwrap())
    }

    fn tiny_table() -> Table {
        let mut table = Table::new([
            "user_id",
            "session_time",
            "rage_clicks",
            "doomscroll_length",
            "ad_click_emotion",
            "keyword_sentiment_score",
            "ad_category_clicked",
            "predicted_trait_label",
            "total_negative_engagement_score",
            "active_notif_responder",
            "feed_bias_category",
        ]);
        let rows = [
            ["user_00000", "10", "10", "5.0", "anger", "0.1", "tech", "anxious", "8.5", "1", "neutral"],
            ["user_00001", "20", "0", "0.0", "joy", "-0.9", "food", "skeptical", "0.0", "0", ""],
            ["user_00002", "30", "0", "0.0", "curiosity", "0.3", "tech", "curious", "0.0", "1", "left_leaning"],
            ["user_00003", "40", "2", "10.0", "joy", "0.3", "news", "anxious", "8.0", "1", "right_leaning"],
        ];
        for row in rows {
            table.push_row(row.iter().map(|c| c.to_string()).collect()).unwrap();
        }
        table
    }

    #[test]
    fn test_overview_metrics() {
        let overview = Dashboard::from_table(tiny_table()).overview().unwrap();

        assert_eq!(overview.records, 4);
        assert_eq!(overview.avg_session_time, Some(25.0));
        assert_eq!(overview.avg_rage_clicks, Some(3.0));
        assert_eq!(overview.notif_response_rate_pct, Some(75.0));
        assert_eq!(overview.avg_negative_engagement_score, Some(4.125));
    }

    #[test]
    fn test_trait_distribution_sorted_by_count_then_name() {
        let counts = Dashboard::from_table(tiny_table())
            .trait_distribution(&TraitFilter::All)
            .unwrap();

        assert_eq!(
            counts,
            vec![
                CategoryCount { value: "anxious".into(), count: 2 },
                CategoryCount { value: "curious".into(), count: 1 },
                CategoryCount { value: "skeptical".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_filter_restricts_aggregates_but_not_overview() {
        let dashboard = Dashboard::from_table(tiny_table());
        let filter = TraitFilter::Only(vec![TraitLabel::Anxious]);

        let heatmap = dashboard.engagement_by_trait(&filter).unwrap();
        assert_eq!(heatmap.len(), 1);
        assert_eq!(heatmap[0].trait_label, "anxious");
        assert_eq!(heatmap[0].users, 2);
        assert_eq!(heatmap[0].avg_session_time, Some(25.0));
        assert_eq!(heatmap[0].avg_doomscroll_length, Some(7.5));

        let ads = dashboard.ad_distribution(&filter).unwrap();
        assert_eq!(ads.categories.iter().map(|c| c.count).sum::<usize>(), 2);

        assert_eq!(dashboard.overview().unwrap().records, 4);
    }

    #[test]
    fn test_filter_with_no_matches_degrades_every_aggregate() {
        let dashboard = Dashboard::from_table(tiny_table());
        let filter = TraitFilter::Only(vec![TraitLabel::Distracted]);

        let reasons = [
            dashboard.trait_distribution(&filter).unwrap_err().reason,
            dashboard.engagement_by_trait(&filter).unwrap_err().reason,
            dashboard.ad_distribution(&filter).unwrap_err().reason,
        ];
        for reason in reasons {
            assert_eq!(reason, "no rows match the selected traits");
        }
        assert_eq!(dashboard.overview().unwrap().records, 4);
    }

    #[test]
    fn test_fractional_rage_clicks_are_not_explained() {
        let mut table = tiny_table();
        let rage: Vec<String> = ["5.9", "0", "0", "2"].iter().map(|c| c.to_string()).collect();
        table.set_column("rage_clicks", rage).unwrap();
        let dashboard = Dashboard::from_table(table);

        let profile = dashboard.user_profile("user_00000").unwrap();
        assert_eq!(profile.explanation[0], "Labeling inputs are unavailable for this row");

        let integral = dashboard.user_profile("user_00003").unwrap();
        assert!(integral.explanation[0].contains("No specific rule matched"));
    }

    #[test]
    fn test_missing_columns_degrade_per_section() {
        let mut table = Table::new(["user_id", "predicted_trait_label"]);
        table
            .push_row(vec!["user_00000".into(), "curious".into()])
            .unwrap();
        let dashboard = Dashboard::from_table(table);

        let err = dashboard.overview().unwrap_err();
        assert_eq!(err.section, "Overall Behavioral Metrics");
        assert!(err.reason.contains("session_time"));
        assert!(err.reason.contains("total_negative_engagement_score"));

        assert!(dashboard.trait_distribution(&TraitFilter::All).is_ok());
        assert!(dashboard.engagement_by_trait(&TraitFilter::All).is_err());
        assert!(dashboard.ad_distribution(&TraitFilter::All).is_err());

        let view = DashboardView::build(&dashboard, &TraitFilter::All, Some("user_00000"));
        let text = view.render_text();
        assert!(text.contains("cannot be displayed"));
        assert!(text.contains("Labeling inputs are unavailable"));
    }

    #[test]
    fn test_user_profile_explains_rule() {
        let dashboard = Dashboard::from_table(tiny_table());

        let anxious = dashboard.user_profile("user_00000").unwrap();
        assert_eq!(anxious.predicted_trait_label.as_deref(), Some("anxious"));
        assert!(anxious.explanation[0].contains("high_negative_engagement"));
        assert_eq!(anxious.fields.len(), dashboard.table().columns().len());

        let skeptical = dashboard.user_profile("user_00001").unwrap();
        assert!(skeptical.explanation[0].contains("negative_sentiment"));
        assert!(skeptical
            .explanation
            .iter()
            .any(|l| l.contains("'unknown' feed bias")));
        assert!(skeptical.explanation.iter().any(|l| l.contains("did not respond")));

        let fallback = dashboard.user_profile("user_00003").unwrap();
        assert!(fallback.explanation[0].contains("No specific rule matched"));
    }

    #[test]
    fn test_unknown_user_is_unavailable() {
        let err = Dashboard::from_table(tiny_table())
            .user_profile("user_99999")
            .unwrap_err();
        assert!(err.reason.contains("not found"));
    }

    #[test]
    fn test_full_view_over_generated_data() {
        let dashboard = processed(500, 77);
        let view = DashboardView::build(&dashboard, &TraitFilter::All, Some("user_00042"));

        match &view.trait_distribution {
            SectionView::Available(counts) => {
                assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), 500);
            }
            other => panic!("expected trait distribution, got {:?}", other),
        }
        assert!(matches!(view.user_profile, Some(SectionView::Available(_))));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["overview"]["status"], "available");
        assert_eq!(json["overview"]["data"]["records"], 500);

        let text = view.render_text();
        assert!(text.contains("Overall Behavioral Metrics"));
        assert!(text.contains("user_00042"));
    }

    #[test]
    fn test_empty_table_overview() {
        let dashboard = processed(0, 1);
        let overview = dashboard.overview().unwrap();

        assert_eq!(overview.records, 0);
        assert_eq!(overview.avg_session_time, None);
        assert_eq!(overview.notif_response_rate_pct, None);
    }
}
