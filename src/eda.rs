//! Exploratory summary statistics
//!
//! Computes a per-column description of a table: numeric columns get count,
//! mean, spread and quantiles; all other columns get cardinality and their
//! most frequent value.

use std::collections::HashMap;

use serde::Serialize;

use crate::table::{parse_number, Table};

/// Statistics of a numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` with fewer than two values
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Statistics of a categorical column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalStats {
    pub unique: usize,
    /// Most frequent value; ties go to the value seen first
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric(NumericStats),
    Categorical(CategoricalStats),
    /// Every cell is missing
    Empty,
}

/// Description of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Non-missing cells
    pub count: usize,
    /// Empty or NaN cells
    pub missing: usize,
    pub stats: ColumnStats,
}

/// Describe every column of `table`, in column order
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .filter_map(|name| table.column(name).map(|cells| describe_column(name, &cells)))
        .collect()
}

fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

fn describe_column(name: &str, cells: &[&str]) -> ColumnSummary {
    let present: Vec<&str> = cells.iter().copied().filter(|c| !is_missing(c)).collect();
    let missing = cells.len() - present.len();

    let numbers: Option<Vec<f64>> = present
        .iter()
        .map(|c| parse_number(c).filter(|v| v.is_finite()))
        .collect();

    let stats = if present.is_empty() {
        ColumnStats::Empty
    } else {
        match numbers {
            Some(values) => ColumnStats::Numeric(numeric_stats(values)),
            None => ColumnStats::Categorical(categorical_stats(&present)),
        }
    };

    ColumnSummary {
        name: name.to_string(),
        count: present.len(),
        missing,
        stats,
    }
}

fn numeric_stats(mut values: Vec<f64>) -> NumericStats {
    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() > 1 {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(variance.sqrt())
    } else {
        None
    };

    NumericStats {
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[values.len() - 1],
    }
}

/// Linear-interpolated quantile of sorted, non-empty `values`
fn quantile(values: &[f64], q: f64) -> f64 {
    let pos = q * (values.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

fn categorical_stats(present: &[&str]) -> CategoricalStats {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for &value in present {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut top: Option<&str> = None;
    let mut freq = 0;
    for &value in &order {
        let count = counts[value];
        if count > freq {
            top = Some(value);
            freq = count;
        }
    }

    CategoricalStats {
        unique: order.len(),
        top: top.map(str::to_string),
        freq,
    }
}

/// Render summaries as an aligned text report
pub fn render_text(summaries: &[ColumnSummary]) -> String {
    let width = summaries
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();

    for s in summaries {
        let detail = match &s.stats {
            ColumnStats::Numeric(n) => format!(
                "mean={:.3} std={} min={:.3} 25%={:.3} 50%={:.3} 75%={:.3} max={:.3}",
                n.mean,
                n.std.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "-".to_string()),
                n.min,
                n.q25,
                n.median,
                n.q75,
                n.max
            ),
            ColumnStats::Categorical(c) => format!(
                "unique={} top={} freq={}",
                c.unique,
                c.top.as_deref().unwrap_or("-"),
                c.freq
            ),
            ColumnStats::Empty => "all values missing".to_string(),
        };
        out.push_str(&format!(
            "{:<width$}  count={:<6} missing={:<6} {}\n",
            s.name,
            s.count,
            s.missing,
            detail,
            width = width
        ));
    }
    out
}
