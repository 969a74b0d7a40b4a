//! Row-oriented dataset table
//!
//! A `Table` is a header of column names plus rows of text cells, the same
//! shape the dataset is persisted in. The feature deriver, the EDA report and
//! the dashboard all operate on tables so that they tolerate files written by
//! other tools, including files with missing or extra columns.

use serde::Serialize;

use crate::error::PipelineError;
use crate::types::{DerivedEngagementRecord, EngagementRecord, DERIVED_COLUMNS, RAW_COLUMNS};

/// Field delimiter of the persisted format
pub const DELIMITER: char = ',';

/// Column-named rows of text cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a raw-schema table from generated records
    pub fn from_records(records: &[EngagementRecord]) -> Self {
        let mut table = Table::new(RAW_COLUMNS);
        table.rows = records.iter().map(raw_cells).collect();
        table
    }

    /// Build a raw+derived table from derived records
    pub fn from_derived(records: &[DerivedEngagementRecord]) -> Self {
        let mut table = Table::new(RAW_COLUMNS);
        table.columns.extend(DERIVED_COLUMNS.iter().map(|c| c.to_string()));
        table.rows = records
            .iter()
            .map(|derived| {
                let mut cells = raw_cells(&derived.record);
                cells.push(format_float(derived.total_negative_engagement_score));
                cells.push(derived.active_notif_responder.to_string());
                cells.push(
                    derived
                        .feed_bias_category
                        .map(|c| c.as_str().to_string())
                        .unwrap_or_default(),
                );
                cells
            })
            .collect();
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row; it must have one cell per column
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), PipelineError> {
        if row.len() != self.columns.len() {
            return Err(PipelineError::SchemaViolation(format!(
                "row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Index of a column that must be present
    pub fn require_column(&self, name: &str) -> Result<usize, PipelineError> {
        self.column_index(name).ok_or_else(|| {
            PipelineError::SchemaViolation(format!("missing required column '{}'", name))
        })
    }

    /// Names from `expected` that this table lacks, in the order given
    pub fn missing_columns<'a>(&self, expected: &[&'a str]) -> Vec<&'a str> {
        expected
            .iter()
            .copied()
            .filter(|name| !self.has_column(name))
            .collect()
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// Cells of one column parsed as numbers; missing or unparsable cells are `None`
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name)
            .map(|cells| cells.into_iter().map(parse_number).collect())
    }

    /// Cell at (`row`, `column`)
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| r[index].as_str())
    }

    /// Replace a column's cells, or append the column when absent
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), PipelineError> {
        if values.len() != self.rows.len() {
            return Err(PipelineError::SchemaViolation(format!(
                "column '{}' has {} values but table has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Keep only the rows for which `keep` returns true
    pub fn filter_rows(&self, mut keep: impl FnMut(&Table, usize) -> bool) -> Table {
        let rows = (0..self.rows.len())
            .filter(|&i| keep(self, i))
            .map(|i| self.rows[i].clone())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Encode as delimited text with a header row
    pub fn to_delimited(&self) -> String {
        let mut out = String::new();
        write_line(&mut out, &self.columns);
        for row in &self.rows {
            write_line(&mut out, row);
        }
        out
    }

    /// Decode delimited text whose first record is the header
    pub fn from_delimited(text: &str) -> Result<Table, PipelineError> {
        let mut records = parse_records(text)?.into_iter();

        let (_, columns) = records
            .next()
            .ok_or_else(|| PipelineError::ParseError("missing header row".to_string()))?;

        let mut table = Table::new(columns);
        for (line, row) in records {
            if row.len() != table.columns.len() {
                return Err(PipelineError::ParseError(format!(
                    "line {}: expected {} fields, got {}",
                    line,
                    table.columns.len(),
                    row.len()
                )));
            }
            table.rows.push(row);
        }
        Ok(table)
    }
}

fn raw_cells(record: &EngagementRecord) -> Vec<String> {
    vec![
        record.user_id.clone(),
        record.session_time.to_string(),
        record.rage_clicks.to_string(),
        format_float(record.doomscroll_length),
        record.ad_click_emotion.as_str().to_string(),
        format_float(record.feed_bias_score),
        record.notification_time_str(),
        record
            .notif_response_time
            .map(format_float)
            .unwrap_or_default(),
        format_float(record.keyword_sentiment_score),
        record.ad_category_clicked.as_str().to_string(),
        record.predicted_trait_label.as_str().to_string(),
    ]
}

/// Shortest round-trip form, never in exponent notation and always with a
/// fractional part (`0.0`, `12.5`, `0.00001`)
pub fn format_float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text + ".0"
    } else {
        text
    }
}

/// Parse a numeric cell; empty, unparsable and NaN cells are `None`
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn needs_quoting(cell: &str) -> bool {
    cell.contains(DELIMITER) || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

fn write_line(out: &mut String, cells: &[String]) {
    // A lone empty cell would otherwise be a blank line, which readers skip
    if let [only] = cells {
        if only.is_empty() {
            out.push_str("\"\"\n");
            return;
        }
    }
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        if needs_quoting(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Split delimited text into records of fields, tagged with their 1-based start line
fn parse_records(text: &str) -> Result<Vec<(usize, Vec<String>)>, PipelineError> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut record_started = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                record_started = true;
            }
            c if c == DELIMITER => {
                fields.push(std::mem::take(&mut field));
                record_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if record_started || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    records.push((record_line, std::mem::take(&mut fields)));
                }
                record_started = false;
                line += 1;
                record_line = line;
            }
            _ => {
                field.push(c);
                record_started = true;
            }
        }
    }

    if in_quotes {
        return Err(PipelineError::ParseError(format!(
            "line {}: unterminated quoted field",
            record_line
        )));
    }
    if record_started || !field.is_empty() {
        fields.push(field);
        records.push((record_line, fields));
    }

    Ok(records)
}
