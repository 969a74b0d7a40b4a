//! Pipeline orchestration
//!
//! This module provides the public API for producing a processed dataset.
//! It runs the stages in a fixed order:
//! Generator → Feature Deriver → Persistence

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::features::FeatureDeriver;
use crate::generator::{GeneratorConfig, RecordCount, RecordGenerator};
use crate::store::{read_table, write_table};
use crate::table::Table;

/// Name reported for every pipeline run
pub const FLOW_NAME: &str = "ShadowPersona Data Pipeline";

fn default_num_records() -> RecordCount {
    RecordCount::new(5000)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_filename() -> String {
    "shadowpersona_processed_data.csv".to_string()
}

fn default_raw_filename() -> String {
    "shadowpersona_user_engagement.csv".to_string()
}

/// Pipeline configuration, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Number of records to generate
    #[serde(default = "default_num_records")]
    pub num_records: RecordCount,
    /// Directory the datasets are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File name of the processed (raw + derived) dataset
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
    /// File name of the raw dataset written by stand-alone generation
    #[serde(default = "default_raw_filename")]
    pub raw_filename: String,
    /// Random seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_records: default_num_records(),
            output_dir: default_output_dir(),
            output_filename: default_output_filename(),
            raw_filename: default_raw_filename(),
            seed: None,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from JSON; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let json = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Path of the processed dataset
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_filename)
    }

    /// Path of the raw dataset
    pub fn raw_output_path(&self) -> PathBuf {
        self.output_dir.join(&self.raw_filename)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig { seed: self.seed }
    }
}

/// Timing of one pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub name: String,
    pub duration_ms: f64,
}

/// Summary of a completed pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub flow_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records: usize,
    pub columns: Vec<String>,
    pub output_path: PathBuf,
    pub seed: Option<u64>,
    pub stages: Vec<StageReport>,
}

/// Stage 1: generate the raw table
pub fn generate_data<R: Rng>(generator: &mut RecordGenerator<R>, count: RecordCount) -> Table {
    log::info!("Generating {} synthetic records...", count);
    let records = generator.generate(count);
    let table = Table::from_records(&records);
    log::info!("Generated {} records.", table.len());
    table
}

/// Stage 2: append derived feature columns
pub fn feature_engineer_data(table: Table) -> Result<Table, PipelineError> {
    log::info!("Performing feature engineering...");
    let table = FeatureDeriver::derive_table(table)?;
    log::info!("Feature engineering complete.");
    Ok(table)
}

/// Stage 3: persist the table
pub fn save_data(table: &Table, output_path: &Path) -> Result<(), PipelineError> {
    log::info!("Saving data to {}...", output_path.display());
    write_table(table, output_path)?;
    log::info!("Data saved successfully to {}.", output_path.display());
    Ok(())
}

/// Generate and persist a raw (underived) dataset
pub fn generate_raw_dataset<R: Rng>(
    generator: &mut RecordGenerator<R>,
    count: RecordCount,
    output_path: &Path,
) -> Result<Table, PipelineError> {
    let table = generate_data(generator, count);
    save_data(&table, output_path)?;
    Ok(table)
}

/// Derive features for an existing raw dataset file and persist the result
pub fn derive_file(input: &Path, output: &Path) -> Result<Table, PipelineError> {
    log::info!("Loading {}...", input.display());
    let table = read_table(input)?;
    let table = feature_engineer_data(table)?;
    save_data(&table, output)?;
    Ok(table)
}

/// Orchestrates generation, feature engineering, and saving
pub struct DataPipeline {
    config: PipelineConfig,
}

impl Default for DataPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl DataPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline with a generator built from the configuration
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let mut generator = RecordGenerator::new(&self.config.generator_config());
        self.run_with_generator(&mut generator)
    }

    /// Run the pipeline drawing records from `generator`
    pub fn run_with_generator<R: Rng>(
        &self,
        generator: &mut RecordGenerator<R>,
    ) -> Result<PipelineReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let output_path = self.config.output_path();
        let mut stages = Vec::with_capacity(3);

        log::info!("Starting {} (run {})...", FLOW_NAME, run_id);

        // Stage 1: Generate raw data
        let timer = Instant::now();
        let raw = generate_data(generator, self.config.num_records);
        stages.push(stage_report("generate_data", timer));

        // Stage 2: Perform feature engineering
        let timer = Instant::now();
        let processed = feature_engineer_data(raw)?;
        stages.push(stage_report("feature_engineer_data", timer));

        // Stage 3: Save processed data
        let timer = Instant::now();
        save_data(&processed, &output_path)?;
        stages.push(stage_report("save_data", timer));

        log::info!("{} completed successfully.", FLOW_NAME);

        Ok(PipelineReport {
            run_id,
            flow_name: FLOW_NAME.to_string(),
            started_at,
            finished_at: Utc::now(),
            records: processed.len(),
            columns: processed.columns().to_vec(),
            output_path,
            seed: self.config.seed,
            stages,
        })
    }
}

fn stage_report(name: &str, timer: Instant) -> StageReport {
    StageReport {
        name: name.to_string(),
        duration_ms: timer.elapsed().as_secs_f64() * 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DERIVED_COLUMNS, RAW_COLUMNS};
    use pretty_assertions::assert_eq;
    use rand::rngs::mock::StepRng;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, num_records: usize, seed: Option<u64>) -> PipelineConfig {
        PipelineConfig {
            num_records: RecordCount::new(num_records),
            output_dir: dir.path().join("data"),
            seed,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_default_config_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.num_records.get(), 5000);
        assert_eq!(
            config.output_path(),
            PathBuf::from("data/shadowpersona_processed_data.csv")
        );
        assert_eq!(
            config.raw_output_path(),
            PathBuf::from("data/shadowpersona_user_engagement.csv")
        );
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config = PipelineConfig::from_json(r#"{ "num_records": 10, "seed": 9 }"#).unwrap();
        assert_eq!(config.num_records.get(), 10);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.output_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_config_rejects_invalid_counts() {
        assert!(PipelineConfig::from_json(r#"{ "num_records": -1 }"#).is_err());
        assert!(PipelineConfig::from_json(r#"{ "num_records": 2.5 }"#).is_err());
        assert!(PipelineConfig::from_json(r#"{ "num_records": "ten" }"#).is_err());
        assert!(PipelineConfig::from_json(r#"{ "records": 10 }"#).is_err());
    }

    #[test]
    fn test_run_writes_full_schema() {
        let dir = TempDir::new().unwrap();
        let pipeline = DataPipeline::new(config_in(&dir, 25, Some(1)));

        let report = pipeline.run().unwrap();

        assert_eq!(report.records, 25);
        assert_eq!(report.flow_name, FLOW_NAME);
        assert_eq!(report.columns.len(), RAW_COLUMNS.len() + DERIVED_COLUMNS.len());
        assert_eq!(
            report.stages.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["generate_data", "feature_engineer_data", "save_data"]
        );
        assert!(report.finished_at >= report.started_at);

        let table = read_table(&report.output_path).unwrap();
        assert_eq!(table.len(), 25);
        assert_eq!(table.columns(), report.columns.as_slice());
    }

    #[test]
    fn test_zero_records_still_writes_header() {
        let dir = TempDir::new().unwrap();
        let report = DataPipeline::new(config_in(&dir, 0, Some(1))).run().unwrap();

        let text = fs::read_to_string(&report.output_path).unwrap();
        let expected_header: Vec<&str> = RAW_COLUMNS.iter().chain(DERIVED_COLUMNS.iter()).copied().collect();
        assert_eq!(text, format!("{}\n", expected_header.join(",")));
    }

    #[test]
    fn test_same_seed_writes_identical_files() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();

        let a = DataPipeline::new(config_in(&dir_a, 3, Some(2024))).run().unwrap();
        let b = DataPipeline::new(config_in(&dir_b, 3, Some(2024))).run().unwrap();

        assert_ne!(a.run_id, b.run_id);
        assert_eq!(
            fs::read_to_string(&a.output_path).unwrap(),
            fs::read_to_string(&b.output_path).unwrap()
        );
    }

    #[test]
    fn test_pinned_source_snapshot() {
        let dir = TempDir::new().unwrap();
        let pipeline = DataPipeline::new(config_in(&dir, 3, None));
        let mut generator = RecordGenerator::with_rng(StepRng::new(0, 0));

        let report = pipeline.run_with_generator(&mut generator).unwrap();
        let text = fs::read_to_string(&report.output_path).unwrap();

        assert_eq!(
            text,
            "user_id,session_time,rage_clicks,doomscroll_length,ad_click_emotion,feed_bias_score,\
notification_time,notif_response_time,keyword_sentiment_score,ad_category_clicked,\
predicted_trait_label,total_negative_engagement_score,active_notif_responder,feed_bias_category\n\
user_00000,5,0,0.0,anger,0.0,08:00:00,1.0,-1.0,finance,skeptical,0.0,1,left_leaning\n\
user_00001,5,0,0.0,anger,0.0,08:00:00,1.0,-1.0,finance,skeptical,0.0,1,left_leaning\n\
user_00002,5,0,0.0,anger,0.0,08:00:00,1.0,-1.0,finance,skeptical,0.0,1,left_leaning\n"
        );
    }

    #[test]
    fn test_seeded_run_snapshot() {
        let dir = TempDir::new().unwrap();
        let report = DataPipeline::new(config_in(&dir, 3, Some(42))).run().unwrap();
        let text = fs::read_to_string(&report.output_path).unwrap();

        assert_eq!(
            text,
            "user_id,session_time,rage_clicks,doomscroll_length,ad_click_emotion,feed_bias_score,\
notification_time,notif_response_time,keyword_sentiment_score,ad_category_clicked,\
predicted_trait_label,total_negative_engagement_score,active_notif_responder,feed_bias_category\n\
user_00000,20,8,0.0,joy,0.03434281795495609,17:24:00,,0.698503208898833,finance,impulsive,4.0,0,left_leaning\n\
user_00001,105,0,0.0,curiosity,0.46361781350471787,15:58:00,6.486951556860279,-0.39605041483835757,food,curious,0.0,1,neutral\n\
user_00002,28,0,0.0,joy,0.8884847760655823,21:25:00,48.714800292459465,-0.2916530714273583,fashion,skeptical,0.0,1,right_leaning\n"
        );
    }

    #[test]
    fn test_generate_raw_then_derive_file() {
        let dir = TempDir::new().unwrap();
        let raw_path = dir.path().join("raw.csv");
        let out_path = dir.path().join("out").join("processed.csv");

        let mut generator = RecordGenerator::new(&GeneratorConfig::seeded(5));
        let raw = generate_raw_dataset(&mut generator, RecordCount::new(40), &raw_path).unwrap();
        assert_eq!(raw.columns().len(), RAW_COLUMNS.len());

        let processed = derive_file(&raw_path, &out_path).unwrap();
        assert_eq!(processed.len(), 40);
        assert_eq!(read_table(&out_path).unwrap(), processed);
    }

    #[test]
    fn test_derive_file_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = derive_file(&dir.path().join("nope.csv"), &dir.path().join("out.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::IoFailure { .. }));
    }

    #[test]
    fn test_report_serializes() {
        let dir = TempDir::new().unwrap();
        let report = DataPipeline::new(config_in(&dir, 2, Some(3))).run().unwrap();

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["records"], 2);
        assert_eq!(json["seed"], 3);
        assert!(json["run_id"].is_string());
    }
}
