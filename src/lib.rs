//! ShadowPersona - Synthetic user engagement data with simulated psychological traits
//!
//! ShadowPersona produces a simulated dataset of social-media engagement
//! records through a deterministic pipeline: record generation → rule-based
//! trait labeling → feature derivation → persistence. The processed dataset
//! can then be summarized or inspected through dashboard views.
//!
//! ## Modules
//!
//! - **Generator**: Seeded random engagement records with a predicted trait label
//! - **Features**: Derived engagement columns over typed records or loaded tables
//! - **Pipeline**: Generate → derive → save, with a timed run report
//! - **Dashboard / EDA**: Read-only summaries over a persisted dataset

pub mod dashboard;
pub mod eda;
pub mod error;
pub mod features;
pub mod generator;
pub mod labeling;
pub mod pipeline;
pub mod store;
pub mod table;
pub mod types;

pub use error::PipelineError;
pub use features::FeatureDeriver;
pub use generator::{GeneratorConfig, RecordCount, RecordGenerator};
pub use pipeline::{DataPipeline, PipelineConfig, PipelineReport};
pub use table::Table;

// Dashboard exports
pub use dashboard::{Dashboard, DashboardView, TraitFilter, Unavailable};

/// ShadowPersona version reported by the CLI and run reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "shadowpersona";
