//! Synthetic record generation
//!
//! Produces independent engagement records from an explicitly owned random
//! source. Seeding the source makes a run reproducible.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::labeling::{assign_label, LabelSignals};
use crate::types::{AdCategory, AdEmotion, EngagementRecord};

/// Probability that a session has any rage clicks at all
const RAGE_CLICK_PROBABILITY: f64 = 0.3;

/// Probability that a session includes doomscrolling
const DOOMSCROLL_PROBABILITY: f64 = 0.5;

/// Probability that a user responds to the notification
const NOTIF_RESPONSE_PROBABILITY: f64 = 0.7;

/// Largest record count accepted from text, integers or floats
const MAX_RECORD_COUNT: u32 = u32::MAX;

/// A validated, non-negative number of records to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "u64")]
pub struct RecordCount(usize);

impl RecordCount {
    pub fn new(count: usize) -> Self {
        Self(count)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for RecordCount {
    fn from(count: usize) -> Self {
        Self(count)
    }
}

impl From<RecordCount> for u64 {
    fn from(count: RecordCount) -> Self {
        count.0 as u64
    }
}

impl TryFrom<i64> for RecordCount {
    type Error = PipelineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(PipelineError::InvalidArgument(format!(
                "record count must be non-negative, got {}",
                value
            )));
        }
        if value > i64::from(MAX_RECORD_COUNT) {
            return Err(too_large(value));
        }
        Ok(Self(value as usize))
    }
}

impl TryFrom<f64> for RecordCount {
    type Error = PipelineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(PipelineError::InvalidArgument(format!(
                "record count must be an integer, got {}",
                value
            )));
        }
        if value < 0.0 {
            return Err(PipelineError::InvalidArgument(format!(
                "record count must be non-negative, got {}",
                value
            )));
        }
        if value > f64::from(MAX_RECORD_COUNT) {
            return Err(too_large(value));
        }
        Ok(Self(value as usize))
    }
}

fn too_large(value: impl fmt::Display) -> PipelineError {
    PipelineError::InvalidArgument(format!(
        "record count {} exceeds the maximum of {}",
        value, MAX_RECORD_COUNT
    ))
}

impl FromStr for RecordCount {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.parse::<i64>() {
            Ok(value) => Self::try_from(value),
            Err(_) => match trimmed.parse::<f64>() {
                // "2.5", "-1.5", "1e3" all land here and go through the float checks
                Ok(value) => Self::try_from(value),
                Err(_) => Err(PipelineError::InvalidArgument(format!(
                    "record count must be an integer, got '{}'",
                    trimmed
                ))),
            },
        }
    }
}

impl fmt::Display for RecordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for the record generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Random seed for reproducibility (None = seeded from entropy)
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

/// Generator of synthetic engagement records.
pub struct RecordGenerator<R: Rng = StdRng> {
    rng: R,
}

impl RecordGenerator<StdRng> {
    /// Create a generator from configuration.
    pub fn new(config: &GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl<R: Rng> RecordGenerator<R> {
    /// Create a generator drawing from a caller-supplied random source.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate `count` records with user ids `user_00000` onwards.
    pub fn generate(&mut self, count: RecordCount) -> Vec<EngagementRecord> {
        log::debug!("Generating {} synthetic records", count);
        (0..count.get()).map(|index| self.generate_record(index)).collect()
    }

    /// Generate the record at generation index `index`.
    pub fn generate_record(&mut self, index: usize) -> EngagementRecord {
        let rng = &mut self.rng;

        let session_time = rng.gen_range(5..=120);
        let rage_clicks = if rng.gen_bool(RAGE_CLICK_PROBABILITY) {
            rng.gen_range(0..15)
        } else {
            0
        };
        let doomscroll_length = if rng.gen_bool(DOOMSCROLL_PROBABILITY) {
            rng.gen_range(0.0..60.0)
        } else {
            0.0
        };
        let ad_click_emotion = pick(rng, AdEmotion::ALL);
        let feed_bias_score = rng.gen_range(0.0..=1.0);
        let notification_time = sample_notification_time(rng);
        let notif_response_time = if rng.gen_bool(NOTIF_RESPONSE_PROBABILITY) {
            Some(rng.gen_range(1.0..=60.0))
        } else {
            None
        };
        let keyword_sentiment_score = rng.gen_range(-1.0..=1.0);
        let ad_category_clicked = pick(rng, AdCategory::ALL);

        let signals = LabelSignals {
            rage_clicks,
            doomscroll_length,
            keyword_sentiment_score,
            ad_click_emotion,
        };
        let predicted_trait_label = assign_label(&signals, rng);

        EngagementRecord {
            user_id: EngagementRecord::user_id_for(index),
            session_time,
            rage_clicks,
            doomscroll_length,
            ad_click_emotion,
            feed_bias_score,
            notification_time,
            notif_response_time,
            keyword_sentiment_score,
            ad_category_clicked,
            predicted_trait_label,
        }
    }

    /// Consume the generator, returning its random source
    pub fn into_rng(self) -> R {
        self.rng
    }
}

/// Notification hour in [8, 23), minute in [0, 60), seconds always zero
fn sample_notification_time<R: Rng>(rng: &mut R) -> NaiveTime {
    let hour: u32 = rng.gen_range(8..23);
    let minute: u32 = rng.gen_range(0..60);
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

fn pick<T: Copy, R: Rng>(rng: &mut R, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TraitLabel;
    use chrono::Timelike;
    use pretty_assertions::assert_eq;
    use rand::rngs::mock::StepRng;

    fn seeded(seed: u64) -> RecordGenerator {
        RecordGenerator::new(&GeneratorConfig::seeded(seed))
    }

    #[test]
    fn test_generates_exact_count_with_sequential_ids() {
        let records = seeded(1).generate(RecordCount::new(250));

        assert_eq!(records.len(), 250);
        for (index, record) in records.iter().enumerate() {
            assert_eq!(record.user_id, format!("user_{:05}", index));
        }
        assert_eq!(records.last().unwrap().user_id, "user_00249");
    }

    #[test]
    fn test_zero_count_yields_empty() {
        let records = seeded(1).generate(RecordCount::new(0));
        assert!(records.is_empty());
    }

    #[test]
    fn test_field_ranges() {
        let records = seeded(99).generate(RecordCount::new(5000));

        for r in &records {
            assert!((5..=120).contains(&r.session_time));
            assert!(r.rage_clicks < 15);
            assert!((0.0..60.0).contains(&r.doomscroll_length));
            assert!((0.0..=1.0).contains(&r.feed_bias_score));
            assert!((8..23).contains(&r.notification_time.hour()));
            assert!(r.notification_time.minute() < 60);
            assert_eq!(r.notification_time.second(), 0);
            if let Some(t) = r.notif_response_time {
                assert!((1.0..=60.0).contains(&t));
            }
            assert!((-1.0..=1.0).contains(&r.keyword_sentiment_score));
        }
    }

    #[test]
    fn test_distributions_over_large_sample() {
        let records = seeded(2024).generate(RecordCount::new(20_000));
        let n = records.len() as f64;

        // 0.7 from the zero branch plus 0.3 * 1/15 from drawing zero
        let zero_rage = records.iter().filter(|r| r.rage_clicks == 0).count() as f64 / n;
        assert!((zero_rage - 0.72).abs() < 0.02, "zero rage share {}", zero_rage);

        let zero_doom = records.iter().filter(|r| r.doomscroll_length == 0.0).count() as f64 / n;
        assert!((zero_doom - 0.5).abs() < 0.02, "zero doomscroll share {}", zero_doom);

        let responders = records.iter().filter(|r| r.notif_response_time.is_some()).count() as f64 / n;
        assert!((responders - 0.7).abs() < 0.02, "responder share {}", responders);

        for emotion in AdEmotion::ALL {
            let share = records.iter().filter(|r| r.ad_click_emotion == *emotion).count() as f64 / n;
            assert!((share - 1.0 / 6.0).abs() < 0.02, "{} share {}", emotion, share);
        }
    }

    #[test]
    fn test_labels_follow_rules() {
        let records = seeded(5).generate(RecordCount::new(5000));

        for r in &records {
            if r.rage_clicks > 5 || r.doomscroll_length > 30.0 {
                assert!(matches!(
                    r.predicted_trait_label,
                    TraitLabel::Anxious | TraitLabel::Impulsive
                ));
            } else if r.keyword_sentiment_score < -0.5 {
                assert_eq!(r.predicted_trait_label, TraitLabel::Skeptical);
            } else if r.ad_click_emotion == AdEmotion::Curiosity {
                assert_eq!(r.predicted_trait_label, TraitLabel::Curious);
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_records() {
        let a = seeded(42).generate(RecordCount::new(3));
        let b = seeded(42).generate(RecordCount::new(3));
        assert_eq!(a, b);

        let c = seeded(43).generate(RecordCount::new(3));
        assert_ne!(a, c);
    }

    #[test]
    fn test_zero_source_pins_minimum_record() {
        let mut generator = RecordGenerator::with_rng(StepRng::new(0, 0));
        let record = generator.generate_record(7);

        assert_eq!(
            record,
            EngagementRecord {
                user_id: "user_00007".to_string(),
                session_time: 5,
                rage_clicks: 0,
                doomscroll_length: 0.0,
                ad_click_emotion: AdEmotion::Anger,
                feed_bias_score: 0.0,
                notification_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                notif_response_time: Some(1.0),
                keyword_sentiment_score: -1.0,
                ad_category_clicked: AdCategory::Finance,
                predicted_trait_label: TraitLabel::Skeptical,
            }
        );
    }

    #[test]
    fn test_record_count_parsing() {
        assert_eq!("10".parse::<RecordCount>().unwrap().get(), 10);
        assert_eq!(" 0 ".parse::<RecordCount>().unwrap().get(), 0);
        assert_eq!("3.0".parse::<RecordCount>().unwrap().get(), 3);

        for bad in ["-1", "2.5", "abc", "", "NaN", "-0.5"] {
            let err = bad.parse::<RecordCount>().unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidArgument(_)),
                "expected InvalidArgument for '{}'",
                bad
            );
        }
    }

    #[test]
    fn test_record_count_from_i64() {
        assert!(RecordCount::try_from(-5i64).is_err());
        assert_eq!(RecordCount::try_from(5i64).unwrap().get(), 5);
    }

    #[test]
    fn test_record_count_bound_is_shared() {
        assert_eq!("4294967295".parse::<RecordCount>().unwrap().get(), 4294967295);
        assert_eq!("4294967295.0".parse::<RecordCount>().unwrap().get(), 4294967295);

        for too_big in ["4294967296", "4294967296.0", "1e12"] {
            assert!(too_big.parse::<RecordCount>().is_err(), "{}", too_big);
        }
        assert!(RecordCount::try_from(4294967296i64).is_err());
        assert!(RecordCount::try_from(4294967296.0f64).is_err());
    }

    #[test]
    fn test_record_count_serde() {
        let count: RecordCount = serde_json::from_str("12").unwrap();
        assert_eq!(count.get(), 12);
        assert!(serde_json::from_str::<RecordCount>("-3").is_err());
        assert!(serde_json::from_str::<RecordCount>("1.5").is_err());
        assert_eq!(serde_json::to_string(&count).unwrap(), "12");
    }
}
