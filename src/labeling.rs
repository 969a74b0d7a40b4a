//! Trait label assignment
//!
//! Labels are assigned by a priority-ordered rule table. Rules are evaluated
//! top to bottom and the first matching rule decides the outcome; when no rule
//! matches, the label is drawn uniformly from every trait.
//!
//! Because the fallback can also produce anxious, impulsive, skeptical and
//! curious, the overall label distribution is not uniform.

use rand::Rng;

use crate::types::{AdEmotion, EngagementRecord, TraitLabel};

/// Rage clicks above this count signal high negative engagement
pub const RAGE_CLICK_THRESHOLD: u32 = 5;

/// Doomscrolling above this many minutes signals high negative engagement
pub const DOOMSCROLL_THRESHOLD_MIN: f64 = 30.0;

/// Sentiment below this score signals skepticism
pub const NEGATIVE_SENTIMENT_THRESHOLD: f64 = -0.5;

/// The subset of record fields the labeling rules look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSignals {
    pub rage_clicks: u32,
    pub doomscroll_length: f64,
    pub keyword_sentiment_score: f64,
    pub ad_click_emotion: AdEmotion,
}

impl From<&EngagementRecord> for LabelSignals {
    fn from(record: &EngagementRecord) -> Self {
        Self {
            rage_clicks: record.rage_clicks,
            doomscroll_length: record.doomscroll_length,
            keyword_sentiment_score: record.keyword_sentiment_score,
            ad_click_emotion: record.ad_click_emotion,
        }
    }
}

/// What a rule yields once it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOutcome {
    Fixed(TraitLabel),
    /// Uniform choice among the listed labels
    OneOf(&'static [TraitLabel]),
}

impl LabelOutcome {
    /// Resolve the outcome to a concrete label, drawing from `rng` if needed
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> TraitLabel {
        match self {
            LabelOutcome::Fixed(label) => *label,
            LabelOutcome::OneOf(labels) => labels[rng.gen_range(0..labels.len())],
        }
    }

    /// Labels this outcome can produce
    pub fn candidates(&self) -> &[TraitLabel] {
        match self {
            LabelOutcome::Fixed(label) => std::slice::from_ref(label),
            LabelOutcome::OneOf(labels) => labels,
        }
    }
}

/// One (predicate, outcome) pair in the rule table
#[derive(Debug, Clone, Copy)]
pub struct LabelRule {
    pub name: &'static str,
    /// Human-readable condition, used in profile explanations
    pub condition: &'static str,
    pub applies: fn(&LabelSignals) -> bool,
    pub outcome: LabelOutcome,
}

const ANXIOUS_OR_IMPULSIVE: &[TraitLabel] = &[TraitLabel::Anxious, TraitLabel::Impulsive];

/// Ordered rule table, first match wins
pub static LABEL_RULES: [LabelRule; 3] = [
    LabelRule {
        name: "high_negative_engagement",
        condition: "rage_clicks > 5 or doomscroll_length > 30",
        applies: high_negative_engagement,
        outcome: LabelOutcome::OneOf(ANXIOUS_OR_IMPULSIVE),
    },
    LabelRule {
        name: "negative_sentiment",
        condition: "keyword_sentiment_score < -0.5",
        applies: negative_sentiment,
        outcome: LabelOutcome::Fixed(TraitLabel::Skeptical),
    },
    LabelRule {
        name: "curiosity_ad",
        condition: "ad_click_emotion == curiosity",
        applies: curiosity_ad,
        outcome: LabelOutcome::Fixed(TraitLabel::Curious),
    },
];

/// Outcome used when no rule matches
pub const FALLBACK_OUTCOME: LabelOutcome = LabelOutcome::OneOf(TraitLabel::ALL);

fn high_negative_engagement(signals: &LabelSignals) -> bool {
    signals.rage_clicks > RAGE_CLICK_THRESHOLD || signals.doomscroll_length > DOOMSCROLL_THRESHOLD_MIN
}

fn negative_sentiment(signals: &LabelSignals) -> bool {
    signals.keyword_sentiment_score < NEGATIVE_SENTIMENT_THRESHOLD
}

fn curiosity_ad(signals: &LabelSignals) -> bool {
    signals.ad_click_emotion == AdEmotion::Curiosity
}

/// First rule that matches `signals`, or `None` when the fallback applies
pub fn matching_rule(signals: &LabelSignals) -> Option<&'static LabelRule> {
    LABEL_RULES.iter().find(|rule| (rule.applies)(signals))
}

/// Assign a trait label to `signals`
pub fn assign_label<R: Rng>(signals: &LabelSignals, rng: &mut R) -> TraitLabel {
    match matching_rule(signals) {
        Some(rule) => rule.outcome.resolve(rng),
        None => FALLBACK_OUTCOME.resolve(rng),
    }
}
