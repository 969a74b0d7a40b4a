//! Core data types for ShadowPersona
//!
//! This module defines the engagement record produced by the generator, the
//! categorical vocabularies it draws from, and the derived record produced by
//! the feature deriver.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Raw record columns, in persisted order
pub const RAW_COLUMNS: [&str; 11] = [
    "user_id",
    "session_time",
    "rage_clicks",
    "doomscroll_length",
    "ad_click_emotion",
    "feed_bias_score",
    "notification_time",
    "notif_response_time",
    "keyword_sentiment_score",
    "ad_category_clicked",
    "predicted_trait_label",
];

/// Derived columns appended by the feature deriver, in persisted order
pub const DERIVED_COLUMNS: [&str; 3] = [
    "total_negative_engagement_score",
    "active_notif_responder",
    "feed_bias_category",
];

/// Format used for `notification_time`
pub const NOTIFICATION_TIME_FORMAT: &str = "%H:%M:%S";

/// Declares a closed string vocabulary with `ALL`, `as_str`, `Display` and `FromStr`.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every value, in canonical order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = PipelineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(PipelineError::InvalidArgument(format!(
                        "unknown {}: '{}'",
                        $kind, other
                    ))),
                }
            }
        }
    };
}

vocabulary! {
    /// Emotion attached to the ad a user clicked
    AdEmotion, "ad click emotion" {
        Anger => "anger",
        Curiosity => "curiosity",
        Joy => "joy",
        Sadness => "sadness",
        Surprise => "surprise",
        Neutral => "neutral",
    }
}

vocabulary! {
    /// Category of the ad a user clicked
    AdCategory, "ad category" {
        Finance => "finance",
        Travel => "travel",
        Fashion => "fashion",
        Tech => "tech",
        Food => "food",
        Gaming => "gaming",
        News => "news",
    }
}

vocabulary! {
    /// Rule-assigned psychological trait, standing in for a classifier output
    TraitLabel, "trait label" {
        Anxious => "anxious",
        Impulsive => "impulsive",
        Curious => "curious",
        Skeptical => "skeptical",
        Compliant => "compliant",
        Distracted => "distracted",
    }
}

vocabulary! {
    /// Bucket of `feed_bias_score`
    FeedBiasCategory, "feed bias category" {
        LeftLeaning => "left_leaning",
        Neutral => "neutral",
        RightLeaning => "right_leaning",
    }
}

/// One synthetic user's simulated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    /// `user_NNNNN`, zero-padded generation index
    pub user_id: String,
    /// Session length in minutes (5-120)
    pub session_time: u32,
    /// Number of rage clicks (0-14)
    pub rage_clicks: u32,
    /// Minutes spent doomscrolling (0-60)
    pub doomscroll_length: f64,
    pub ad_click_emotion: AdEmotion,
    /// Feed bias (0-1)
    pub feed_bias_score: f64,
    /// Time of day the notification was sent
    pub notification_time: NaiveTime,
    /// Seconds until the user responded, `None` when they never did
    pub notif_response_time: Option<f64>,
    /// Keyword sentiment (-1 to 1)
    pub keyword_sentiment_score: f64,
    pub ad_category_clicked: AdCategory,
    pub predicted_trait_label: TraitLabel,
}

impl EngagementRecord {
    /// Format a generation index as a user id
    pub fn user_id_for(index: usize) -> String {
        format!("user_{:05}", index)
    }

    /// Notification time as `HH:MM:SS`
    pub fn notification_time_str(&self) -> String {
        self.notification_time
            .format(NOTIFICATION_TIME_FORMAT)
            .to_string()
    }
}

/// Engagement record with derived features appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedEngagementRecord {
    /// The untouched raw record
    #[serde(flatten)]
    pub record: EngagementRecord,
    /// `0.5 * rage_clicks + 0.7 * doomscroll_length`
    pub total_negative_engagement_score: f64,
    /// 1 when a notification response time is present, else 0
    pub active_notif_responder: u8,
    /// `None` when the bias score falls outside [0, 1]
    pub feed_bias_category: Option<FeedBiasCategory>,
}

/// Value type and description of a persisted column
pub fn column_description(name: &str) -> Option<(&'static str, &'static str)> {
    let described = match name {
        "user_id" => ("string", "Zero-padded user identifier, user_00000 upward"),
        "session_time" => ("integer", "Session length in minutes, 5 to 120"),
        "rage_clicks" => ("integer", "Rapid repeated clicks, 0 to 14"),
        "doomscroll_length" => ("float", "Minutes of doomscrolling, 0 to 60"),
        "ad_click_emotion" => ("string", "Emotion of the clicked ad"),
        "feed_bias_score" => ("float", "Feed bias score, 0.0 to 1.0"),
        "notification_time" => ("time", "Notification time of day, HH:MM:SS"),
        "notif_response_time" => ("float", "Seconds to respond, 1 to 60, empty if no response"),
        "keyword_sentiment_score" => ("float", "Sentiment of engaged keywords, -1.0 to 1.0"),
        "ad_category_clicked" => ("string", "Category of the clicked ad"),
        "predicted_trait_label" => ("string", "Simulated psychological trait"),
        "total_negative_engagement_score" => ("float", "0.5 * rage_clicks + 0.7 * doomscroll_length"),
        "active_notif_responder" => ("integer", "1 if the user responded to the notification"),
        "feed_bias_category" => ("string", "left_leaning, neutral, right_leaning, or empty"),
        _ => return None,
    };
    Some(described)
}
