use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Posts grouped by platform name. `BTreeMap` keeps every stage's output in a
/// stable platform order.
pub type PlatformPosts<T> = BTreeMap<String, Vec<T>>;

/// Engagement counters as reported by a source. Counters a platform does not
/// have stay at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Engagement {
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub score: i64,
    pub comments: u64,
}

/// How a platform's counters collapse into a single engagement score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementFormula {
    /// likes + retweets + replies
    #[default]
    Interactions,
    /// the platform's own score (reddit upvotes)
    Score,
}

impl EngagementFormula {
    pub fn score(self, engagement: &Engagement) -> i64 {
        match self {
            EngagementFormula::Interactions => {
                let total = engagement
                    .likes
                    .saturating_add(engagement.retweets)
                    .saturating_add(engagement.replies);
                i64::try_from(total).unwrap_or(i64::MAX)
            }
            EngagementFormula::Score => engagement.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub platform: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub author: String,
    #[serde(default)]
    pub engagement: Engagement,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Search term or subreddit the post was found through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RawPost {
    /// Title and body as one string, the text the safety filter sees.
    pub fn full_text(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => format!("{} {}", title, self.text),
            _ => self.text.clone(),
        }
    }
}

/// A wall-clock posting time, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// 23:59, the latest slot a day can hold.
    pub fn latest() -> Self {
        Self(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default())
    }

    /// Adds minutes without wrapping past midnight; the result saturates at
    /// 23:59 so it never sorts before `self`.
    pub fn saturating_add_minutes(self, minutes: i64) -> Self {
        let (shifted, wrapped) = self
            .0
            .overflowing_add_signed(chrono::Duration::minutes(minutes));
        let latest = Self::latest();
        if wrapped != 0 || shifted > latest.0 {
            latest.max(self)
        } else {
            Self(shifted)
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for TimeSlot {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M").map(Self)
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid time slot '{raw}': {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPlan {
    pub id: Uuid,
    pub platform: String,
    pub content_type: String,
    pub topic: String,
    pub time_slot: TimeSlot,
    pub target_keywords: Vec<String>,
    pub content_angle: String,
    pub char_budget: usize,
    pub call_to_action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPost {
    #[serde(flatten)]
    pub plan: PostPlan,
    pub text: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub attempt_count: u32,
    pub status: GenerationStatus,
}

impl GeneratedPost {
    pub fn is_success(&self) -> bool {
        self.status == GenerationStatus::Success
    }
}

/// Capitalizes the first letter of every alphabetic run and lowercases the
/// rest: `short_video` becomes `Short_Video`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
