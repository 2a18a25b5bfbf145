use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use xthreads_core::{title_case, GeneratedPost, PlatformPosts};

pub const FAILED_CONTENT: &str = "Failed to generate";

/// One line of the exported calendar. Field names are the column headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Platform")]
    pub platform: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Content Type")]
    pub content_type: String,
    #[serde(rename = "Topic")]
    pub topic: String,
    #[serde(rename = "Content")]
    pub content: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Target Keywords")]
    pub target_keywords: String,
    #[serde(rename = "Call to Action")]
    pub call_to_action: String,
    #[serde(rename = "Max Characters")]
    pub max_characters: usize,
    #[serde(rename = "Character Count")]
    pub character_count: usize,
    #[serde(rename = "Generated At")]
    pub generated_at: String,
    #[serde(rename = "Attempts")]
    pub attempts: u32,
}

pub const HEADERS: [&str; 13] = [
    "Date",
    "Platform",
    "Time",
    "Content Type",
    "Topic",
    "Content",
    "Status",
    "Target Keywords",
    "Call to Action",
    "Max Characters",
    "Character Count",
    "Generated At",
    "Attempts",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => write!(f, "{}", text),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

impl CalendarRow {
    pub fn from_post(post: &GeneratedPost, date: NaiveDate) -> Self {
        let plan = &post.plan;
        let (content, status) = match (&post.text, post.is_success()) {
            (Some(text), true) => (text.clone(), "Ready"),
            _ => (FAILED_CONTENT.to_string(), "Failed"),
        };

        Self {
            date: date.format("%Y-%m-%d").to_string(),
            platform: title_case(&plan.platform),
            time: plan.time_slot.to_string(),
            content_type: title_case(&plan.content_type),
            topic: plan.topic.clone(),
            content,
            status: status.to_string(),
            target_keywords: plan.target_keywords.join(", "),
            call_to_action: plan.call_to_action.clone(),
            max_characters: plan.char_budget,
            character_count: post.text.as_deref().map_or(0, |t| t.chars().count()),
            generated_at: post.generated_at.format("%H:%M:%S").to_string(),
            attempts: post.attempt_count,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "Ready"
    }

    /// Cells in `HEADERS` order.
    pub fn cells(&self) -> [Cell<'_>; 13] {
        [
            Cell::Text(&self.date),
            Cell::Text(&self.platform),
            Cell::Text(&self.time),
            Cell::Text(&self.content_type),
            Cell::Text(&self.topic),
            Cell::Text(&self.content),
            Cell::Text(&self.status),
            Cell::Text(&self.target_keywords),
            Cell::Text(&self.call_to_action),
            Cell::Number(self.max_characters as f64),
            Cell::Number(self.character_count as f64),
            Cell::Text(&self.generated_at),
            Cell::Number(f64::from(self.attempts)),
        ]
    }
}

/// Flattens generated posts into rows sorted by platform, then time.
pub fn build_rows(posts: &PlatformPosts<GeneratedPost>, date: NaiveDate) -> Vec<CalendarRow> {
    let mut rows: Vec<CalendarRow> = posts
        .values()
        .flatten()
        .map(|post| CalendarRow::from_post(post, date))
        .collect();
    rows.sort_by(|a, b| (&a.platform, &a.time).cmp(&(&b.platform, &b.time)));
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl SummaryRow {
    fn new(metric: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: value.into(),
        }
    }
}

pub fn summarize(rows: &[CalendarRow]) -> Vec<SummaryRow> {
    let total = rows.len();
    let ready = rows.iter().filter(|r| r.is_ready()).count();
    let rate = if total > 0 {
        format!("{:.1}%", ready as f64 / total as f64 * 100.0)
    } else {
        "0%".to_string()
    };

    let mut summary = vec![
        SummaryRow::new("Total Posts Planned", total.to_string()),
        SummaryRow::new("Successfully Generated", ready.to_string()),
        SummaryRow::new("Success Rate", rate),
    ];

    // Platform order follows the rows.
    let mut platforms: Vec<(&str, usize, usize)> = Vec::new();
    for row in rows {
        let ready = usize::from(row.is_ready());
        match platforms.iter_mut().find(|(name, _, _)| *name == row.platform) {
            Some((_, r, t)) => {
                *r += ready;
                *t += 1;
            }
            None => platforms.push((row.platform.as_str(), ready, 1)),
        }
    }
    summary.extend(platforms.into_iter().map(|(name, ready, total)| {
        SummaryRow::new(format!("{} Posts", name), format!("{}/{}", ready, total))
    }));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{generated, sample_posts};
    use pretty_assertions::assert_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_rows_are_sorted_and_filled() {
        let rows = build_rows(&sample_posts(), date());
        let order: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.platform.as_str(), r.time.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("Reddit", "12:00"), ("Reddit", "14:30"), ("Twitter", "09:00")]
        );

        let failed = &rows[1];
        assert_eq!(failed.content, FAILED_CONTENT);
        assert_eq!(failed.status, "Failed");
        assert_eq!(failed.character_count, 0);
        assert_eq!(failed.attempts, 3);

        let ready = &rows[0];
        assert_eq!(ready.date, "2026-10-19");
        assert_eq!(ready.content_type, "Discussion");
        assert_eq!(ready.target_keywords, "content creation, productivity");
        assert_eq!(ready.character_count, ready.content.chars().count());
        assert_eq!(ready.generated_at.len(), 8);
    }

    #[test]
    fn test_summary_counts_per_platform() {
        let rows = build_rows(&sample_posts(), date());
        let summary = summarize(&rows);
        let pairs: Vec<(&str, &str)> = summary
            .iter()
            .map(|s| (s.metric.as_str(), s.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Total Posts Planned", "3"),
                ("Successfully Generated", "2"),
                ("Success Rate", "66.7%"),
                ("Reddit Posts", "1/2"),
                ("Twitter Posts", "1/1"),
            ]
        );
    }

    #[test]
    fn test_reddit_half_success() {
        let mut posts = PlatformPosts::new();
        posts.insert(
            "reddit".to_string(),
            vec![
                generated("reddit", "discussion", (12, 0), true),
                generated("reddit", "experience", (14, 30), false),
            ],
        );
        let summary = summarize(&build_rows(&posts, date()));
        assert_eq!(summary[2].value, "50.0%");
        assert_eq!(summary[3], SummaryRow::new("Reddit Posts", "1/2"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[2].value, "0%");
    }
}
