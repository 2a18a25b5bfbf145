//! Turns the day's reflection into per-platform post plans.

use insight_engine::Reflection;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Builder;
use xthreads_core::{PlatformConfig, PlatformPosts, PostPlan, TimeSlot};

const PRODUCT_TOPICS: &[&str] = &[
    "content creation struggles",
    "twitter growth tips",
    "writing better posts",
    "social media productivity",
    "overcoming writer's block",
    "content consistency",
    "engagement strategies",
    "personal branding",
    "building audience",
    "content automation",
];

const TOPIC_WORDS: &[&str] = &[
    "content",
    "writing",
    "social",
    "twitter",
    "growth",
    "productivity",
    "automation",
];

const BASE_KEYWORDS: &[&str] = &["content creation", "productivity", "social media"];
const KEYWORD_WORDS: &[&str] = &["content", "writing", "social", "growth"];

const MAX_TRENDING_TOPICS: usize = 3;
const MAX_TRENDING_KEYWORDS: usize = 2;
const PRODUCT_CTA_PROBABILITY: f64 = 0.3;
const JITTER_MINUTES: std::ops::RangeInclusive<i64> = 15..=45;

const ENGAGEMENT_CTAS: &[&str] = &[
    "What's your experience with this?",
    "Drop your thoughts below 👇",
    "Anyone else struggle with this?",
    "What would you add to this list?",
    "Share if this helped you!",
];

const PRODUCT_CTAS: &[&str] = &[
    "Built with xthreads.app ⚡",
    "Try xthreads.app for faster content creation",
    "Link to xthreads.app in comments",
];

fn angles_for(content_type: &str) -> &'static [&'static str] {
    match content_type {
        "hook" => &[
            "Start with a surprising statistic",
            "Ask a thought-provoking question",
            "Share a contrarian opinion",
            "Use a personal story opener",
        ],
        "thread" => &[
            "Step-by-step tutorial",
            "Lessons learned breakdown",
            "Myth-busting series",
            "Behind-the-scenes process",
        ],
        "discussion" => &[
            "Ask for community input",
            "Share experience and ask for similar stories",
            "Debate a common belief",
            "Crowdsource solutions",
        ],
        "experience" => &[
            "Personal journey story",
            "Failure and lessons learned",
            "Success story with insights",
            "Day-in-the-life content",
        ],
        _ => &[
            "Quick actionable advice",
            "Tool recommendation",
            "Productivity hack",
            "Common mistake to avoid",
        ],
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, options: &'a [&'a str], fallback: &'a str) -> &'a str {
    options.choose(rng).copied().unwrap_or(fallback)
}

fn contains_any(term: &str, words: &[&str]) -> bool {
    let term = term.to_lowercase();
    words.iter().any(|w| term.contains(w))
}

pub struct ContentPlanner {
    platforms: BTreeMap<String, PlatformConfig>,
}

impl ContentPlanner {
    pub fn new(platforms: BTreeMap<String, PlatformConfig>) -> Self {
        Self { platforms }
    }

    /// Plans every enabled platform, in platform name order.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        reflection: &Reflection,
        rng: &mut R,
    ) -> PlatformPosts<PostPlan> {
        info!("Creating content plan...");
        let trending: Vec<&str> = reflection.trending_terms().collect();

        let plans: PlatformPosts<PostPlan> = self
            .platforms
            .iter()
            .filter(|(_, config)| config.enabled)
            .map(|(name, config)| (name.clone(), self.plan_platform(name, config, &trending, rng)))
            .collect();

        info!(
            "Planned {} posts across {} platforms",
            plans.values().map(Vec::len).sum::<usize>(),
            plans.len()
        );
        plans
    }

    pub fn plan_platform<R: Rng + ?Sized>(
        &self,
        platform: &str,
        config: &PlatformConfig,
        trending: &[&str],
        rng: &mut R,
    ) -> Vec<PostPlan> {
        let mut topics: Vec<String> = PRODUCT_TOPICS.iter().map(|t| t.to_string()).collect();
        topics.extend(
            trending
                .iter()
                .filter(|term| contains_any(term, TOPIC_WORDS))
                .take(MAX_TRENDING_TOPICS)
                .map(|term| format!("trending: {}", term)),
        );

        let mut target_keywords: Vec<String> = BASE_KEYWORDS.iter().map(|k| k.to_string()).collect();
        target_keywords.extend(
            trending
                .iter()
                .filter(|term| contains_any(term, KEYWORD_WORDS))
                .take(MAX_TRENDING_KEYWORDS)
                .map(|term| term.to_string()),
        );

        (0..config.posts_per_day)
            .map(|index| {
                let content_type = config
                    .content_types
                    .choose(rng)
                    .cloned()
                    .unwrap_or_else(|| "general".to_string());
                let topic = topics
                    .choose(rng)
                    .cloned()
                    .unwrap_or_else(|| PRODUCT_TOPICS[0].to_string());
                let time_slot = time_slot_for(&config.optimal_times, index, rng);
                let content_angle = pick(rng, angles_for(&content_type), "Quick actionable advice");
                let call_to_action = if rng.random_bool(PRODUCT_CTA_PROBABILITY) {
                    pick(rng, PRODUCT_CTAS, PRODUCT_CTAS[0])
                } else {
                    pick(rng, ENGAGEMENT_CTAS, ENGAGEMENT_CTAS[0])
                };

                let plan = PostPlan {
                    id: Builder::from_random_bytes(rng.random()).into_uuid(),
                    platform: platform.to_string(),
                    content_type,
                    topic,
                    time_slot,
                    target_keywords: target_keywords.clone(),
                    content_angle: content_angle.to_string(),
                    char_budget: config.max_chars,
                    call_to_action: call_to_action.to_string(),
                };
                debug!(
                    "Planned {} {} at {} on {:?}",
                    platform, plan.content_type, plan.time_slot, plan.topic
                );
                plan
            })
            .collect()
    }
}

/// The configured slot for `index`; past the end, the last slot plus 15-45
/// minutes, never wrapping past midnight.
pub fn time_slot_for<R: Rng + ?Sized>(slots: &[TimeSlot], index: usize, rng: &mut R) -> TimeSlot {
    match (slots.get(index), slots.last()) {
        (Some(slot), _) => *slot,
        (None, Some(last)) => last.saturating_add_minutes(rng.random_range(JITTER_MINUTES)),
        (None, None) => TimeSlot::from_hm(12, 0).unwrap_or_else(TimeSlot::latest),
    }
}
