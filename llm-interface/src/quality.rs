use std::fmt;
use xthreads_core::PostPlan;

const PLACEHOLDER_MARKERS: &[&str] = &[
    "[insert",
    "[add",
    "[your",
    "lorem ipsum",
    "placeholder",
    "example text",
    "sample content",
];

const ENGAGEMENT_INDICATORS: &[&str] = &[
    "?", "!", "you", "your", "we", "us", "how", "why", "what", "tip", "learn", "discover", "secret",
    "mistake", "avoid",
];

const RELEVANCE_INDICATORS: &[&str] = &[
    "content",
    "post",
    "write",
    "writing",
    "create",
    "social",
    "twitter",
    "thread",
    "engagement",
    "audience",
    "growth",
];

/// Why generated text was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    TooLong { chars: usize, budget: usize },
    TooShort { chars: usize, minimum: usize },
    Placeholder(&'static str),
    NoEngagementHook,
    OffTopic,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty => write!(f, "empty text"),
            Rejection::TooLong { chars, budget } => {
                write!(f, "{} chars exceeds budget of {}", chars, budget)
            }
            Rejection::TooShort { chars, minimum } => {
                write!(f, "{} chars is below minimum of {}", chars, minimum)
            }
            Rejection::Placeholder(marker) => write!(f, "contains placeholder {:?}", marker),
            Rejection::NoEngagementHook => write!(f, "no engagement indicator"),
            Rejection::OffTopic => write!(f, "no content-creation relevance"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QualityGate {
    min_chars: usize,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self { min_chars: 50 }
    }
}

impl QualityGate {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    pub fn passes(&self, text: &str, plan: &PostPlan) -> bool {
        self.check(text, plan).is_ok()
    }

    /// Length is counted in chars, indicators match as lowercase substrings.
    pub fn check(&self, text: &str, plan: &PostPlan) -> Result<(), Rejection> {
        if text.is_empty() {
            return Err(Rejection::Empty);
        }

        let chars = text.chars().count();
        if chars > plan.char_budget {
            return Err(Rejection::TooLong {
                chars,
                budget: plan.char_budget,
            });
        }
        if chars < self.min_chars {
            return Err(Rejection::TooShort {
                chars,
                minimum: self.min_chars,
            });
        }

        let lower = text.to_lowercase();
        if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(*m)) {
            return Err(Rejection::Placeholder(*marker));
        }
        if !ENGAGEMENT_INDICATORS.iter().any(|i| lower.contains(i)) {
            return Err(Rejection::NoEngagementHook);
        }
        if !RELEVANCE_INDICATORS.iter().any(|i| lower.contains(i)) {
            return Err(Rejection::OffTopic);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;
    use xthreads_core::TimeSlot;

    fn plan(budget: usize) -> PostPlan {
        PostPlan {
            id: Uuid::new_v4(),
            platform: "twitter".to_string(),
            content_type: "tip".to_string(),
            topic: "content consistency".to_string(),
            time_slot: TimeSlot::from_hm(9, 0).unwrap(),
            target_keywords: Vec::new(),
            content_angle: "Quick actionable advice".to_string(),
            char_budget: budget,
            call_to_action: String::new(),
        }
    }

    const GOOD: &str = "Struggling to post daily? Batch your writing on Sunday and schedule the week.";

    #[test]
    fn test_good_post_passes() {
        assert!(QualityGate::default().passes(GOOD, &plan(280)));
    }

    #[test]
    fn test_length_bounds() {
        let gate = QualityGate::default();
        assert_eq!(gate.check("", &plan(280)), Err(Rejection::Empty));
        assert!(matches!(
            gate.check(GOOD, &plan(40)),
            Err(Rejection::TooLong { budget: 40, .. })
        ));
        assert!(matches!(
            gate.check("How do you write posts?", &plan(280)),
            Err(Rejection::TooShort { minimum: 50, .. })
        ));
    }

    #[test]
    fn test_budget_counts_chars_not_bytes() {
        let text = format!("{} {}", GOOD, "🧵".repeat(10));
        let chars = text.chars().count();
        assert!(text.len() > chars);
        assert!(QualityGate::default().passes(&text, &plan(chars)));
    }

    #[test]
    fn test_placeholders_are_rejected() {
        let gate = QualityGate::default();
        let text = "Here is how you grow your audience: [Insert your best tip here] and repeat!";
        assert_eq!(
            gate.check(text, &plan(280)),
            Err(Rejection::Placeholder("[insert"))
        );
        let text = "Lorem ipsum content for your audience, what a great post this would be!";
        assert_eq!(
            gate.check(text, &plan(280)),
            Err(Rejection::Placeholder("lorem ipsum"))
        );
    }

    #[test]
    fn test_requires_engagement_and_relevance() {
        let gate = QualityGate::default();
        assert_eq!(
            gate.check(
                "Batching content on Sunday makes the entire month calmer and steadier.",
                &plan(280)
            ),
            Err(Rejection::NoEngagementHook)
        );
        assert_eq!(
            gate.check(
                "Why does the morning coffee taste better on a quiet Saturday at home?",
                &plan(280)
            ),
            Err(Rejection::OffTopic)
        );
    }
}
