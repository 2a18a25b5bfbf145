use crate::prompts::PromptBuilder;
use crate::provider::{GenerationRequest, TextGenerator};
use crate::quality::QualityGate;
use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};
use xthreads_core::{
    ErrorExt, GeneratedPost, GenerationConfig, GenerationStatus, PlatformPosts, PostPlan,
};

/// Drives a `TextGenerator` through the prompt builder and quality gate,
/// retrying a fixed number of times.
pub struct Generator {
    provider: Box<dyn TextGenerator>,
    prompts: PromptBuilder,
    gate: QualityGate,
    max_retries: u32,
    retry_delay: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl Generator {
    pub fn new(provider: Box<dyn TextGenerator>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            prompts: PromptBuilder::new(config.system_prompt.clone()),
            gate: QualityGate::new(config.min_chars),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub async fn generate(&self, plan: &PostPlan) -> GeneratedPost {
        let request = GenerationRequest {
            system_prompt: self.prompts.system_prompt().to_string(),
            user_prompt: self.prompts.user_prompt(plan),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let max_attempts = self.max_attempts();

        for attempt in 1..=max_attempts {
            match self.provider.generate(&request).await {
                Ok(text) => match self.gate.check(&text, plan) {
                    Ok(()) => {
                        info!(
                            "Generated {} {} post on attempt {}",
                            plan.platform, plan.content_type, attempt
                        );
                        return GeneratedPost {
                            plan: plan.clone(),
                            text: Some(text),
                            generated_at: Utc::now(),
                            attempt_count: attempt,
                            status: GenerationStatus::Success,
                        };
                    }
                    Err(rejection) => {
                        warn!("Low quality content on attempt {}: {}", attempt, rejection);
                    }
                },
                Err(e) => {
                    warn!("Generation failed on attempt {}", attempt);
                    e.log_warn();
                }
            }

            if attempt < max_attempts && !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        warn!(
            "Giving up on {} {} post after {} attempts",
            plan.platform, plan.content_type, max_attempts
        );
        GeneratedPost {
            plan: plan.clone(),
            text: None,
            generated_at: Utc::now(),
            attempt_count: max_attempts,
            status: GenerationStatus::Failed,
        }
    }

    /// Generates every plan in order, keeping the platform grouping.
    pub async fn generate_all(
        &self,
        plans: &PlatformPosts<PostPlan>,
    ) -> PlatformPosts<GeneratedPost> {
        info!("Generating content...");
        let mut generated = PlatformPosts::new();
        for (platform, platform_plans) in plans {
            let mut posts = Vec::with_capacity(platform_plans.len());
            for plan in platform_plans {
                posts.push(self.generate(plan).await);
            }
            generated.insert(platform.clone(), posts);
        }
        generated
    }
}
