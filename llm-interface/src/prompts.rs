use xthreads_core::PostPlan;

/// Product voice used when the configuration does not supply its own.
pub const SYSTEM_PROMPT: &str = "You are generating content for xthreads.app, an AI-powered tool that helps people write better posts on X and Threads.

Your audience: developers, founders, indie hackers, and content creators who want to write engaging, high-performing posts with less overthinking.

Key messaging:
- Help solve common content creation struggles (writer's block, low engagement, content anxiety)
- Highlight simple wins (scroll-stopping content, faster writing, growing online presence)
- Be punchy, helpful, and human
- Add soft CTAs when appropriate: \"Built with xthreads.app\" or \"Try it free\"

Voice & Tone:
- Conversational and authentic
- Helpful without being preachy
- Confident but not arrogant
- Use emojis sparingly and naturally
- Avoid excessive hashtags

Do NOT sound like a sales pitch. Focus on providing value first, product mentions second.";

pub fn platform_guidelines(platform: &str) -> Option<&'static str> {
    match platform {
        "twitter" => Some("Write for Twitter/X. Keep it concise, engaging, and shareable. Use line breaks for readability."),
        "threads" => Some("Write for Threads. Can be slightly longer than Twitter. Focus on storytelling and community engagement."),
        "reddit" => Some("Write for Reddit. Be authentic, helpful, and community-focused. Avoid obvious self-promotion."),
        "linkedin" => Some("Write for LinkedIn. Professional tone but still engaging. Focus on insights and value."),
        _ => None,
    }
}

pub fn content_type_instructions(content_type: &str) -> Option<&'static str> {
    let instructions = match content_type {
        "hook" => "Create a compelling hook that stops scrolling. Start strong and make people want to read more.",
        "thread" => "Create the first post of a thread. Tease the value and indicate it's a thread (🧵 or 1/X).",
        "text" => "Create engaging text content that provides value and encourages interaction.",
        "image" => "Write compelling text to accompany an image post. Focus on the caption.",
        "reply" => "Write a thoughtful reply or comment that adds value to conversations.",
        "meme" => "Create text for a meme-style post that's relatable and shareable.",
        "carousel" => "Write the first slide of a carousel post with clear value proposition.",
        "video" => "Write a script or caption for video content.",
        "reels" => "Create engaging text for Instagram Reels format.",
        "short_video" => "Write a brief, punchy script for short-form video content.",
        "post_image" => "Create text to accompany an image post on Facebook.",
        "link" => "Write compelling text to share a link with context and value.",
        "answer" => "Write a comprehensive answer to a question on Quora.",
        "comment" => "Create a valuable comment that starts discussions.",
        "tip" => "Share a specific, actionable tip that people can implement immediately.",
        "discussion" => "Start a discussion by sharing an insight and asking for community input.",
        "experience" => "Share a personal experience or story with lessons learned.",
        "professional" => "Create professional content suitable for LinkedIn audience.",
        _ => return None,
    };
    Some(instructions)
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PromptBuilder {
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            system_prompt: system_prompt.unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_prompt(&self, plan: &PostPlan) -> String {
        let budget = plan.char_budget;
        format!(
            "Platform: {platform}\n\
             {guidelines}\n\
             \n\
             Content Type: {content_type}\n\
             {instructions}\n\
             \n\
             Topic: {topic}\n\
             Content Angle: {angle}\n\
             Target Keywords: {keywords}\n\
             Character Limit: {budget}\n\
             Call to Action: {cta}\n\
             \n\
             Requirements:\n\
             1. Stay within {budget} characters\n\
             2. Include relevant keywords naturally\n\
             3. Make it engaging and valuable\n\
             4. Match the content angle specified\n\
             5. Include the CTA if it fits naturally\n\
             6. Focus on helping the audience with their content creation challenges\n\
             \n\
             Generate the post content now:",
            platform = plan.platform,
            guidelines = platform_guidelines(&plan.platform).unwrap_or(""),
            content_type = plan.content_type,
            instructions = content_type_instructions(&plan.content_type).unwrap_or(""),
            topic = plan.topic,
            angle = plan.content_angle,
            keywords = plan.target_keywords.join(", "),
            budget = budget,
            cta = plan.call_to_action,
        )
    }
}
