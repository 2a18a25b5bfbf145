//! Post generation: the language model seam, prompt rendering, the quality
//! gate and the retrying generator built on them.

pub mod generator;
pub mod prompts;
pub mod provider;
pub mod quality;

pub use generator::Generator;
pub use prompts::{PromptBuilder, SYSTEM_PROMPT};
pub use provider::{GenerationRequest, OpenAiProvider, TextGenerator};
pub use quality::{QualityGate, Rejection};
