pub mod client;
pub mod gemini;
pub mod prompts;

pub use client::{parse_places, strip_code_fences, GenerationClient};
pub use gemini::GeminiBackend;
