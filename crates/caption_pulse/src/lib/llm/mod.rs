pub mod map_reduce;
pub mod openai;
pub mod prompts;
pub mod summarizer;
