pub mod caption_source;
pub mod page_loader;
pub mod summarizer;
