use std::{fmt::Display, future::Future};

use serde::Deserialize;

/// One completion against a language model.
pub trait Summarizer {
    type Error: Display;

    fn model_name(&self) -> &str;

    fn summarize(
        &self,
        content: impl Into<String>,
    ) -> impl Future<Output = Result<SummaryResponse, Self::Error>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}
