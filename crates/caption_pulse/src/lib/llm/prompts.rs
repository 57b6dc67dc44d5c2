use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Natural-language instruction with a single `{text}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate(String);

impl PromptTemplate {
    pub const PLACEHOLDER: &'static str = "{text}";

    pub fn new(template: impl Into<String>) -> Result<Self, Error> {
        let template = template.into();

        let placeholders = PLACEHOLDER_RE
            .captures_iter(&template)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str())
            .collect::<Vec<_>>();

        match placeholders.as_slice() {
            ["text"] => Ok(Self(template)),
            [] => Err(Error::Config(format!(
                "prompt template must contain the {} placeholder",
                Self::PLACEHOLDER
            ))),
            other => Err(Error::Config(format!(
                "prompt template must contain exactly one {} placeholder, found {other:?}",
                Self::PLACEHOLDER
            ))),
        }
    }

    pub fn render(&self, text: &str) -> String {
        self.0.replacen(Self::PLACEHOLDER, text, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Templates for each summarization stage.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// Per-chunk instruction of the map stage.
    pub map: PromptTemplate,
    /// Combines partial summaries; also used for collapse rounds.
    pub reduce: PromptTemplate,
    /// Single-prompt strategy.
    pub stuff: PromptTemplate,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            map: PromptTemplate(include_str!("./prompts/map.txt").into()),
            reduce: PromptTemplate(include_str!("./prompts/reduce.txt").into()),
            stuff: PromptTemplate(include_str!("./prompts/stuff.txt").into()),
        }
    }
}
