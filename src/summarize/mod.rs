//! # Text summarization.
//!
//! [`Summarize`] is the seam between the sources and a language model. The only
//! required method is [`Summarize::generate`]; the news and filing prompts are provided
//! on top of it. [`OllamaClient`] implements it against a local Ollama server.
//!
//! Summaries are optional everywhere: a source that gets an error back keeps its
//! extractive summary and logs at `debug`.

mod ollama;

pub use ollama::{OllamaClient, SummarizerConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by a summarizer.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SummarizeError {
    /// The request could not be sent or the server answered with an error status.
    #[error("summarizer request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered without any text.
    #[error("summarizer returned an empty response")]
    Empty,
}

/// A language model that turns a prompt into text.
#[async_trait]
pub trait Summarize: Send + Sync + 'static {
    /// Runs `prompt` through the model and returns its answer.
    async fn generate(&self, prompt: &str) -> Result<String, SummarizeError>;

    /// One or two sentence summary of a news snippet.
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        self.generate(&news_prompt(text)).await
    }

    /// Bullet summary of a 10-K/10-Q excerpt.
    async fn summarize_filing(&self, excerpt: &str) -> Result<String, SummarizeError> {
        self.generate(&filing_prompt(excerpt)).await
    }
}

pub(crate) fn news_prompt(text: &str) -> String {
    format!(
        "You are a financial news assistant. Summarize the following article snippet in 1-2 \
         concise sentences, focusing on facts and company impact. Avoid hype and hedging.\n\n{}",
        text.trim()
    )
}

pub(crate) fn filing_prompt(excerpt: &str) -> String {
    format!(
        "Summarize the key points of this SEC filing excerpt (10-K/10-Q) in 3-5 concise bullets, \
         focusing on business overview, major risks, and financial highlights.\n\n{excerpt}"
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Echoes a fixed answer and remembers every prompt; `None` makes every call fail.
    pub(crate) struct Canned {
        pub answer: Option<&'static str>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl Canned {
        pub(crate) fn new(answer: Option<&'static str>) -> Self {
            Self {
                answer,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Summarize for Canned {
        async fn generate(&self, prompt: &str) -> Result<String, SummarizeError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.map(str::to_string).ok_or(SummarizeError::Empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Canned;
    use super::*;

    #[tokio::test]
    async fn provided_methods_wrap_the_prompt() {
        let model = Canned::new(Some("short"));
        assert_eq!(model.summarize("  Apple beats estimates.  ").await.unwrap(), "short");
        model.summarize_filing("ITEM 1. BUSINESS").await.unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("You are a financial news assistant."));
        assert!(prompts[0].ends_with("\n\nApple beats estimates."));
        assert!(prompts[1].contains("3-5 concise bullets"));
        assert!(prompts[1].ends_with("ITEM 1. BUSINESS"));
    }
}
