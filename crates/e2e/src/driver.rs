//! Browser capabilities the page object relies on

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// How an element is found on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    /// CSS selector, first match wins
    Css(String),
    /// Element whose whole text equals this
    Text(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::Text(text.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "css={}", selector),
            Locator::Text(text) => write!(f, "text=\"{}\"", text),
        }
    }
}

/// Element-level operations on a single open page.
///
/// Implementations act immediately and never wait for an element to appear;
/// waiting is the page object's job.
#[async_trait]
pub trait FormDriver: Send {
    /// Load `url` in the page
    async fn goto(&mut self, url: &str) -> E2eResult<()>;

    async fn click(&mut self, locator: &Locator) -> E2eResult<()>;

    /// Replace the value of an input
    async fn fill(&mut self, locator: &Locator, value: &str) -> E2eResult<()>;

    /// Rendered text of the element, or `None` when it is missing or hidden
    async fn visible_text(&mut self, locator: &Locator) -> E2eResult<Option<String>>;

    async fn screenshot(&mut self, path: &Path) -> E2eResult<()>;
}

/// Collapse whitespace runs to a single space and trim the ends
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
