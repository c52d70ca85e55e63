use serde::{Deserialize, Serialize};

/// A page returned by a [`PageFetcher`](crate::PageFetcher) navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub content: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, status: u16, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            content_type: None,
            content: content.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false)
    }
}
