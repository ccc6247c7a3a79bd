//! Page-level input types.

use serde::{Deserialize, Serialize};

/// A single page of upstream extraction output.
///
/// Produced once by the external OCR/text-extraction layer and treated as
/// immutable by everything in this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage {
    /// Zero-based page index within the document
    pub index: usize,

    /// Raw extracted text (UTF-8, no layout guarantees)
    pub text: String,

    /// Optional reference to the page image the text came from
    pub image_ref: Option<String>,
}

impl RawPage {
    /// Create a page from extracted text.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            image_ref: None,
        }
    }

    /// Attach an image reference and return self.
    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    /// Check whether the page carries any extractable text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Lines of the page text.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_page() {
        assert!(RawPage::new(0, "   \n\t").is_blank());
        assert!(!RawPage::new(0, "Portfolio Statement").is_blank());
    }

    #[test]
    fn test_with_image_ref() {
        let page = RawPage::new(2, "text").with_image_ref("page-2.png");
        assert_eq!(page.image_ref.as_deref(), Some("page-2.png"));
    }
}
