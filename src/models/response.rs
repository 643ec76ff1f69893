// file: src/models/response.rs
// description: accumulator for streamed text fragments
// reference: internal data structures

/// Text of one streaming call, built up in receipt order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResponse {
    text: String,
    fragments: usize,
}

impl ExtractionResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment verbatim. Returns false (and changes nothing) when
    /// the fragment is missing or empty.
    pub fn push(&mut self, fragment: Option<&str>) -> bool {
        match fragment {
            Some(text) if !text.is_empty() => {
                self.text.push_str(text);
                self.fragments += 1;
                true
            }
            _ => false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order_and_whitespace() {
        let mut response = ExtractionResponse::new();
        assert!(response.push(Some("  Hello")));
        assert!(response.push(Some("\n")));
        assert!(response.push(Some("Hello")));

        assert_eq!(response.text(), "  Hello\nHello");
        assert_eq!(response.fragment_count(), 3);
    }

    #[test]
    fn test_empty_and_missing_fragments_are_skipped() {
        let mut response = ExtractionResponse::new();
        assert!(!response.push(None));
        assert!(!response.push(Some("")));

        assert!(response.is_empty());
        assert_eq!(response.fragment_count(), 0);
    }
}
