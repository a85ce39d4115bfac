//! Markdown rendering seam

/// Turns author markdown into HTML that is safe to show to readers
///
/// Implementations must be deterministic and free of side effects.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}
