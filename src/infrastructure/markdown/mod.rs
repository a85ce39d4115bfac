//! Markdown rendering and HTML sanitizing

mod renderer;
mod sanitizer;

pub use renderer::MarkdownHtmlRenderer;
pub use sanitizer::sanitize_html;
