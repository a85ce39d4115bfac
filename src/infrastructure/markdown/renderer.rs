//! Markdown to sanitized HTML

use pulldown_cmark::{html, Options, Parser};

use super::sanitizer::sanitize_html;
use crate::domain::post::MarkdownRenderer;

/// CommonMark + tables + strikethrough, followed by the allow-list sanitizer
#[derive(Debug, Clone, Default)]
pub struct MarkdownHtmlRenderer;

impl MarkdownHtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options
    }
}

impl MarkdownRenderer for MarkdownHtmlRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Self::options());
        let mut raw = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut raw, parser);

        sanitize_html(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        MarkdownHtmlRenderer::new().render(markdown)
    }

    #[test]
    fn test_heading_becomes_heading_tag() {
        assert!(render("# Title").contains("<h1>Title</h1>"));
        assert!(render("### Sub").contains("<h3>Sub</h3>"));
    }

    #[test]
    fn test_structure_is_preserved() {
        let out = render(
            "Some *emphasis* and **strong**.\n\n- one\n- two\n\n1. first\n\n[link](https://example.com)\n\n```rust\nlet x = 1;\n```\n",
        );

        assert!(out.contains("<em>emphasis</em>"));
        assert!(out.contains("<strong>strong</strong>"));
        assert!(out.contains("<ul>"));
        assert!(out.contains("<li>one</li>"));
        assert!(out.contains("<ol>"));
        assert!(out.contains(r#"<a href="https://example.com">link</a>"#));
        assert!(out.contains(r#"<code class="language-rust">"#));
        assert!(out.contains("<pre>"));
    }

    #[test]
    fn test_inline_script_is_removed() {
        let out = render("hello\n\n<script>alert('x')</script>\n\nworld");
        assert!(!out.contains("<script"));
        assert!(!out.contains("alert"));
        assert!(out.contains("hello"));
        assert!(out.contains("world"));
    }

    #[test]
    fn test_onerror_attribute_is_removed() {
        let out = render(r#"<img src="x" onerror="alert(1)">"#);
        assert!(!out.contains("onerror"));
    }

    #[test]
    fn test_javascript_link_is_neutralized() {
        let out = render("[click](javascript:alert(1))");
        assert!(!out.contains("javascript:"));
        assert!(out.contains("click"));
    }

    #[test]
    fn test_script_inside_code_is_shown_not_run() {
        let out = render("`<script>`");
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_unsafe_inputs_never_leak() {
        let inputs = [
            "<script>alert(1)</script>",
            "<SCRIPT SRC=//evil.example/x.js></SCRIPT>",
            "<p onclick=\"steal()\">hi</p>",
            "<img src=x onerror=alert(1)//>",
            "<svg><script>alert(1)</script></svg>",
            "<iframe src=\"https://evil.example\"></iframe>",
            "text <a href=\"javascript:void(0)\" onmouseover=\"x()\">y</a>",
        ];

        for input in inputs {
            let out = render(input).to_ascii_lowercase();
            assert!(!out.contains("<script"), "script leaked for {input}");
            assert!(!out.contains("onerror"), "onerror leaked for {input}");
            assert!(!out.contains("onclick"), "onclick leaked for {input}");
            assert!(!out.contains("onmouseover"), "onmouseover leaked for {input}");
            assert!(!out.contains("javascript:"), "javascript url leaked for {input}");
            assert!(!out.contains("<iframe"), "iframe leaked for {input}");
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let md = "# A\n\nb *c*";
        assert_eq!(render(md), render(md));
    }
}
