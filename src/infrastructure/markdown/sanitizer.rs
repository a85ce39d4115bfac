//! Allow-list HTML sanitizer
//!
//! Re-serializes a parsed fragment keeping only known-safe tags and attributes.
//! Disallowed elements are unwrapped (their text survives); elements that can
//! execute or embed code are dropped together with their content.

use scraper::{ElementRef, Html, Node};

const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "code", "dd", "del", "div", "dl", "dt", "em", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "kbd", "li", "ol", "p", "pre", "s",
    "span", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u",
    "ul",
];

const DROPPED_WITH_CONTENT: &[&str] = &[
    "embed", "frame", "frameset", "iframe", "math", "noscript", "object", "script", "select",
    "style", "svg", "template", "textarea", "title",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Sanitize an HTML fragment
pub fn sanitize_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());

    write_fragment(fragment.root_element(), &mut out);

    out
}

enum Step<'a> {
    Enter(ElementRef<'a>),
    Text(&'a str),
    Close(&'a str),
}

/// Walks the tree with an explicit stack; nesting depth is attacker-controlled
fn write_fragment<'a>(root: ElementRef<'a>, out: &mut String) {
    let mut stack = Vec::new();
    push_children(root, &mut stack);

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => escape_text(text, out),
            Step::Close(name) => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Step::Enter(element) => {
                let name = element.value().name();

                if DROPPED_WITH_CONTENT.contains(&name) {
                    continue;
                }

                if !ALLOWED_TAGS.contains(&name) {
                    push_children(element, &mut stack);
                    continue;
                }

                write_open_tag(element, name, out);

                if VOID_TAGS.contains(&name) {
                    continue;
                }

                stack.push(Step::Close(name));
                push_children(element, &mut stack);
            }
        }
    }
}

/// Pushed in reverse so they pop in document order
fn push_children<'a>(element: ElementRef<'a>, stack: &mut Vec<Step<'a>>) {
    let mut children: Vec<Step<'a>> = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(Step::Text(&**text)),
            Node::Element(_) => ElementRef::wrap(child).map(Step::Enter),
            // comments, doctypes and processing instructions
            _ => None,
        })
        .collect();

    children.reverse();
    stack.append(&mut children);
}

fn write_open_tag(element: ElementRef<'_>, name: &str, out: &mut String) {
    out.push('<');
    out.push_str(name);

    for (attr, value) in element.value().attrs() {
        if is_allowed_attribute(name, attr, value) {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            escape_attribute(value, out);
            out.push('"');
        }
    }

    out.push('>');
}

fn is_allowed_attribute(tag: &str, attr: &str, value: &str) -> bool {
    match (tag, attr) {
        ("a", "href") | ("img", "src") => is_safe_url(value),
        ("a", "title") | ("img", "alt") | ("img", "title") | ("abbr", "title") => true,
        ("code", "class") | ("pre", "class") => value
            .split_whitespace()
            .all(|class| class.starts_with("language-")),
        ("ol", "start") => !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()),
        ("th", "align") | ("td", "align") => {
            matches!(value, "left" | "right" | "center")
        }
        _ => false,
    }
}

/// Relative URLs and http(s)/mailto pass; every other scheme is rejected
fn is_safe_url(value: &str) -> bool {
    // browsers ignore embedded whitespace and control characters in schemes
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match normalized.find([':', '/', '?', '#']) {
        Some(i) if normalized.as_bytes()[i] == b':' => SAFE_SCHEMES.contains(&&normalized[..i]),
        _ => true,
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
