//! Minimal XML element tree with compact rendering.

use std::fmt::Write;

/// Escape character data
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value (double-quoted)
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML-escape text the way ArcGIS rich-text fields expect, quotes included
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Leaf element holding `text`
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).text(text)
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Compact rendering, no whitespace between elements
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", key, escape_attr(value));
        }

        if self.text.is_none() && self.children.is_empty() {
            out.push_str(" />");
            return;
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_text(text));
        }
        for child in &self.children {
            child.render_into(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested() {
        let root = Element::new("metadata")
            .attr("xml:lang", "en")
            .child(Element::leaf("title", "Buffer & Clip"))
            .child(Element::new("toolsets"));
        assert_eq!(
            root.render(),
            r#"<metadata xml:lang="en"><title>Buffer &amp; Clip</title><toolsets /></metadata>"#
        );
    }

    #[test]
    fn test_attr_escaping() {
        let e = Element::new("param").attr("name", "a\"b<c");
        assert_eq!(e.render(), r#"<param name="a&quot;b&lt;c" />"#);
    }

    #[test]
    fn test_empty_text_is_not_self_closing() {
        assert_eq!(Element::leaf("x", "").render(), "<x></x>");
    }

    #[test]
    fn test_escape_html_quotes() {
        assert_eq!(escape_html("it's \"ok\""), "it&#x27;s &quot;ok&quot;");
    }
}
