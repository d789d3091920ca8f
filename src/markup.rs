//! Template markup tree.
//!
//! Templates are stored in the Graphmaster as raw markup strings and parsed on
//! demand by the interpreter. Non-recursive tag handlers return markup that is
//! parsed again, so the parser here is deliberately small and strict: it
//! understands exactly the subset of XML that AIML templates use.
//!
//! ```text
//! "Hi <star index=\"1\"/>!"
//!     │ parse_fragment
//!     v
//! [Text("Hi "), Element(star {index=1}), Text("!")]
//!     │ inner_markup
//!     v
//! "Hi <star index=\"1\"/>!"
//! ```

use crate::error::{AimlError, Result};

/// One node of a parsed fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Element(Element),
}

/// A markup element with ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Content>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element { name: name.into(), attributes: Vec::new(), children: Vec::new() }
    }

    /// Parse `markup` and wrap the resulting nodes in an element called `name`.
    pub fn from_markup(name: impl Into<String>, markup: &str) -> Result<Self> {
        Ok(Element { name: name.into(), attributes: Vec::new(), children: parse_fragment(markup)? })
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Attribute lookup; names compare ASCII case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    /// Direct element children, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Content::Element(e) => Some(e),
            Content::Text(_) => None,
        })
    }

    /// Concatenation of every descendant text node.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Serialized children, with text escaped so the result parses back to
    /// the same tree.
    pub fn inner_markup(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_content(child, &mut out);
        }
        out
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: String) {
        self.children = vec![Content::Text(text)];
    }
}

fn collect_text(children: &[Content], out: &mut String) {
    for child in children {
        match child {
            Content::Text(t) => out.push_str(t),
            Content::Element(e) => collect_text(&e.children, out),
        }
    }
}

fn write_content(content: &Content, out: &mut String) {
    match content {
        Content::Text(t) => escape_into(t, false, out),
        Content::Element(e) => write_element(e, out),
    }
}

fn write_element(e: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&e.name);
    for (k, v) in &e.attributes {
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        escape_into(v, true, out);
        out.push('"');
    }
    if e.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &e.children {
        write_content(child, out);
    }
    out.push_str("</");
    out.push_str(&e.name);
    out.push('>');
}

fn escape_into(s: &str, attribute: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

// --- Parser -----------------------------------------------------------------

/// Parse a markup fragment (any number of top-level nodes).
pub fn parse_fragment(input: &str) -> Result<Vec<Content>> {
    FragmentParser { src: input, pos: 0 }.run()
}

struct FragmentParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> FragmentParser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn run(mut self) -> Result<Vec<Content>> {
        // The bottom of the stack is a nameless root collecting top-level nodes.
        let mut stack: Vec<Element> = vec![Element::default()];

        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.skip_past("-->", "unterminated comment")?;
            } else if rest.starts_with("<![CDATA[") {
                let start = self.pos + "<![CDATA[".len();
                let end = self.src[start..]
                    .find("]]>")
                    .map(|i| start + i)
                    .ok_or_else(|| AimlError::markup(self.pos, "unterminated CDATA section"))?;
                push_text(stack_top(&mut stack), &self.src[start..end]);
                self.pos = end + "]]>".len();
            } else if rest.starts_with("<?") {
                self.skip_past("?>", "unterminated processing instruction")?;
            } else if rest.starts_with("<!") {
                self.skip_past(">", "unterminated declaration")?;
            } else if rest.starts_with("</") {
                let open_at = self.pos;
                self.pos += 2;
                let name = self.read_name()?;
                self.skip_whitespace();
                self.expect('>')?;
                if stack.len() < 2 {
                    return Err(AimlError::markup(open_at, format!("unexpected closing tag </{name}>")));
                }
                let finished = stack.pop().unwrap_or_default();
                if finished.name != name {
                    return Err(AimlError::markup(
                        open_at,
                        format!("mismatched closing tag </{name}>, expected </{}>", finished.name),
                    ));
                }
                stack_top(&mut stack).children.push(Content::Element(finished));
            } else if rest.starts_with('<') {
                let (element, self_closing) = self.read_start_tag()?;
                if self_closing {
                    stack_top(&mut stack).children.push(Content::Element(element));
                } else {
                    stack.push(element);
                }
            } else {
                let end = rest.find('<').map(|i| self.pos + i).unwrap_or(self.src.len());
                let text = decode_entities(&self.src[self.pos..end]);
                push_text(stack_top(&mut stack), &text);
                self.pos = end;
            }
        }

        if stack.len() > 1 {
            let open = stack.last().map(|e| e.name.clone()).unwrap_or_default();
            return Err(AimlError::markup(self.src.len(), format!("unclosed tag <{open}>")));
        }
        Ok(stack.pop().map(|root| root.children).unwrap_or_default())
    }

    fn skip_past(&mut self, terminator: &str, message: &str) -> Result<()> {
        match self.rest().find(terminator) {
            Some(i) => {
                self.pos += i + terminator.len();
                Ok(())
            }
            None => Err(AimlError::markup(self.pos, message)),
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(AimlError::markup(self.pos, format!("expected '{c}'")))
        }
    }

    fn read_name(&mut self) -> Result<String> {
        let rest = self.rest();
        let len = rest.find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))).unwrap_or(rest.len());
        if len == 0 || !rest.starts_with(|c: char| c.is_alphabetic() || c == '_') {
            return Err(AimlError::markup(self.pos, "expected a tag or attribute name"));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn read_start_tag(&mut self) -> Result<(Element, bool)> {
        self.pos += 1;
        let mut element = Element::new(self.read_name()?);
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.pos += 2;
                return Ok((element, true));
            }
            if rest.starts_with('>') {
                self.pos += 1;
                return Ok((element, false));
            }
            if rest.is_empty() {
                return Err(AimlError::markup(self.pos, format!("unterminated start tag <{}>", element.name)));
            }
            let key = self.read_name()?;
            self.skip_whitespace();
            self.expect('=')?;
            self.skip_whitespace();
            let quote = match self.rest().chars().next() {
                Some(q @ ('"' | '\'')) => q,
                _ => return Err(AimlError::markup(self.pos, format!("unquoted value for attribute '{key}'"))),
            };
            self.pos += 1;
            let end = self
                .rest()
                .find(quote)
                .map(|i| self.pos + i)
                .ok_or_else(|| AimlError::markup(self.pos, format!("unterminated value for attribute '{key}'")))?;
            let value = decode_entities(&self.src[self.pos..end]);
            self.pos = end + 1;
            element.attributes.push((key, value));
        }
    }
}

fn stack_top(stack: &mut [Element]) -> &mut Element {
    // The root is never popped, so the stack is never empty here.
    let last = stack.len() - 1;
    &mut stack[last]
}

fn push_text(parent: &mut Element, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Content::Text(prev)) = parent.children.last_mut() {
        prev.push_str(text);
    } else {
        parent.children.push(Content::Text(text.to_string()));
    }
}

/// Decode the predefined XML entities and numeric character references.
/// Unknown or unterminated references are kept literally.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let c = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok().and_then(char::from_u32)
                    } else {
                        None
                    }
                }
            };
            c.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_text_and_elements() {
        let nodes = parse_fragment("Hi <star index=\"2\"/>, <b>you</b>!").unwrap();
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0], Content::Text("Hi ".into()));
        match &nodes[1] {
            Content::Element(e) => {
                assert_eq!(e.name, "star");
                assert_eq!(e.attribute("index"), Some("2"));
                assert!(e.children.is_empty());
            }
            other => panic!("expected element, got {other:?}"),
        }
        match &nodes[3] {
            Content::Element(e) => assert_eq!(e.inner_text(), "you"),
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn decodes_entities_in_text_and_attributes() {
        let e = Element::from_markup("template", "a &lt; b &amp;&#65;&#x42; <get name='x&amp;y'/>").unwrap();
        assert_eq!(e.inner_text(), "a < b &AB ");
        assert_eq!(e.child_elements().next().unwrap().attribute("name"), Some("x&y"));
        assert_eq!(decode_entities("fish & chips &bogus;"), "fish & chips &bogus;");
    }

    #[test]
    fn skips_comments_declarations_and_keeps_cdata() {
        let nodes =
            parse_fragment("<?xml version=\"1.0\"?><!DOCTYPE aiml><!-- note --><a><![CDATA[x < y]]></a>").unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Content::Element(e) => assert_eq!(e.inner_text(), "x < y"),
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_markup() {
        assert!(parse_fragment("<a><b></a></b>").is_err());
        assert!(parse_fragment("<a>").is_err());
        assert!(parse_fragment("</a>").is_err());
        assert!(parse_fragment("<a b=c/>").is_err());
        assert!(parse_fragment("1 < 2").is_err());
    }

    #[test]
    fn inner_markup_round_trips() {
        let src = "<li value=\"a &quot;b&quot;\">x &amp; <star/></li>tail &lt;";
        let e = Element::from_markup("template", src).unwrap();
        let again = Element::from_markup("template", &e.inner_markup()).unwrap();
        assert_eq!(e, again);
    }
}
