use super::{history, TagContext};
use crate::error::{AimlError, Result};
use crate::markup::Element;

/// `index="n"` or `index="n,m"`, 1-based, as zero-based `(n, m)`.
///
/// A missing attribute is `(0, 0)`. A malformed one is logged and `None`.
pub(crate) fn parse_index(node: &Element) -> Option<(usize, usize)> {
    let Some(raw) = node.attribute("index") else {
        return Some((0, 0));
    };

    let mut parts = raw.split(',').map(|p| p.trim().parse::<usize>());
    let parsed = match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(n)), None, None) => Some((n, 1)),
        (Some(Ok(n)), Some(Ok(m)), None) => Some((n, m)),
        _ => None,
    };

    match parsed {
        Some((n, m)) if n >= 1 && m >= 1 => Some((n - 1, m - 1)),
        _ => {
            log::warn!("{}", AimlError::bad_attribute(&node.name, "index", raw));
            None
        }
    }
}

/// The element's text, or the first input wildcard capture when it is empty.
pub(crate) fn star_or_inner_text(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let text = node.inner_text();
    if !text.trim().is_empty() {
        return Ok(text);
    }
    history::star(&Element::new("star"), ctx)
}

/// Pick the `m`-th sentence counting backward from the last.
pub(crate) fn nth_from_last(sentences: &[String], m: usize) -> String {
    sentences.iter().rev().nth(m).cloned().unwrap_or_default()
}
