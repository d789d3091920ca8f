use super::TagContext;
use crate::engine::redirect;
use crate::error::Result;
use crate::markup::Element;

/// `<srai>text</srai>`: answer `text` as if the user had said it.
pub(crate) fn srai(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let text = node.inner_text();
    if text.trim().is_empty() {
        return Ok(String::new());
    }
    Ok(redirect(&text, ctx))
}

/// `<sr/>`: shorthand for `<srai><star/></srai>`.
pub(crate) fn sr(_node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let star = ctx.query.input_star.first().cloned().unwrap_or_default();
    if star.trim().is_empty() {
        return Ok(String::new());
    }
    Ok(redirect(&star, ctx))
}
