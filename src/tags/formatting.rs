//! Case transforms. An empty element applies to `<star/>`.

use super::helpers::star_or_inner_text;
use super::TagContext;
use crate::error::Result;
use crate::markup::Element;
use crate::text::{sentence_case, title_case};

pub(crate) fn uppercase(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(star_or_inner_text(node, ctx)?.to_uppercase())
}

pub(crate) fn lowercase(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(star_or_inner_text(node, ctx)?.to_lowercase())
}

pub(crate) fn formal(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(title_case(&star_or_inner_text(node, ctx)?))
}

pub(crate) fn sentence(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let text = star_or_inner_text(node, ctx)?;
    Ok(sentence_case(&text, &ctx.bot.settings().sentence_splitters))
}
