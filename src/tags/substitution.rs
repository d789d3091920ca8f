//! Pronoun swaps driven by the configured substitution lists.
//!
//! `<person2>I like my cat</person2>` ─▶ "you like your cat",
//! `<person>I was late</person>` ─▶ "he or she was late". An empty element
//! applies to `<star/>`.

use super::helpers::star_or_inner_text;
use super::TagContext;
use crate::error::Result;
use crate::markup::Element;

pub(crate) fn gender(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let text = star_or_inner_text(node, ctx)?;
    Ok(ctx.bot.settings().substitutions.gender.apply(&text))
}

pub(crate) fn person(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let text = star_or_inner_text(node, ctx)?;
    Ok(ctx.bot.settings().substitutions.person.apply(&text))
}

pub(crate) fn person2(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let text = star_or_inner_text(node, ctx)?;
    Ok(ctx.bot.settings().substitutions.person2.apply(&text))
}
