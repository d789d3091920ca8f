//! Wildcard captures and conversation history.
//!
//! ```text
//! <star index="n"/>        n-th input capture of the current match
//! <thatstar index="n"/>    n-th that capture
//! <topicstar index="n"/>   n-th topic capture
//! <that index="n,m"/>      m-th sentence from the end of the n-th previous response
//! <input index="n,m"/>     m-th sentence from the end of the n-th input (1 = this turn)
//! <output index="n"/>      the n-th previous response as a whole
//! ```
//!
//! Out-of-range indices yield the empty string.

use super::helpers::{nth_from_last, parse_index};
use super::TagContext;
use crate::error::Result;
use crate::markup::Element;
use crate::MatchState;

fn capture(node: &Element, ctx: &TagContext<'_>, state: MatchState) -> String {
    let Some((n, _)) = parse_index(node) else {
        return String::new();
    };
    match ctx.query.stars(state).get(n) {
        Some(text) => text.clone(),
        None => {
            log::debug!("<{}> index {} out of range", node.name, n + 1);
            String::new()
        }
    }
}

pub(crate) fn star(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(capture(node, ctx, MatchState::Input))
}

pub(crate) fn thatstar(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(capture(node, ctx, MatchState::That))
}

pub(crate) fn topicstar(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(capture(node, ctx, MatchState::Topic))
}

pub(crate) fn that(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let Some((n, m)) = parse_index(node) else {
        return Ok(String::new());
    };
    Ok(ctx.user.result(n).map(|r| nth_from_last(&r.output_sentences, m)).unwrap_or_default())
}

pub(crate) fn input(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let Some((n, m)) = parse_index(node) else {
        return Ok(String::new());
    };
    if n == 0 {
        let current = &ctx.turn.input_sentences;
        let upto = (ctx.sentence + 1).min(current.len());
        return Ok(nth_from_last(&current[..upto], m));
    }
    Ok(ctx.user.result(n - 1).map(|r| nth_from_last(&r.input_sentences, m)).unwrap_or_default())
}

pub(crate) fn output(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let Some((n, _)) = parse_index(node) else {
        return Ok(String::new());
    };
    Ok(ctx.user.result(n).map(|r| r.output()).unwrap_or_default())
}
