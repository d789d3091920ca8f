//! `condition` and `random`.
//!
//! Both are non-recursive: they pick a branch from the raw element and return
//! its markup, which the interpreter then evaluates. Branches not taken are
//! never interpreted, so their side effects (`set`, `srai`, ...) do not run.
//!
//! Condition forms:
//!
//! ```text
//! block:     <condition name="mood" value="happy">...</condition>
//! single:    <condition name="mood"><li value="happy">...</li><li>default</li></condition>
//! multi:     <condition><li name="mood" value="happy">...</li><li>default</li></condition>
//! ```
//!
//! Values are patterns: `*` stands for one or more letters, digits or
//! spaces, and comparison ignores case.

use super::TagContext;
use crate::error::Result;
use crate::markup::Element;
use rand::seq::SliceRandom;
use regex::Regex;

/// Translate a condition value into an anchored, case-insensitive regex.
fn value_regex(value: &str) -> Option<Regex> {
    let mut pattern = String::from("(?i)^");
    for c in value.trim().chars() {
        match c {
            '*' => pattern.push_str(r"[\sA-Za-z0-9]+"),
            c if c.is_whitespace() => pattern.push_str(r"\s"),
            c => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
    }
    pattern.push('$');
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!("condition value \"{value}\" is not usable: {err}");
            None
        }
    }
}

/// Does the predicate `name` currently match `value`?
pub(crate) fn predicate_matches(ctx: &TagContext<'_>, name: &str, value: &str) -> bool {
    let actual = ctx.user.predicate(name);
    value_regex(value).is_some_and(|re| re.is_match(actual))
}

pub(crate) fn condition(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let name = node.attribute("name");
    let value = node.attribute("value");

    if let (Some(name), Some(value)) = (name, value) {
        let hit = predicate_matches(ctx, name, value);
        log::trace!("condition {name}~\"{value}\": {hit}");
        return Ok(if hit { node.inner_markup() } else { String::new() });
    }

    for li in node.child_elements().filter(|e| e.name.eq_ignore_ascii_case("li")) {
        let li_name = li.attribute("name").or(name);
        match (li_name, li.attribute("value")) {
            (Some(li_name), Some(li_value)) => {
                if predicate_matches(ctx, li_name, li_value) {
                    return Ok(li.inner_markup());
                }
            }
            (None, Some(li_value)) => {
                log::warn!("condition branch value \"{li_value}\" has no predicate name");
            }
            (_, None) => return Ok(li.inner_markup()),
        }
    }
    Ok(String::new())
}

/// `<random><li>a</li><li>b</li></random>`: one branch, uniformly.
pub(crate) fn random(node: &Element, _ctx: &mut TagContext<'_>) -> Result<String> {
    let branches: Vec<&Element> = node.child_elements().filter(|e| e.name.eq_ignore_ascii_case("li")).collect();
    Ok(branches.choose(&mut rand::thread_rng()).map(|li| li.inner_markup()).unwrap_or_default())
}
