//! Predicates, bot properties and side-effect tags.

use super::TagContext;
use crate::error::{AimlError, Result};
use crate::markup::Element;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use std::fmt::Write;

const DEFAULT_DATE_FORMAT: &str = "%c";

fn name_attribute<'e>(node: &'e Element) -> Option<&'e str> {
    match node.attribute("name").map(str::trim) {
        Some(name) if !name.is_empty() => Some(name),
        _ => {
            log::warn!("{}", AimlError::bad_attribute(&node.name, "name", node.attribute("name").unwrap_or("")));
            None
        }
    }
}

/// `<get name="x"/>`: predicate value, empty when unset.
pub(crate) fn get(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(name_attribute(node).map(|name| ctx.user.predicate(name).to_string()).unwrap_or_default())
}

/// `<set name="x">value</set>`: store and echo the value. An empty value
/// removes the predicate.
pub(crate) fn set(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let Some(name) = name_attribute(node) else {
        return Ok(String::new());
    };
    let value = node.inner_text();
    if value.trim().is_empty() {
        ctx.user.remove_predicate(name);
        return Ok(String::new());
    }
    log::debug!("user {} set {name}={value}", ctx.user.id());
    ctx.user.set_predicate(name, value.clone());
    Ok(value)
}

pub(crate) fn bot(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(name_attribute(node).and_then(|name| ctx.bot.settings().bot_property(name)).unwrap_or("").to_string())
}

pub(crate) fn id(_node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(ctx.user.id().to_string())
}

/// Number of categories the bot knows.
pub(crate) fn size(_node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(ctx.bot.size().to_string())
}

pub(crate) fn version(_node: &Element, _ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(env!("CARGO_PKG_VERSION").to_string())
}

/// `<date format="%Y-%m-%d"/>`: strftime-formatted now (or the configured
/// clock). An invalid format falls back to `%c`.
pub(crate) fn date(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    let now = ctx.bot.settings().clock.unwrap_or_else(|| Local::now().naive_local());
    let format = match node.attribute("format") {
        Some(f) if StrftimeItems::new(f).any(|item| matches!(item, Item::Error)) => {
            log::warn!("{}", AimlError::bad_attribute("date", "format", f));
            DEFAULT_DATE_FORMAT
        }
        Some(f) if !f.is_empty() => f,
        _ => DEFAULT_DATE_FORMAT,
    };

    // Offset specifiers parse fine but cannot render a naive time.
    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_err() {
        log::warn!("{}", AimlError::bad_attribute("date", "format", format));
        out.clear();
        let _ = write!(out, "{}", now.format(DEFAULT_DATE_FORMAT));
    }
    Ok(out)
}

/// `<think>`: evaluate for side effects, output nothing.
pub(crate) fn think(_node: &Element, _ctx: &mut TagContext<'_>) -> Result<String> {
    Ok(String::new())
}

pub(crate) fn gossip(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    log::info!("gossip from user {}: {}", ctx.user.id(), node.inner_text().trim());
    Ok(String::new())
}
