//! Template tag handlers.
//!
//! A handler is a named strategy with one capability: turn an element into
//! text given the current [`TagContext`]. Its [`TagFlags`] tell the
//! interpreter how to drive it:
//!
//! - `RECURSIVE`: child elements are interpreted first and replaced by their
//!   text; the handler then sees a finished subtree.
//! - not `RECURSIVE`: the handler sees the raw element and returns markup,
//!   which the interpreter parses and interprets again (generate, then
//!   interpret). `condition` and `random` work this way so only the selected
//!   branch is ever evaluated.
//! - `REDIRECT`: the handler spawns a child request (symbolic reduction).
//!
//! Built-in handlers live in a static table keyed by lower-case tag name.
//! Custom handlers are registered per bot in a [`TagRegistry`] and shadow
//! built-ins of the same name.

mod branching;
mod formatting;
mod helpers;
mod history;
mod predicates;
mod redirect;
mod substitution;

#[cfg(test)]
mod tests;

use crate::api::Bot;
use crate::engine::{ChatResult, Request, SubQuery, TurnMetrics};
use crate::error::Result;
use crate::markup::Element;
use crate::user::User;
use once_cell::sync::Lazy;
use std::collections::HashMap;

bitflags::bitflags! {
    /// How the interpreter drives a handler.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TagFlags: u8 {
        const RECURSIVE = 1 << 0;
        const REDIRECT  = 1 << 1;
    }
}

pub type TagFn = Box<dyn Fn(&Element, &mut TagContext<'_>) -> Result<String> + Send + Sync>;

/// A named tag handler.
pub struct TagHandler {
    pub name: String,
    pub flags: TagFlags,
    pub eval: TagFn,
}

impl TagHandler {
    pub fn is_recursive(&self) -> bool {
        self.flags.contains(TagFlags::RECURSIVE)
    }
}

impl std::fmt::Debug for TagHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagHandler").field("name", &self.name).field("flags", &self.flags).field("eval", &"<function>").finish()
    }
}

/// Everything a handler may read or change while a template is evaluated.
pub struct TagContext<'a> {
    pub bot: &'a Bot,
    pub user: &'a mut User,
    pub request: &'a mut Request,
    /// Captures of the category being evaluated.
    pub query: &'a SubQuery,
    /// The root turn (redirect children see their root's turn).
    pub turn: &'a ChatResult,
    /// Index of the root input sentence being answered.
    pub sentence: usize,
    pub(crate) metrics: &'a mut TurnMetrics,
}

static BUILTIN_TAGS: Lazy<HashMap<String, TagHandler>> = Lazy::new(|| {
    let recursive = TagFlags::RECURSIVE;
    let handlers = vec![
        tag!(name: "srai", flags: recursive | TagFlags::REDIRECT, eval: redirect::srai),
        tag!(name: "sr", flags: recursive | TagFlags::REDIRECT, eval: redirect::sr),
        tag!(name: "star", flags: recursive, eval: history::star),
        tag!(name: "thatstar", flags: recursive, eval: history::thatstar),
        tag!(name: "topicstar", flags: recursive, eval: history::topicstar),
        tag!(name: "that", flags: recursive, eval: history::that),
        tag!(name: "input", flags: recursive, eval: history::input),
        tag!(name: "output", flags: recursive, eval: history::output),
        tag!(name: "get", flags: recursive, eval: predicates::get),
        tag!(name: "set", flags: recursive, eval: predicates::set),
        tag!(name: "bot", flags: recursive, eval: predicates::bot),
        tag!(name: "id", flags: recursive, eval: predicates::id),
        tag!(name: "size", flags: recursive, eval: predicates::size),
        tag!(name: "version", flags: recursive, eval: predicates::version),
        tag!(name: "date", flags: recursive, eval: predicates::date),
        tag!(name: "think", flags: recursive, eval: predicates::think),
        tag!(name: "gossip", flags: recursive, eval: predicates::gossip),
        tag!(name: "uppercase", flags: recursive, eval: formatting::uppercase),
        tag!(name: "lowercase", flags: recursive, eval: formatting::lowercase),
        tag!(name: "formal", flags: recursive, eval: formatting::formal),
        tag!(name: "sentence", flags: recursive, eval: formatting::sentence),
        tag!(name: "gender", flags: recursive, eval: substitution::gender),
        tag!(name: "person", flags: recursive, eval: substitution::person),
        tag!(name: "person2", flags: recursive, eval: substitution::person2),
        tag!(name: "condition", flags: TagFlags::empty(), eval: branching::condition),
        tag!(name: "random", flags: TagFlags::empty(), eval: branching::random),
    ];
    handlers.into_iter().map(|h| (h.name.clone(), h)).collect()
});

/// Per-bot handler lookup: custom handlers first, then the built-in table.
#[derive(Debug, Default)]
pub struct TagRegistry {
    custom: HashMap<String, TagHandler>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a custom handler. Names are case-insensitive.
    pub fn register(&mut self, mut handler: TagHandler) {
        handler.name = handler.name.to_lowercase();
        if BUILTIN_TAGS.contains_key(&handler.name) {
            log::info!("custom handler shadows built-in <{}>", handler.name);
        }
        self.custom.insert(handler.name.clone(), handler);
    }

    /// Resolve a lower-case tag name.
    pub fn get(&self, name: &str) -> Option<&TagHandler> {
        self.custom.get(name).or_else(|| BUILTIN_TAGS.get(name))
    }

    /// All resolvable tag names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = BUILTIN_TAGS.keys().chain(self.custom.keys()).map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
