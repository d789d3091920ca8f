//! An AIML interpreter built around the Graphmaster.
//!
//! ```text
//! AIML documents ──load──▶ Graphmaster (word trie of categories)
//!                                │
//! user input ──▶ Request ──▶ match path ──▶ template ──interpret──▶ ChatResult
//!                    ▲                          │
//!                    └──── srai / sr (child) ───┘
//! ```
//!
//! A [`Bot`] owns the categories, the settings and the tag handlers; a
//! [`User`] carries predicates and history from turn to turn.
//!
//! ```
//! use graphmaster::{Bot, Settings};
//!
//! let mut bot = Bot::new(Settings::default());
//! bot.learn_str(
//!     "<aiml><category><pattern>MY NAME IS *</pattern>\
//!      <template><think><set name=\"name\"><star/></set></think>Nice to meet you <get name=\"name\"/></template>\
//!      </category></aiml>",
//!     "inline",
//! )
//! .unwrap();
//!
//! let mut user = bot.new_user("ada");
//! assert_eq!(bot.chat("my name is Ada", &mut user).output(), "Nice to meet you Ada.");
//! assert_eq!(user.predicate("name"), "Ada");
//! ```

#[macro_use]
mod macros;
mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod markup;
pub mod tags;
pub mod text;
pub mod user;

pub use api::{Bot, ChatResultVerbose};
pub use config::{Settings, Substitutions};
pub use engine::{ChatResult, Deadline, Graphmaster, Request, RequestState, SentenceMetrics, SubQuery, TurnMetrics};
pub use error::{AimlError, Result};
pub use tags::{TagContext, TagFlags, TagHandler};
pub use user::User;

/// Dimension of a token path a wildcard capture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchState {
    Input,
    That,
    Topic,
}
