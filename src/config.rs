//! Bot settings.
//!
//! Every field has a default so an empty TOML document is a valid
//! configuration. Substitution lists are written as arrays of
//! `[pattern, replacement]` pairs to keep their order:
//!
//! ```toml
//! timeout_ms = 500
//! sentence_splitters = ".!?"
//!
//! [bot]
//! name = "Ada"
//!
//! [substitutions]
//! person2 = [["i", "you"], ["you", "me"]]
//! ```

use crate::error::{AimlError, Result};
use crate::text::SubstitutionList;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Contractions expanded before matching.
static NORMAL_DEFAULTS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("what's", "what is"),
        ("where's", "where is"),
        ("who's", "who is"),
        ("it's", "it is"),
        ("that's", "that is"),
        ("i'm", "i am"),
        ("you're", "you are"),
        ("we're", "we are"),
        ("they're", "they are"),
        ("i've", "i have"),
        ("you've", "you have"),
        ("i'll", "i will"),
        ("you'll", "you will"),
        ("i'd", "i would"),
        ("can't", "can not"),
        ("cannot", "can not"),
        ("won't", "will not"),
        ("don't", "do not"),
        ("doesn't", "does not"),
        ("didn't", "did not"),
        ("isn't", "is not"),
        ("aren't", "are not"),
        ("wasn't", "was not"),
        ("let's", "let us"),
    ]
});

static GENDER_DEFAULTS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("he", "she"),
        ("she", "he"),
        ("him", "her"),
        ("his", "her"),
        ("her", "him"),
        ("himself", "herself"),
        ("herself", "himself"),
    ]
});

static PERSON_DEFAULTS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("i was", "he or she was"),
        ("i am", "he or she is"),
        ("he was", "i was"),
        ("she was", "i was"),
        ("he is", "i am"),
        ("she is", "i am"),
        ("myself", "him or herself"),
        ("mine", "his or hers"),
        ("my", "his or her"),
        ("me", "him or her"),
        ("i", "he or she"),
        ("he", "i"),
        ("she", "i"),
        ("him", "me"),
        ("her", "me"),
    ]
});

static PERSON2_DEFAULTS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("i was", "you were"),
        ("you were", "i was"),
        ("i am", "you are"),
        ("you are", "i am"),
        ("myself", "yourself"),
        ("yourself", "myself"),
        ("mine", "yours"),
        ("yours", "mine"),
        ("my", "your"),
        ("your", "my"),
        ("me", "you"),
        ("i", "you"),
        ("you", "me"),
    ]
});

/// Ordered substitution dictionaries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Substitutions {
    /// Applied to raw input before it becomes a token path.
    pub normal: SubstitutionList,
    pub gender: SubstitutionList,
    pub person: SubstitutionList,
    pub person2: SubstitutionList,
}

impl Default for Substitutions {
    fn default() -> Self {
        Substitutions {
            normal: SubstitutionList::new(NORMAL_DEFAULTS.iter().copied()),
            gender: SubstitutionList::new(GENDER_DEFAULTS.iter().copied()),
            person: SubstitutionList::new(PERSON_DEFAULTS.iter().copied()),
            person2: SubstitutionList::new(PERSON2_DEFAULTS.iter().copied()),
        }
    }
}

/// Upper bound for [`Settings::max_redirect_depth`].
pub const MAX_REDIRECT_DEPTH: usize = 128;

/// Engine-wide settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deadline for a whole request chain, redirects included.
    pub timeout_ms: u64,
    /// Output of a timed-out turn that produced no sentence.
    pub timeout_message: String,
    /// Characters that split input into sentences and count as sentence
    /// endings when output is assembled.
    pub sentence_splitters: String,
    /// Redirect nesting limit, `1..=MAX_REDIRECT_DEPTH`. Every redirect nests
    /// native stack frames, so the cap cannot be switched off.
    pub max_redirect_depth: usize,
    /// Topic assigned to new users.
    pub default_topic: String,
    /// Bot properties served by `<bot name="..."/>`.
    pub bot: BTreeMap<String, String>,
    pub substitutions: Substitutions,
    /// Fixed clock for `<date/>`; local time when unset.
    #[serde(deserialize_with = "optional_timestamp::deserialize")]
    pub clock: Option<NaiveDateTime>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            timeout_ms: 2000,
            timeout_message: "ERROR: The request has timed out.".to_string(),
            sentence_splitters: ".!?;".to_string(),
            max_redirect_depth: 64,
            default_topic: "*".to_string(),
            bot: BTreeMap::from([("name".to_string(), "Graphmaster".to_string())]),
            substitutions: Substitutions::default(),
            clock: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&source)?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `max_redirect_depth` clamped into `1..=MAX_REDIRECT_DEPTH`, for
    /// settings built in code without going through validation.
    pub fn redirect_depth_cap(&self) -> usize {
        self.max_redirect_depth.clamp(1, MAX_REDIRECT_DEPTH)
    }

    pub fn bot_property(&self, name: &str) -> Option<&str> {
        self.bot.get(name).map(String::as_str)
    }

    fn validate(&self) -> Result<()> {
        if self.sentence_splitters.chars().any(char::is_whitespace) {
            return Err(AimlError::Config("sentence_splitters must not contain whitespace".to_string()));
        }
        if !(1..=MAX_REDIRECT_DEPTH).contains(&self.max_redirect_depth) {
            return Err(AimlError::Config(format!(
                "max_redirect_depth must be between 1 and {MAX_REDIRECT_DEPTH}, got {}",
                self.max_redirect_depth
            )));
        }
        if self.default_topic.trim().is_empty() {
            return Err(AimlError::Config("default_topic must not be empty".to_string()));
        }
        Ok(())
    }
}

mod optional_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings.timeout_ms, 2000);
        assert_eq!(settings.sentence_splitters, ".!?;");
        assert_eq!(settings.bot_property("name"), Some("Graphmaster"));
        assert!(!settings.substitutions.person2.is_empty());
        assert!(settings.clock.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let settings = Settings::from_toml_str(
            r#"
            timeout_ms = 50
            clock = "2013-02-12T04:30:00"

            [bot]
            name = "Ada"
            mood = "cheerful"

            [substitutions]
            gender = [["he", "she"]]
            "#,
        )
        .unwrap();
        assert_eq!(settings.timeout(), Duration::from_millis(50));
        assert_eq!(settings.bot_property("mood"), Some("cheerful"));
        assert_eq!(settings.substitutions.gender.pairs().len(), 1);
        assert_eq!(settings.substitutions.gender.apply("he ran"), "she ran");
        // Lists that are not mentioned keep their defaults.
        assert!(!settings.substitutions.normal.is_empty());
        assert_eq!(settings.clock.unwrap().format("%H:%M").to_string(), "04:30");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Settings::from_toml_str("sentence_splitters = \". !\"").is_err());
        assert!(Settings::from_toml_str("timeout_ms = \"soon\"").is_err());
        assert!(Settings::from_toml_str("clock = \"yesterday\"").is_err());
        assert!(matches!(Settings::from_toml_str("max_redirect_depth = 0"), Err(AimlError::Config(_))));
        assert!(matches!(Settings::from_toml_str("max_redirect_depth = 100000"), Err(AimlError::Config(_))));
        assert_eq!(Settings::from_toml_str("max_redirect_depth = 8").unwrap().max_redirect_depth, 8);
    }

    #[test]
    fn redirect_depth_cap_is_always_bounded() {
        let unbounded = Settings { max_redirect_depth: 0, ..Settings::default() };
        assert_eq!(unbounded.redirect_depth_cap(), 1);
        let huge = Settings { max_redirect_depth: usize::MAX, ..Settings::default() };
        assert_eq!(huge.redirect_depth_cap(), MAX_REDIRECT_DEPTH);
        assert_eq!(Settings::default().redirect_depth_cap(), 64);
    }
}
