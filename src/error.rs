//! Error taxonomy.
//!
//! Only a few of these ever cross the public API: loading, snapshot and
//! configuration failures. During a chat turn errors are contained at the
//! per-sentence boundary (see `engine/turn.rs`): a `Markup` failure of a generated
//! fragment is logged and that sentence produces no output, while
//! `BadTagAttribute` is logged inside the handler and degraded to an empty
//! string. Timeouts are a request state, not an error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AimlError>;

#[derive(Error, Debug)]
pub enum AimlError {
    #[error("refusing to insert a category with an empty path")]
    EmptyPath,

    #[error("malformed markup at byte {offset}: {message}")]
    Markup { offset: usize, message: String },

    #[error("bad attribute {attribute}=\"{value}\" on <{tag}>")]
    BadTagAttribute { tag: String, attribute: String, value: String },

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AimlError {
    pub(crate) fn markup(offset: usize, message: impl Into<String>) -> Self {
        AimlError::Markup { offset, message: message.into() }
    }

    pub(crate) fn bad_attribute(tag: &str, attribute: &str, value: &str) -> Self {
        AimlError::BadTagAttribute { tag: tag.to_string(), attribute: attribute.to_string(), value: value.to_string() }
    }
}

impl From<serde_json::Error> for AimlError {
    fn from(err: serde_json::Error) -> Self {
        AimlError::Snapshot(err.to_string())
    }
}

impl From<toml::de::Error> for AimlError {
    fn from(err: toml::de::Error) -> Self {
        AimlError::Config(err.to_string())
    }
}
