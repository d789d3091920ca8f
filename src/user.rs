//! Conversation partner state: identity, predicates and result history.

use crate::engine::ChatResult;
use std::collections::HashMap;

/// Reserved predicate holding the current topic.
pub const TOPIC_PREDICATE: &str = "topic";

/// A user of the bot.
///
/// Predicates are a flat key/value store; `topic` is reserved and feeds the
/// third dimension of every token path. Results are appended after each root
/// turn and never pruned: history tags (`that`, `input`, `output`) index into
/// them from the newest end.
#[derive(Debug, Clone)]
pub struct User {
    id: String,
    predicates: HashMap<String, String>,
    results: Vec<ChatResult>,
}

impl User {
    /// Create a user whose topic is `*`.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_topic(id, "*")
    }

    pub fn with_topic(id: impl Into<String>, topic: &str) -> Self {
        let mut predicates = HashMap::new();
        predicates.insert(TOPIC_PREDICATE.to_string(), topic.to_string());
        User { id: id.into(), predicates, results: Vec::new() }
    }

    /// Create a user with a random v4 UUID as id.
    pub fn anonymous() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Predicate value, or the empty string when unset.
    pub fn predicate(&self, name: &str) -> &str {
        self.predicates.get(&name.to_lowercase()).map(String::as_str).unwrap_or("")
    }

    pub fn set_predicate(&mut self, name: &str, value: impl Into<String>) {
        self.predicates.insert(name.to_lowercase(), value.into());
    }

    pub fn remove_predicate(&mut self, name: &str) -> Option<String> {
        self.predicates.remove(&name.to_lowercase())
    }

    pub fn topic(&self) -> &str {
        self.predicate(TOPIC_PREDICATE)
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.set_predicate(TOPIC_PREDICATE, topic);
    }

    /// All completed root results, oldest first.
    pub fn results(&self) -> &[ChatResult] {
        &self.results
    }

    /// The `n`-th most recent result (`0` is the latest).
    pub fn result(&self, n: usize) -> Option<&ChatResult> {
        self.results.iter().rev().nth(n)
    }

    /// Last sentence of the bot's latest response; the "that" of the next path.
    pub fn last_output_sentence(&self) -> Option<&str> {
        self.result(0).and_then(|r| r.output_sentences.last()).map(String::as_str)
    }

    pub(crate) fn push_result(&mut self, result: ChatResult) {
        self.results.push(result);
    }
}
