//! Request / result lifecycle.
//!
//! A turn is one root [`Request`] and one [`ChatResult`]. Symbolic reduction
//! tags (`srai`, `sr`) do not hold pointers to their parent; they derive a
//! child with [`Request::child`], pass it down the call stack and fold its
//! timeout state back with [`Request::absorb`]. The child shares the root's
//! start instant, so the deadline spans the whole redirect chain:
//!
//! ```text
//! root  ├── started_on ─────────────── limit ──┤
//! child    (same started_on, depth + 1)        │
//! grandchild (same started_on, depth + 2)      │
//! ```
//!
//! State per request:
//!
//! ```text
//! Created ──begin──▶ Evaluating ──complete──▶ Completed
//!    │                    │
//!    └──── deadline ──────┴──────▶ TimedOut (terminal, inherited by children)
//! ```

use crate::config::Settings;
use crate::text::collapse_whitespace;
use crate::MatchState;
use std::time::{Duration, Instant};

/// Shared deadline of a request chain.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started_on: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Deadline { started_on: Instant::now(), limit }
    }

    pub fn starting_at(started_on: Instant, limit: Duration) -> Self {
        Deadline { started_on, limit }
    }

    pub fn started_on(&self) -> Instant {
        self.started_on
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started_on.elapsed()
    }

    pub fn expired(&self) -> bool {
        self.elapsed() > self.limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Created,
    Evaluating,
    Completed,
    TimedOut,
}

/// One evaluation of raw input, either a root turn or a redirect child.
#[derive(Debug, Clone)]
pub struct Request {
    pub raw_input: String,
    deadline: Deadline,
    state: RequestState,
    depth: usize,
}

impl Request {
    pub fn new(raw_input: impl Into<String>, timeout: Duration) -> Self {
        Request { raw_input: raw_input.into(), deadline: Deadline::new(timeout), state: RequestState::Created, depth: 0 }
    }

    /// A root request whose clock started at `started_on`.
    pub fn with_deadline(raw_input: impl Into<String>, deadline: Deadline) -> Self {
        Request { raw_input: raw_input.into(), deadline, state: RequestState::Created, depth: 0 }
    }

    /// Derive a redirect child: same deadline, inherited timeout, one level
    /// deeper.
    pub fn child(&self, raw_input: impl Into<String>) -> Request {
        let state = if self.has_timed_out() { RequestState::TimedOut } else { RequestState::Created };
        Request { raw_input: raw_input.into(), deadline: self.deadline, state, depth: self.depth + 1 }
    }

    /// Fold a finished child's timeout back into this request.
    pub fn absorb(&mut self, child: &Request) {
        if child.has_timed_out() {
            self.state = RequestState::TimedOut;
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    pub fn has_timed_out(&self) -> bool {
        self.state == RequestState::TimedOut
    }

    pub(crate) fn begin(&mut self) {
        if self.state == RequestState::Created {
            self.state = RequestState::Evaluating;
        }
    }

    pub(crate) fn complete(&mut self) {
        if self.state != RequestState::TimedOut {
            self.state = RequestState::Completed;
        }
    }

    /// Poll the deadline. Returns `true` once the chain has run out of time;
    /// the transition is logged a single time per request.
    pub(crate) fn check_deadline(&mut self) -> bool {
        if self.state == RequestState::TimedOut {
            return true;
        }
        if self.deadline.expired() {
            log::error!(
                "request timed out after {:?} (limit {:?}, depth {}): \"{}\"",
                self.deadline.elapsed(),
                self.deadline.limit(),
                self.depth,
                self.raw_input
            );
            self.state = RequestState::TimedOut;
            return true;
        }
        false
    }
}

/// Captures of one match attempt, plus the template it selected.
///
/// Star lists are filled left to right; a failed match leaves everything
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubQuery {
    /// Token path that was evaluated.
    pub path: String,
    /// Template markup of the matched category.
    pub template: String,
    pub input_star: Vec<String>,
    pub that_star: Vec<String>,
    pub topic_star: Vec<String>,
    /// Input part of the path (text before `<THAT>`).
    pub input_text: String,
    /// Trie words of the matched category, separators included.
    pub pattern: String,
    /// Source id the matched category was loaded from.
    pub source: Option<String>,
}

impl SubQuery {
    pub fn is_match(&self) -> bool {
        !self.pattern.is_empty()
    }

    pub fn stars(&self, state: MatchState) -> &[String] {
        match state {
            MatchState::Input => &self.input_star,
            MatchState::That => &self.that_star,
            MatchState::Topic => &self.topic_star,
        }
    }

    pub(crate) fn stars_mut(&mut self, state: MatchState) -> &mut Vec<String> {
        match state {
            MatchState::Input => &mut self.input_star,
            MatchState::That => &mut self.that_star,
            MatchState::Topic => &mut self.topic_star,
        }
    }
}

/// Outcome of a turn.
#[derive(Debug, Clone, Default)]
pub struct ChatResult {
    pub raw_input: String,
    pub input_sentences: Vec<String>,
    pub normalized_paths: Vec<String>,
    pub sub_queries: Vec<SubQuery>,
    pub output_sentences: Vec<String>,
    /// Set when the turn completes.
    pub duration: Duration,
    pub timed_out: bool,
    sentence_endings: String,
    timeout_message: String,
}

impl ChatResult {
    /// A result using the default sentence endings and timeout message.
    pub fn new(raw_input: impl Into<String>) -> Self {
        let defaults = Settings::default();
        Self::with_settings(raw_input, &defaults)
    }

    pub fn with_settings(raw_input: impl Into<String>, settings: &Settings) -> Self {
        ChatResult {
            raw_input: raw_input.into(),
            sentence_endings: settings.sentence_splitters.clone(),
            timeout_message: settings.timeout_message.clone(),
            ..Default::default()
        }
    }

    /// Output sentences joined into one reply.
    ///
    /// Each sentence has its whitespace collapsed and gets a `.` appended when
    /// it does not already end with a configured sentence ending. A timed-out
    /// turn without any sentence yields the timeout message; any other empty
    /// turn yields the empty string and the caller picks a fallback.
    pub fn output(&self) -> String {
        let sentences: Vec<String> = self
            .output_sentences
            .iter()
            .map(|s| collapse_whitespace(s))
            .filter(|s| !s.is_empty())
            .map(|mut s| {
                if !s.ends_with(|c: char| self.sentence_endings.contains(c)) {
                    s.push('.');
                }
                s
            })
            .collect();

        if sentences.is_empty() {
            return if self.timed_out { self.timeout_message.clone() } else { String::new() };
        }
        sentences.join(" ")
    }
}
