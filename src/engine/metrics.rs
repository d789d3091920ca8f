//! Turn metrics.
//!
//! Small structs used to observe what a turn did and where its time went.
//!
//! - `Bot::chat` collects the counters only.
//! - `Bot::chat_verbose` also records one [`SentenceMetrics`] per root
//!   sentence, for profiling and for inspecting which category answered.
//!
//! Redirect children share their root's `TurnMetrics`, so `nodes_visited` and
//! `redirects` cover the whole chain.

use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct TurnMetrics {
    /// Total elapsed time for the root request.
    pub total: Duration,
    /// Template nodes visited across the whole redirect chain.
    pub nodes_visited: usize,
    /// Child requests spawned by `srai` / `sr`.
    pub redirects: usize,
    /// Deepest child request reached.
    pub max_depth: usize,
    /// Per-sentence traces (root sentences only, verbose runs only).
    pub sentences: Vec<SentenceMetrics>,
    pub(crate) record_sentences: bool,
}

impl TurnMetrics {
    pub(crate) fn verbose() -> Self {
        TurnMetrics { record_sentences: true, ..Default::default() }
    }
}

/// What happened to one root input sentence.
#[derive(Debug, Default, Clone)]
pub struct SentenceMetrics {
    /// Token path handed to the Graphmaster.
    pub path: String,
    /// Pattern of the category that answered; empty when nothing matched.
    pub pattern: String,
    pub source: Option<String>,
    pub input_star: Vec<String>,
    /// Time spent in the Graphmaster search.
    pub matching: Duration,
    /// Time spent interpreting the template (redirects included).
    pub processing: Duration,
    pub output: String,
}
