//! Matching and evaluation engine.
//!
//! This module is the entry point for everything between raw input and a
//! [`ChatResult`]. It is split into focused submodules under `src/engine/`
//! while keeping public paths stable (for example `crate::engine::Graphmaster`
//! and `crate::engine::Request`).
//!
//! ## How the parts work together
//!
//! ```text
//! *.aiml ── load_aiml_* (loader.rs) ──▶ Graphmaster::insert (graphmaster.rs)
//!
//! raw input ── Request::new (request.rs)
//!                 │
//!                 v
//!           run_request (turn.rs)
//!             - split_sentences / build_input_path   (normalize.rs)
//!             - Graphmaster::evaluate_within         (graphmaster.rs)
//!             - process_template                     (interpreter.rs)
//!                 └─ tag handlers (src/tags/**)
//!                      └─ srai / sr ─▶ redirect ─▶ run_request (child)
//!                 │
//!                 v
//!            ChatResult
//! ```
//!
//! ## Responsibilities by module
//!
//! - `graphmaster.rs`: the category trie, wildcard search and snapshots.
//! - `normalize.rs`: sentence splitting, input normalization, path building.
//! - `loader.rs`: turns AIML documents into categories.
//! - `request.rs`: `Request`, its shared deadline, `SubQuery`, `ChatResult`.
//! - `interpreter.rs`: walks template markup and dispatches to tag handlers.
//! - `turn.rs`: the per-request sentence loop and child redirects.
//! - `metrics.rs`: optional timing/debug data for a turn.
//!
//! ## Debugging
//!
//! Run with `RUST_LOG=graphmaster=debug` to see every path and redirect, or
//! `trace` to follow the interpreter element by element.

#[path = "engine/graphmaster.rs"]
mod graphmaster;
#[path = "engine/interpreter.rs"]
mod interpreter;
#[path = "engine/loader.rs"]
mod loader;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/normalize.rs"]
mod normalize;
#[path = "engine/request.rs"]
mod request;
#[path = "engine/turn.rs"]
mod turn;

pub use graphmaster::{Graphmaster, NodeId, THAT_SEPARATOR, TOPIC_SEPARATOR};
pub use interpreter::{process_node, process_template};
pub use loader::{Category, load_aiml_dir, load_aiml_file, load_aiml_str, parse_categories};
pub use metrics::{SentenceMetrics, TurnMetrics};
pub use normalize::{build_category_path, build_input_path, normalize_input, split_sentences};
pub use request::{ChatResult, Deadline, Request, RequestState, SubQuery};
pub(crate) use turn::{redirect, run_request};
