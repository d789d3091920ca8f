//! The Graphmaster: a word trie over concatenated input/that/topic paths.
//!
//! Every category is stored as one token path:
//!
//! ```text
//! MY NAME IS * <THAT> * <TOPIC> *
//! └── input ─┘        └that┘     └topic┘
//! ```
//!
//! Nodes live in an arena (`Vec<Node>`, addressed by [`NodeId`]). Each node
//! keeps a word map for literal children and two dedicated slots for the `_`
//! and `*` wildcards, so there is at most one of each per node.
//!
//! ## Matching
//!
//! [`Graphmaster::evaluate`] is a depth-first backtracking search. At every
//! node the children are tried in a fixed priority order:
//!
//! ```text
//! (1) exact word   ──fail──▶ (2) "_" wildcard ──fail──▶ (3) "*" wildcard
//! ```
//!
//! A wildcard binds one token first and grows its binding token by token when
//! the remainder fails to match (shortest first). Separators (`<THAT>`,
//! `<TOPIC>`) only ever match exactly, so a wildcard never spans two
//! dimensions. A match must consume the whole path and end on a node carrying
//! a template; anything less is a failure with an empty [`SubQuery`].
//!
//! Captured text is pushed onto the star list of the dimension being matched
//! and popped again when the branch backtracks, so a successful search leaves
//! exactly the bindings of the winning branch, left to right.
//!
//! ## Complexity
//!
//! Worst case is exponential in the number of wildcards along a path. The
//! search polls the request deadline at every step, which bounds pathological
//! grammars in wall-clock time.

use super::request::{Request, SubQuery};
use crate::error::{AimlError, Result};
use crate::MatchState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};

/// Separator between the input and "that" dimensions of a path.
pub const THAT_SEPARATOR: &str = "<THAT>";
/// Separator between the "that" and topic dimensions of a path.
pub const TOPIC_SEPARATOR: &str = "<TOPIC>";

const SNAPSHOT_FORMAT: &str = "graphmaster";
const SNAPSHOT_VERSION: u32 = 1;

/// Index of a node in the arena.
pub type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Node {
    word: String,
    children: HashMap<String, NodeId>,
    underscore: Option<NodeId>,
    star: Option<NodeId>,
    template: Option<String>,
    source: Option<String>,
}

/// Category store and matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graphmaster {
    nodes: Vec<Node>,
    size: usize,
}

impl Default for Graphmaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Trie key of a path token: separators are canonicalized, words upper-cased.
fn token_key(token: &str) -> String {
    if token.eq_ignore_ascii_case(THAT_SEPARATOR) {
        THAT_SEPARATOR.to_string()
    } else if token.eq_ignore_ascii_case(TOPIC_SEPARATOR) {
        TOPIC_SEPARATOR.to_string()
    } else {
        token.to_uppercase()
    }
}

fn is_separator(key: &str) -> bool {
    key == THAT_SEPARATOR || key == TOPIC_SEPARATOR
}

impl Graphmaster {
    pub fn new() -> Self {
        Graphmaster { nodes: vec![Node::default()], size: 0 }
    }

    /// Number of distinct categories.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of trie nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a category. Re-inserting an existing path replaces its template.
    pub fn insert(&mut self, path: &str, template: &str, source: &str) -> Result<()> {
        let keys: Vec<String> = path.split_whitespace().map(token_key).collect();
        if keys.is_empty() {
            log::warn!("rejected category with an empty path from {source}");
            return Err(AimlError::EmptyPath);
        }

        let mut node = ROOT;
        for key in keys {
            node = self.child_or_insert(node, key);
        }

        if self.nodes[node].template.is_some() {
            let previous = self.nodes[node].source.as_deref().unwrap_or("?");
            log::debug!("category \"{path}\" from {source} overwrites the one from {previous}");
        } else {
            self.size += 1;
        }
        let terminal = &mut self.nodes[node];
        terminal.template = Some(template.to_string());
        terminal.source = Some(source.to_string());
        Ok(())
    }

    fn child_or_insert(&mut self, parent: NodeId, key: String) -> NodeId {
        let existing = match key.as_str() {
            "_" => self.nodes[parent].underscore,
            "*" => self.nodes[parent].star,
            word => self.nodes[parent].children.get(word).copied(),
        };
        if let Some(id) = existing {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(Node { word: key.clone(), ..Node::default() });
        let slot = &mut self.nodes[parent];
        match key.as_str() {
            "_" => slot.underscore = Some(id),
            "*" => slot.star = Some(id),
            _ => {
                slot.children.insert(key, id);
            }
        }
        id
    }

    /// Match `path` without a deadline.
    pub fn evaluate(&self, path: &str) -> SubQuery {
        self.run_search(path, || false)
    }

    /// Match `path`, polling the request deadline at every search step.
    ///
    /// On timeout the request is marked timed out and an empty [`SubQuery`]
    /// is returned.
    pub fn evaluate_within(&self, path: &str, request: &mut Request) -> SubQuery {
        if request.check_deadline() {
            return SubQuery { path: path.to_string(), ..SubQuery::default() };
        }
        self.run_search(path, || request.check_deadline())
    }

    fn run_search(&self, path: &str, poll: impl FnMut() -> bool) -> SubQuery {
        let tokens: Vec<&str> = path.split_whitespace().collect();
        let keys: Vec<String> = tokens.iter().map(|t| token_key(t)).collect();
        let mut search = Search {
            graph: self,
            tokens: &tokens,
            keys: &keys,
            query: SubQuery::default(),
            trail: Vec::new(),
            poll,
            aborted: false,
        };

        let hit = if tokens.is_empty() { None } else { search.step(ROOT, 0, MatchState::Input) };
        let Some(node) = hit else {
            log::trace!("no category matches \"{path}\"");
            return SubQuery { path: path.to_string(), ..SubQuery::default() };
        };

        let mut query = search.query;
        let terminal = &self.nodes[node];
        query.path = path.to_string();
        query.template = terminal.template.clone().unwrap_or_default();
        query.source = terminal.source.clone();
        query.pattern = search.trail.iter().map(|&id| self.nodes[id].word.as_str()).collect::<Vec<_>>().join(" ");
        query.input_text =
            tokens.iter().take_while(|t| token_key(t) != THAT_SEPARATOR).copied().collect::<Vec<_>>().join(" ");
        log::trace!("\"{path}\" matched \"{}\"", query.pattern);
        query
    }

    /// Write the whole trie as a versioned JSON snapshot.
    pub fn save_snapshot<W: Write>(&self, writer: W) -> Result<()> {
        let snapshot = SnapshotRef { format: SNAPSHOT_FORMAT, version: SNAPSHOT_VERSION, graph: self };
        serde_json::to_writer(writer, &snapshot)?;
        Ok(())
    }

    /// Read a snapshot written by [`save_snapshot`](Self::save_snapshot).
    pub fn load_snapshot<R: Read>(reader: R) -> Result<Self> {
        let snapshot: SnapshotOwned = serde_json::from_reader(reader)?;
        if snapshot.format != SNAPSHOT_FORMAT || snapshot.version != SNAPSHOT_VERSION {
            return Err(AimlError::Snapshot(format!(
                "unsupported snapshot {} v{} (expected {SNAPSHOT_FORMAT} v{SNAPSHOT_VERSION})",
                snapshot.format, snapshot.version
            )));
        }
        snapshot.graph.validate()?;
        Ok(snapshot.graph)
    }

    fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(AimlError::Snapshot("snapshot has no root node".to_string()));
        }
        let len = self.nodes.len();
        let dangling = self.nodes.iter().any(|n| {
            n.children.values().any(|&id| id >= len)
                || n.underscore.is_some_and(|id| id >= len)
                || n.star.is_some_and(|id| id >= len)
        });
        if dangling {
            return Err(AimlError::Snapshot("snapshot references a missing node".to_string()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format: &'a str,
    version: u32,
    graph: &'a Graphmaster,
}

#[derive(Deserialize)]
struct SnapshotOwned {
    format: String,
    version: u32,
    graph: Graphmaster,
}

/// State of one depth-first search.
struct Search<'a, F> {
    graph: &'a Graphmaster,
    /// Path tokens as written (captures keep their casing).
    tokens: &'a [&'a str],
    /// Upper-cased keys, aligned with `tokens`.
    keys: &'a [String],
    query: SubQuery,
    /// Nodes walked by the current branch.
    trail: Vec<NodeId>,
    poll: F,
    aborted: bool,
}

impl<F: FnMut() -> bool> Search<'_, F> {
    fn step(&mut self, node: NodeId, pos: usize, state: MatchState) -> Option<NodeId> {
        if self.aborted || (self.poll)() {
            self.aborted = true;
            return None;
        }

        let graph = self.graph;
        let keys = self.keys;
        let current = &graph.nodes[node];

        if pos == keys.len() {
            return current.template.as_ref().map(|_| node);
        }
        let key = keys[pos].as_str();

        // (1) exact word (separators included)
        if let Some(&child) = current.children.get(key) {
            let next_state = match key {
                THAT_SEPARATOR => MatchState::That,
                TOPIC_SEPARATOR => MatchState::Topic,
                _ => state,
            };
            self.trail.push(child);
            if let Some(hit) = self.step(child, pos + 1, next_state) {
                return Some(hit);
            }
            self.trail.pop();
        }

        if is_separator(key) {
            return None;
        }

        // A wildcard may consume tokens up to, not including, the next separator.
        let boundary = keys[pos..].iter().position(|k| is_separator(k)).map(|i| pos + i).unwrap_or(keys.len());

        // (2) "_" then (3) "*"
        for child in [current.underscore, current.star].into_iter().flatten() {
            self.trail.push(child);
            for end in pos + 1..=boundary {
                self.query.stars_mut(state).push(self.tokens[pos..end].join(" "));
                if let Some(hit) = self.step(child, end, state) {
                    return Some(hit);
                }
                self.query.stars_mut(state).pop();
                if self.aborted {
                    return None;
                }
            }
            self.trail.pop();
        }

        None
    }
}
