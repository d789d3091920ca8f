//! Text utilities shared by the path builder and the tag handlers.
//!
//! The central piece is [`SubstitutionList`]: an ordered list of literal
//! `(pattern, replacement)` pairs applied *once* over a text. Each pattern is
//! matched case-insensitively on word boundaries, and text produced by an
//! earlier replacement is locked so later pairs never rewrite it:
//!
//! ```text
//! person2 = [("i", "you"), ("you", "me")]
//! "I love you" ──("i"→"you")──▶ [you*] love you ──("you"→"me")──▶ [you*] love [me*]
//!                                                   (* = locked)
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Ordered, compiled substitution pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct SubstitutionList {
    pairs: Vec<(String, String)>,
    compiled: Vec<(Regex, String)>,
}

impl SubstitutionList {
    pub fn new<P, R>(pairs: impl IntoIterator<Item = (P, R)>) -> Self
    where
        P: Into<String>,
        R: Into<String>,
    {
        let pairs: Vec<(String, String)> = pairs.into_iter().map(|(p, r)| (p.into(), r.into())).collect();
        let compiled = pairs
            .iter()
            .filter_map(|(pattern, replacement)| {
                let trimmed = pattern.trim();
                if trimmed.is_empty() {
                    log::warn!("ignoring empty substitution pattern (replacement \"{replacement}\")");
                    return None;
                }
                let escaped = regex::escape(trimmed).replace(' ', "\\s+");
                // `\b` only makes sense next to a word character.
                let lead = if trimmed.starts_with(|c: char| c.is_alphanumeric() || c == '_') { "\\b" } else { "" };
                let tail = if trimmed.ends_with(|c: char| c.is_alphanumeric() || c == '_') { "\\b" } else { "" };
                match Regex::new(&format!("(?i){lead}{escaped}{tail}")) {
                    Ok(re) => Some((re, replacement.trim().to_string())),
                    Err(err) => {
                        log::warn!("ignoring substitution pattern \"{pattern}\": {err}");
                        None
                    }
                }
            })
            .collect();
        SubstitutionList { pairs, compiled }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Apply every pair once, in order.
    pub fn apply(&self, input: &str) -> String {
        let mut segments: Vec<(String, bool)> = vec![(input.to_string(), false)];

        for (re, replacement) in &self.compiled {
            let mut next = Vec::with_capacity(segments.len());
            for (text, locked) in segments {
                if locked || !re.is_match(&text) {
                    next.push((text, locked));
                    continue;
                }
                let mut last = 0;
                for m in re.find_iter(&text) {
                    if m.start() > last {
                        next.push((text[last..m.start()].to_string(), false));
                    }
                    next.push((replacement.clone(), true));
                    last = m.end();
                }
                if last < text.len() {
                    next.push((text[last..].to_string(), false));
                }
            }
            segments = next;
        }

        segments.into_iter().map(|(text, _)| text).collect()
    }
}

impl From<Vec<(String, String)>> for SubstitutionList {
    fn from(pairs: Vec<(String, String)>) -> Self {
        SubstitutionList::new(pairs)
    }
}

impl From<SubstitutionList> for Vec<(String, String)> {
    fn from(list: SubstitutionList) -> Self {
        list.pairs
    }
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-case the first letter of every word and lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Upper-case the first letter after the start and after every sentence
/// splitter, lower-case every other letter.
pub fn sentence_case(s: &str, splitters: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize = true;
    for c in s.trim().chars() {
        if splitters.contains(c) {
            capitalize = true;
            out.push(c);
        } else if c.is_alphabetic() {
            if capitalize {
                out.extend(c.to_uppercase());
                capitalize = false;
            } else {
                out.extend(c.to_lowercase());
            }
        } else {
            out.push(c);
        }
    }
    out
}
