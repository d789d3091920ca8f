//! Input normalization and token-path building.
//!
//! Raw user input goes through three steps before it reaches the Graphmaster:
//!
//! ```text
//! "What's your name? I'm Ada."
//!   │ split_sentences (configured splitters)
//!   ├─ "What's your name"
//!   └─ "I'm Ada"
//!        │ normalize_input: substitutions, strip punctuation, collapse spaces
//!        ▼
//!      "I am Ada"
//!        │ build_input_path (+ last bot sentence, + topic)
//!        ▼
//!      "I am Ada <THAT> WHAT IS YOUR NAME <TOPIC> *"
//! ```
//!
//! Case is preserved on the input side: matching is case-insensitive, and
//! keeping the user's casing lets wildcard captures echo it back.

use super::graphmaster::{THAT_SEPARATOR, TOPIC_SEPARATOR};
use crate::text::{collapse_whitespace, SubstitutionList};

/// Split raw input into trimmed, non-empty sentences.
pub fn split_sentences(raw: &str, splitters: &str) -> Vec<String> {
    raw.split(|c: char| splitters.contains(c)).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Apply the `normal` substitutions, replace everything that is not a letter,
/// digit or whitespace by a space and collapse whitespace.
pub fn normalize_input(text: &str, substitutions: &SubstitutionList) -> String {
    let substituted = substitutions.apply(text);
    let stripped = crate::regex!(r"[^\p{L}\p{N}\s]").replace_all(&substituted, " ");
    collapse_whitespace(&stripped)
}

fn or_wildcard(part: String) -> String {
    if part.is_empty() { "*".to_string() } else { part }
}

/// Token path for one user sentence.
///
/// `that` is the bot's previous sentence and `topic` the user's current topic;
/// both are normalized like the input, and an empty part becomes `*`.
pub fn build_input_path(input: &str, that: &str, topic: &str, substitutions: &SubstitutionList) -> String {
    let input = or_wildcard(normalize_input(input, substitutions));
    let that = or_wildcard(normalize_input(that, substitutions));
    let topic = or_wildcard(normalize_input(topic, &SubstitutionList::default()));
    format!("{input} {THAT_SEPARATOR} {that} {TOPIC_SEPARATOR} {topic}")
}

/// Normalize one pattern part: runs of words go through [`normalize_input`]
/// and are upper-cased, `*` and `_` tokens are kept as they are.
fn normalize_pattern(part: &str, substitutions: &SubstitutionList) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    let spaced = part.replace('*', " * ").replace('_', " _ ");
    for word in spaced.split_whitespace().chain(std::iter::once("")) {
        let is_wildcard = word == "*" || word == "_";
        if !is_wildcard && !word.is_empty() {
            run.push(word);
            continue;
        }
        if !run.is_empty() {
            let normalized = normalize_input(&run.join(" "), substitutions).to_uppercase();
            tokens.extend(normalized.split_whitespace().map(str::to_string));
            run.clear();
        }
        if is_wildcard {
            tokens.push(word.to_string());
        }
    }
    tokens.join(" ")
}

/// Token path under which a category is stored.
///
/// Pattern and that are normalized like the input side, topic like the
/// user's topic; wildcards survive, and an empty part becomes `*`.
pub fn build_category_path(pattern: &str, that: &str, topic: &str, substitutions: &SubstitutionList) -> String {
    let pattern = or_wildcard(normalize_pattern(pattern, substitutions));
    let that = or_wildcard(normalize_pattern(that, substitutions));
    let topic = or_wildcard(normalize_pattern(topic, &SubstitutionList::default()));
    format!("{pattern} {THAT_SEPARATOR} {that} {TOPIC_SEPARATOR} {topic}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Substitutions;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_configured_splitters() {
        assert_eq!(split_sentences("Hi there! How are you?  Fine.", ".!?"), vec!["Hi there", "How are you", "Fine"]);
        assert_eq!(split_sentences("...", ".!?"), Vec::<String>::new());
        assert_eq!(split_sentences("a;b", ".!?"), vec!["a;b"]);
    }

    #[test]
    fn normalizes_contractions_and_punctuation() {
        let subs = Substitutions::default();
        assert_eq!(normalize_input("What's up, Ada-Lovelace?", &subs.normal), "what is up Ada Lovelace");
        assert_eq!(normalize_input("  my   name is Ada ", &subs.normal), "my name is Ada");
        assert_eq!(normalize_input("* _ !", &subs.normal), "");
    }

    #[test]
    fn builds_input_paths() {
        let subs = Substitutions::default();
        assert_eq!(build_input_path("my name is Ada", "", "*", &subs.normal), "my name is Ada <THAT> * <TOPIC> *");
        assert_eq!(
            build_input_path("yes", "Do you like cats?", "pets", &subs.normal),
            "yes <THAT> Do you like cats <TOPIC> pets"
        );
    }

    #[test]
    fn builds_category_paths() {
        let subs = Substitutions::default();
        assert_eq!(build_category_path("my name is *", "", "", &subs.normal), "MY NAME IS * <THAT> * <TOPIC> *");
        assert_eq!(
            build_category_path(" yes ", "do you like  cats", "pets", &subs.normal),
            "YES <THAT> DO YOU LIKE CATS <TOPIC> PETS"
        );
    }

    #[test]
    fn category_paths_are_normalized_like_input() {
        let subs = Substitutions::default();
        assert_eq!(
            build_category_path("What's up, _?", "Do you like cats?", "*", &subs.normal),
            "WHAT IS UP _ <THAT> DO YOU LIKE CATS <TOPIC> *"
        );
        assert_eq!(build_category_path("* ... *", "", "pets!", &subs.normal), "* * <THAT> * <TOPIC> PETS");

        let input = build_input_path("what's up, Ada", "Do you like cats?", "*", &subs.normal);
        assert_eq!(input.to_uppercase(), "WHAT IS UP ADA <THAT> DO YOU LIKE CATS <TOPIC> *");
    }
}
