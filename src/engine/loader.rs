//! AIML document loading.
//!
//! ```text
//! <aiml>
//!   <category>                       topic "*"
//!     <pattern>HI</pattern>
//!     <template>Hello!</template>
//!   </category>
//!   <topic name="PETS">
//!     <category>                     topic "PETS"
//!       <pattern>*</pattern>
//!       <that>DO YOU LIKE CATS</that>
//!       <template>...</template>
//!     </category>
//!   </topic>
//! </aiml>
//! ```
//!
//! Pattern, that and topic contribute their text; the template is stored as
//! markup and parsed again on every evaluation. A category without pattern or
//! template is skipped with a warning; a document that does not parse fails
//! as a whole and loads nothing.

use super::graphmaster::Graphmaster;
use super::normalize::build_category_path;
use crate::error::{AimlError, Result};
use crate::markup::{parse_fragment, Content, Element};
use crate::text::SubstitutionList;
use std::path::Path;

/// A category extracted from a document, before insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub pattern: String,
    pub that: String,
    pub topic: String,
    pub template: String,
}

impl Category {
    /// Trie path of this category; `normal` is the bot's input substitution
    /// list, so the path matches inputs normalized with the same list.
    pub fn path(&self, normal: &SubstitutionList) -> String {
        build_category_path(&self.pattern, &self.that, &self.topic, normal)
    }
}

fn child<'e>(element: &'e Element, name: &str) -> Option<&'e Element> {
    element.child_elements().find(|e| e.name.eq_ignore_ascii_case(name))
}

fn read_category(element: &Element, topic: &str, source: &str) -> Option<Category> {
    let pattern = child(element, "pattern").map(Element::inner_text);
    let template = child(element, "template").map(Element::inner_markup);
    let (Some(pattern), Some(template)) = (pattern, template) else {
        log::warn!("{source}: skipping category without pattern or template");
        return None;
    };
    let that = child(element, "that").map(Element::inner_text).unwrap_or_default();
    Some(Category { pattern, that, topic: topic.to_string(), template })
}

/// Extract every category of an AIML document, in document order.
pub fn parse_categories(document: &str, source: &str) -> Result<Vec<Category>> {
    let nodes = parse_fragment(document)?;
    let root = nodes
        .iter()
        .find_map(|c| match c {
            Content::Element(e) if e.name.eq_ignore_ascii_case("aiml") => Some(e),
            _ => None,
        })
        .ok_or_else(|| AimlError::InvalidCategory(format!("{source}: no <aiml> root element")))?;

    let mut categories = Vec::new();
    for element in root.child_elements() {
        if element.name.eq_ignore_ascii_case("category") {
            categories.extend(read_category(element, "*", source));
        } else if element.name.eq_ignore_ascii_case("topic") {
            let topic = element.attribute("name").unwrap_or("*");
            for category in element.child_elements().filter(|e| e.name.eq_ignore_ascii_case("category")) {
                categories.extend(read_category(category, topic, source));
            }
        } else {
            log::debug!("{source}: ignoring <{}>", element.name);
        }
    }
    Ok(categories)
}

/// Load an AIML document into `graphmaster`. Returns the number of
/// categories inserted.
pub fn load_aiml_str(
    graphmaster: &mut Graphmaster,
    document: &str,
    source: &str,
    normal: &SubstitutionList,
) -> Result<usize> {
    let categories = parse_categories(document, source)?;
    let mut inserted = 0;
    for category in &categories {
        match graphmaster.insert(&category.path(normal), &category.template, source) {
            Ok(()) => inserted += 1,
            Err(err) => log::warn!("{source}: {err}"),
        }
    }
    log::info!("{source}: loaded {inserted} categories");
    Ok(inserted)
}

pub fn load_aiml_file(graphmaster: &mut Graphmaster, path: impl AsRef<Path>, normal: &SubstitutionList) -> Result<usize> {
    let path = path.as_ref();
    let document = std::fs::read_to_string(path)?;
    load_aiml_str(graphmaster, &document, &path.display().to_string(), normal)
}

/// Load every `*.aiml` file of a directory, in file-name order.
pub fn load_aiml_dir(graphmaster: &mut Graphmaster, dir: impl AsRef<Path>, normal: &SubstitutionList) -> Result<usize> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let is_aiml = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("aiml"));
        if path.is_file() && is_aiml {
            files.push(path);
        }
    }
    files.sort();

    let mut total = 0;
    for file in files {
        total += load_aiml_file(graphmaster, &file, normal)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Substitutions;
    use crate::engine::build_input_path;
    use pretty_assertions::assert_eq;
    use std::fs;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<aiml version="1.0.1">
  <!-- greetings -->
  <category>
    <pattern>HELLO</pattern>
    <template>Hi <get name="name"/>!</template>
  </category>
  <topic name="pets">
    <category>
      <pattern>*</pattern>
      <that>do you like cats</that>
      <template>Cats it is.</template>
    </category>
  </topic>
  <category>
    <pattern>BROKEN</pattern>
  </category>
</aiml>"#;

    #[test]
    fn extracts_categories_with_topic_and_that() {
        let normal = Substitutions::default().normal;
        let categories = parse_categories(DOC, "doc").unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].path(&normal), "HELLO <THAT> * <TOPIC> *");
        assert_eq!(categories[0].template, r#"Hi <get name="name"/>!"#);
        assert_eq!(categories[1].path(&normal), "* <THAT> DO YOU LIKE CATS <TOPIC> PETS");
    }

    #[test]
    fn rejects_documents_without_root() {
        assert!(matches!(parse_categories("<category/>", "doc"), Err(AimlError::InvalidCategory(_))));
        assert!(matches!(parse_categories("<aiml><category>", "doc"), Err(AimlError::Markup { .. })));
    }

    #[test]
    fn loads_directories_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.aiml"), "<aiml><category><pattern>X</pattern><template>b</template></category></aiml>")
            .unwrap();
        fs::write(dir.path().join("a.aiml"), "<aiml><category><pattern>X</pattern><template>a</template></category></aiml>")
            .unwrap();
        fs::write(dir.path().join("notes.txt"), "not aiml").unwrap();

        let mut graphmaster = Graphmaster::new();
        assert_eq!(load_aiml_dir(&mut graphmaster, dir.path(), &SubstitutionList::default()).unwrap(), 2);
        assert_eq!(graphmaster.size(), 1);
        assert_eq!(graphmaster.evaluate("x <THAT> * <TOPIC> *").template, "b");
    }

    #[test]
    fn punctuated_patterns_match_normalized_input() {
        let doc = r#"<aiml>
  <category><pattern>YES</pattern><that>Do you like cats?</that><template>Me too</template></category>
  <category><pattern>What's up</pattern><template>Not much</template></category>
</aiml>"#;
        let normal = Substitutions::default().normal;
        let mut graphmaster = Graphmaster::new();
        assert_eq!(load_aiml_str(&mut graphmaster, doc, "doc", &normal).unwrap(), 2);

        let yes = build_input_path("yes", "Do you like cats?", "*", &normal);
        assert_eq!(graphmaster.evaluate(&yes).template, "Me too");
        let whats_up = build_input_path("what's up", "", "*", &normal);
        assert_eq!(graphmaster.evaluate(&whats_up).template, "Not much");
    }
}
