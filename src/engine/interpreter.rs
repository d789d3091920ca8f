//! Template interpreter.
//!
//! A template is a tree of text and elements. Interpretation is a walk that
//! dispatches each element to the handler registered under its name:
//!
//! ```text
//! <template>Hello <uppercase><star/></uppercase>!</template>
//!      │
//!      ├─ "Hello "                     text: copied
//!      ├─ <uppercase>  (recursive)
//!      │     └─ <star/> ─▶ "ada"       children first, then set_text("ada")
//!      │   uppercase("ada") ─▶ "ADA"
//!      └─ "!"
//!                                       ─▶ "Hello ADA!"
//! ```
//!
//! Non-recursive handlers (`condition`, `random`) return markup instead of
//! text; it is parsed as a fragment and interpreted like template content.
//! Unknown elements degrade to their plain inner text.
//!
//! The request deadline is polled at every element; once it has passed, every
//! further element yields the empty string.

use crate::error::Result;
use crate::markup::{parse_fragment, Content, Element};
use crate::tags::{TagContext, TagFlags};

/// Interpret a whole template given as markup.
pub fn process_template(template: &str, ctx: &mut TagContext<'_>) -> Result<String> {
    let root = Element::from_markup("template", template)?;
    process_node(&root, ctx)
}

/// Interpret one element.
pub fn process_node(node: &Element, ctx: &mut TagContext<'_>) -> Result<String> {
    if ctx.request.check_deadline() {
        return Ok(String::new());
    }
    ctx.metrics.nodes_visited += 1;

    let name = node.name.to_lowercase();
    if name == "template" {
        return process_children(&node.children, ctx);
    }

    let bot = ctx.bot;
    let Some(handler) = bot.tags().get(&name) else {
        log::debug!("unknown tag <{name}>, using its text");
        return Ok(node.inner_text());
    };
    log::trace!("<{name}> flags={:?} depth={}", handler.flags, ctx.request.depth());

    if handler.flags.contains(TagFlags::RECURSIVE) {
        let mut evaluated = node.clone();
        for child in evaluated.children.iter_mut() {
            if let Content::Element(element) = child {
                let text = process_node(element, ctx)?;
                element.set_text(text);
            }
        }
        (handler.eval)(&evaluated, ctx)
    } else {
        let generated = (handler.eval)(node, ctx)?;
        let fragment = parse_fragment(&generated)?;
        process_children(&fragment, ctx)
    }
}

fn process_children(children: &[Content], ctx: &mut TagContext<'_>) -> Result<String> {
    let mut out = String::new();
    for child in children {
        match child {
            Content::Text(text) => out.push_str(text),
            Content::Element(element) => out.push_str(&process_node(element, ctx)?),
        }
    }
    Ok(out)
}
