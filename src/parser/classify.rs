use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

use super::dom::{
    child_elements, has_div_ancestor_with_class, has_suppressing_ancestor, raw_text,
    stripped_text, ExtractorConfig, NodeKind,
};
use super::normalize::normalize_code_block;
use crate::document::ContentBlock;

/// What a single node contributes to the page. Children are always visited
/// separately by the assembler, whatever the node produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emit {
    /// Level-1 heading text; the assembler decides whether it becomes the title.
    Title(String),
    Block(ContentBlock),
    /// One list item per non-empty direct `li` child.
    Items(Vec<ContentBlock>),
}

pub fn classify(node: NodeRef<'_, Node>, config: &ExtractorConfig) -> Option<Emit> {
    if has_suppressing_ancestor(node, config) {
        return None;
    }

    let kind = NodeKind::of(node, config);
    let el = ElementRef::wrap(node)?;

    match kind {
        NodeKind::Heading(1) => heading_text(el).map(Emit::Title),
        NodeKind::Heading(level) => {
            heading_text(el).map(|text| Emit::Block(ContentBlock::Heading { level, text }))
        }
        NodeKind::Paragraph => {
            non_empty(stripped_text(el, " ")).map(|text| Emit::Block(ContentBlock::Text { text }))
        }
        NodeKind::List => {
            let items: Vec<_> = child_elements(el, "li")
                .filter_map(|li| non_empty(stripped_text(li, " ")))
                .map(|text| ContentBlock::ListItem { text })
                .collect();
            (!items.is_empty()).then_some(Emit::Items(items))
        }
        NodeKind::TabbedContent => code_text(el)
            .map(|raw| Emit::Block(ContentBlock::Code { text: normalize_code_block(&raw) })),
        NodeKind::Highlight if !has_div_ancestor_with_class(node, &config.tabbed_class) => {
            code_text(el).map(|raw| {
                let text = if config.normalize_highlight {
                    normalize_code_block(&raw)
                } else {
                    raw
                };
                Emit::Block(ContentBlock::Code { text })
            })
        }
        _ => None,
    }
}

/// Heading text with its last character removed. MkDocs appends a permalink
/// glyph (`¶`) to every heading; headings without one lose a real character.
fn heading_text(el: ElementRef<'_>) -> Option<String> {
    let mut text = stripped_text(el, "");
    text.pop();
    non_empty(text)
}

fn code_text(el: ElementRef<'_>) -> Option<String> {
    let raw = raw_text(el);
    (!raw.trim().is_empty()).then_some(raw)
}

fn non_empty(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}
