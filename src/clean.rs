use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Node};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Whole-page visible text: script and style contents dropped, every text
/// node trimmed and joined by a single space.
pub fn clean_text(html: &str) -> String {
    let page = Html::parse_document(html);

    let parts: Vec<&str> = page
        .tree
        .root()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) if !inside_script_or_style(node) => Some(text.trim()),
            _ => None,
        })
        .filter(|t| !t.is_empty())
        .collect();

    WHITESPACE_RE.replace_all(&parts.join(" "), " ").into_owned()
}

fn inside_script_or_style(node: ego_tree::NodeRef<'_, Node>) -> bool {
    node.ancestors().any(|a| {
        a.value()
            .as_element()
            .is_some_and(|el| matches!(el.name(), "script" | "style"))
    })
}
