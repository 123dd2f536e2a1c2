//! Adapter between the `scraper` DOM and the classifier: every node is mapped
//! once to a [`NodeKind`], and ancestor checks go through [`find_ancestor`].

use ego_tree::NodeRef;
use scraper::node::Element;
use scraper::{ElementRef, Node};

/// Class and tag names describing the documentation theme being scraped.
/// Defaults match MkDocs-Material.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// CSS selector for the main content container.
    pub content_selector: String,
    /// A `div` carrying any of these classes is an admonition; nothing inside it is content.
    pub admonition_classes: Vec<String>,
    /// Class of the breadcrumb `nav` element.
    pub path_nav_class: String,
    pub tabbed_class: String,
    pub highlight_class: String,
    /// Run highlight blocks through the code normalizer as well as tabbed ones.
    pub normalize_highlight: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            content_selector: "div.md-content".to_string(),
            admonition_classes: ["admonition", "note", "info", "tip"]
                .into_iter()
                .map(String::from)
                .collect(),
            path_nav_class: "md-path".to_string(),
            tabbed_class: "tabbed-content".to_string(),
            highlight_class: "highlight".to_string(),
            normalize_highlight: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Heading(u8),
    Paragraph,
    List,
    TabbedContent,
    Highlight,
    /// Any other element, or a text/comment node.
    Other,
}

impl NodeKind {
    pub fn of(node: NodeRef<'_, Node>, config: &ExtractorConfig) -> Self {
        match node.value() {
            Node::Element(el) => Self::of_element(el, config),
            _ => NodeKind::Other,
        }
    }

    fn of_element(el: &Element, config: &ExtractorConfig) -> Self {
        let name = el.name();
        if let Some(level) = heading_level(name) {
            return NodeKind::Heading(level);
        }
        match name {
            "p" => return NodeKind::Paragraph,
            "ul" | "ol" => return NodeKind::List,
            _ => {}
        }
        // Tabbed takes precedence: a container carrying both classes is one code block.
        if has_class(el, &config.tabbed_class) {
            NodeKind::TabbedContent
        } else if has_class(el, &config.highlight_class) {
            NodeKind::Highlight
        } else {
            NodeKind::Other
        }
    }
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn has_class(el: &Element, class: &str) -> bool {
    el.classes().any(|c| c == class)
}

fn has_any_class(el: &Element, classes: &[String]) -> bool {
    el.classes().any(|c| classes.iter().any(|want| want == c))
}

/// Nearest proper ancestor of `node` for which `pred` holds.
pub fn find_ancestor<'a, F>(node: NodeRef<'a, Node>, pred: F) -> Option<NodeRef<'a, Node>>
where
    F: Fn(NodeRef<'a, Node>) -> bool,
{
    node.ancestors().find(|a| pred(*a))
}

/// Admonition `div` or breadcrumb `nav`. Independent of [`NodeKind`]: a node
/// can be a code container and still hide everything beneath it.
pub fn is_suppressing(node: NodeRef<'_, Node>, config: &ExtractorConfig) -> bool {
    match node.value() {
        Node::Element(el) => match el.name() {
            "div" => has_any_class(el, &config.admonition_classes),
            "nav" => has_class(el, &config.path_nav_class),
            _ => false,
        },
        _ => false,
    }
}

/// Inside an admonition or the breadcrumb nav. Only proper ancestors count.
pub fn has_suppressing_ancestor(node: NodeRef<'_, Node>, config: &ExtractorConfig) -> bool {
    find_ancestor(node, |a| is_suppressing(a, config)).is_some()
}

/// `div` ancestor carrying `class`; the highlight-inside-tab check only looks
/// at `div` containers.
pub fn has_div_ancestor_with_class(node: NodeRef<'_, Node>, class: &str) -> bool {
    find_ancestor(node, |a| match a.value() {
        Node::Element(el) => el.name() == "div" && has_class(el, class),
        _ => false,
    })
    .is_some()
}

/// Every descendant text node, each trimmed, empties dropped, joined by `sep`.
pub fn stripped_text(el: ElementRef<'_>, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Every descendant text node verbatim.
pub fn raw_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Direct element children named `name`.
pub fn child_elements<'a>(el: ElementRef<'a>, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |c| c.value().name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(html: &'a Html, sel: &str) -> ElementRef<'a> {
        html.select(&Selector::parse(sel).unwrap()).next().unwrap()
    }

    #[test]
    fn kinds() {
        let cfg = ExtractorConfig::default();
        let html = Html::parse_fragment(
            r#"<h3>x</h3><p>y</p><ol><li>z</li></ol>
               <div class="admonition note"></div><nav class="md-path"></nav>
               <div class="tabbed-content"></div><div class="highlight"></div><span>s</span>"#,
        );
        assert_eq!(NodeKind::of(*first(&html, "h3"), &cfg), NodeKind::Heading(3));
        assert_eq!(NodeKind::of(*first(&html, "p"), &cfg), NodeKind::Paragraph);
        assert_eq!(NodeKind::of(*first(&html, "ol"), &cfg), NodeKind::List);
        assert_eq!(NodeKind::of(*first(&html, "div.note"), &cfg), NodeKind::Other);
        assert!(is_suppressing(*first(&html, "div.note"), &cfg));
        assert!(is_suppressing(*first(&html, "nav"), &cfg));
        assert!(!is_suppressing(*first(&html, ".highlight"), &cfg));
        assert_eq!(NodeKind::of(*first(&html, ".tabbed-content"), &cfg), NodeKind::TabbedContent);
        assert_eq!(NodeKind::of(*first(&html, ".highlight"), &cfg), NodeKind::Highlight);
        assert_eq!(NodeKind::of(*first(&html, "span"), &cfg), NodeKind::Other);
    }

    #[test]
    fn admonition_class_needs_div() {
        let cfg = ExtractorConfig::default();
        let html = Html::parse_fragment(r#"<section class="note"><p>x</p></section>"#);
        assert_eq!(NodeKind::of(*first(&html, "section"), &cfg), NodeKind::Other);
        assert!(!has_suppressing_ancestor(*first(&html, "p"), &cfg));
    }

    #[test]
    fn ancestor_search_skips_self() {
        let cfg = ExtractorConfig::default();
        let html = Html::parse_fragment(r#"<div class="tip"><div class="tip" id="inner"></div></div><div class="tip" id="alone"></div>"#);
        assert!(has_suppressing_ancestor(*first(&html, "#inner"), &cfg));
        assert!(!has_suppressing_ancestor(*first(&html, "#alone"), &cfg));
    }

    #[test]
    fn admonition_class_does_not_change_own_kind() {
        let cfg = ExtractorConfig::default();
        let html = Html::parse_fragment(r#"<div class="highlight note"><pre>x</pre></div>"#);
        let div = *first(&html, "div");
        assert_eq!(NodeKind::of(div, &cfg), NodeKind::Highlight);
        assert!(!has_suppressing_ancestor(div, &cfg));
        assert!(has_suppressing_ancestor(*first(&html, "pre"), &cfg));
    }

    #[test]
    fn text_helpers() {
        let html = Html::parse_fragment("<p>  Hello <b> big </b>\n world  </p>");
        let p = first(&html, "p");
        assert_eq!(stripped_text(p, " "), "Hello big world");
        assert_eq!(stripped_text(p, ""), "Hellobigworld");
        assert_eq!(raw_text(p), "  Hello  big \n world  ");
    }

    #[test]
    fn direct_children_only() {
        let html = Html::parse_fragment("<ul><li>a<ul><li>inner</li></ul></li><li>b</li></ul>");
        let ul = first(&html, "ul");
        let items: Vec<_> = child_elements(ul, "li").map(|li| stripped_text(li, " ")).collect();
        assert_eq!(items, vec!["a inner", "b"]);
    }
}
