//! Node selection and text cleaning over parsed documents.
//!
//! Selection walks the descendants of a parent element (never the parent
//! itself) in document order and keeps those matching a [`NodeSelector`].

use crate::layout::{NodeSelector, Pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// All descendants of `parent` matching `selector`, in document order.
pub fn select_all<'a>(parent: ElementRef<'a>, selector: &NodeSelector) -> Vec<ElementRef<'a>> {
    parent
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|element| selector.matches(element.value()))
        .collect()
}

/// First descendant of `parent` matching `selector`.
pub fn select_first<'a>(parent: ElementRef<'a>, selector: &NodeSelector) -> Option<ElementRef<'a>> {
    parent
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| selector.matches(element.value()))
}

/// Concatenated text of every text node under `element`.
pub fn node_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Remove everything `pattern` matches. Nothing else is touched.
pub fn clean_text(text: &str, pattern: &Pattern) -> String {
    pattern.regex().replace_all(text, "").into_owned()
}

/// Cleaned text of every descendant matching `selector`.
pub fn extract_text(parent: ElementRef<'_>, selector: &NodeSelector, pattern: &Pattern) -> Vec<String> {
    select_all(parent, selector)
        .into_iter()
        .map(|element| clean_text(&node_text(element), pattern))
        .collect()
}

/// Keep ASCII letters and digits only: `"Jan. 5, 2021"` becomes `"Jan52021"`.
pub fn strip_non_alphanumeric(text: &str) -> String {
    NON_ALPHANUMERIC.replace_all(text, "").into_owned()
}

/// Text of the first child node of `element`, which may be a bare text node
/// or a nested element.
pub fn first_child_text(element: ElementRef<'_>) -> Option<String> {
    let child = element.children().next()?;
    match child.value() {
        Node::Text(text) => Some(String::from(&*text.text)),
        Node::Element(_) => ElementRef::wrap(child).map(node_text),
        _ => None,
    }
}

/// `href` of the first anchor under `element` that carries one.
pub fn first_anchor_href(element: ElementRef<'_>) -> Option<String> {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .find_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use scraper::Html;

    #[test]
    fn test_default_clean_pattern() {
        let layout = Layout::default();
        assert_eq!(
            clean_text("Hello, World! #42", &layout.clean_pattern),
            "Hello, World! 42"
        );
        assert_eq!(
            clean_text("  (Deep) learning -> 101?  ", &layout.clean_pattern),
            "  Deep learning  101?  "
        );
    }

    #[test]
    fn test_strip_non_alphanumeric() {
        assert_eq!(strip_non_alphanumeric("Jan. 5, 2021"), "Jan52021");
        assert_eq!(strip_non_alphanumeric("Issue #312"), "Issue312");
        assert_eq!(strip_non_alphanumeric("---"), "");
    }

    #[test]
    fn test_extract_text_in_document_order() {
        let doc = Html::parse_document(
            r#"<div class="item__summary">
                 <span class="item__summary">one</span>
                 <p><span class="item__summary">two</span></p>
                 <span class="other">skip</span>
               </div>"#,
        );
        let layout = Layout::default();
        let texts = extract_text(doc.root_element(), &layout.item_summary, &layout.clean_pattern);
        assert_eq!(texts, ["one", "two"]);
    }

    #[test]
    fn test_select_first_none_when_absent() {
        let doc = Html::parse_document("<p>nothing here</p>");
        assert!(select_first(doc.root_element(), &NodeSelector::tag("h1")).is_none());
    }

    #[test]
    fn test_first_child_text_variants() {
        let doc = Html::parse_document(
            r#"<h1>Issue #7<small>extra</small></h1><h2><em>Lead</em> tail</h2><h3></h3>"#,
        );
        let root = doc.root_element();
        let h1 = select_first(root, &NodeSelector::tag("h1")).unwrap();
        let h2 = select_first(root, &NodeSelector::tag("h2")).unwrap();
        let h3 = select_first(root, &NodeSelector::tag("h3")).unwrap();
        assert_eq!(first_child_text(h1).as_deref(), Some("Issue #7"));
        assert_eq!(first_child_text(h2).as_deref(), Some("Lead"));
        assert_eq!(first_child_text(h3), None);
    }

    #[test]
    fn test_first_anchor_href_skips_bare_anchors() {
        let doc = Html::parse_document(
            r#"<h3><a name="top">x</a><a href="http://x/1">Title</a></h3>"#,
        );
        let h3 = select_first(doc.root_element(), &NodeSelector::tag("h3")).unwrap();
        assert_eq!(first_anchor_href(h3).as_deref(), Some("http://x/1"));
    }
}
