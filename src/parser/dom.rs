//! Query helpers over `dom_query`.
//!
//! Every query returns a materialized `Vec` of element selections in document
//! order, so callers iterate instead of threading visitor callbacks.

pub use dom_query::{Document, NodeRef, Selection};

use super::text::normalize;

/// All elements matching `selector` under `root`, in document order.
pub fn select_all<'a>(root: &Selection<'a>, selector: &str) -> Vec<Selection<'a>> {
    materialize(&root.select(selector))
}

/// All elements of the document matching `selector`.
pub fn find_all<'a>(doc: &'a Document, selector: &str) -> Vec<Selection<'a>> {
    materialize(&doc.select(selector))
}

fn materialize<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    sel.nodes().iter().map(|node| Selection::from(*node)).collect()
}

/// Every element whose `id` attribute equals `id` exactly, in document order.
///
/// Compares attribute values instead of building a `#id` selector, so ids
/// containing dots or colons need no escaping. Pages do repeat ids.
pub fn elements_by_id<'a>(doc: &'a Document, id: &str) -> Vec<Selection<'a>> {
    find_all(doc, "[id]")
        .into_iter()
        .filter(|sel| sel.attr("id").is_some_and(|v| &*v == id))
        .collect()
}

/// First element whose `id` attribute equals `id`.
pub fn element_by_id<'a>(doc: &'a Document, id: &str) -> Option<Selection<'a>> {
    elements_by_id(doc, id).into_iter().next()
}

pub fn has_class(sel: &Selection, class: &str) -> bool {
    sel.attr("class")
        .is_some_and(|v| v.split_whitespace().any(|c| c == class))
}

/// Nearest ancestor of `sel` (not `sel` itself) carrying `class`.
pub fn closest_ancestor_with_class<'a>(sel: &Selection<'a>, class: &str) -> Option<Selection<'a>> {
    let node = sel.nodes().first()?;
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.is_element() {
            let candidate = Selection::from(parent);
            if has_class(&candidate, class) {
                return Some(candidate);
            }
        }
        current = parent.parent();
    }
    None
}

/// Whether both selections start at the same node.
pub fn same_node(a: &Selection, b: &Selection) -> bool {
    match (a.nodes().first(), b.nodes().first()) {
        (Some(x), Some(y)) => x.id == y.id,
        _ => false,
    }
}

/// Raw text of `sel`, leaving out every descendant element carrying `class`.
pub fn text_excluding_class(sel: &Selection, class: &str) -> String {
    let mut out = String::new();
    if let Some(node) = sel.nodes().first() {
        push_text_excluding(node, class, &mut out);
    }
    out
}

fn push_text_excluding(node: &NodeRef, class: &str, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            out.push_str(&child.text());
        } else if child.is_element() && !has_class(&Selection::from(child), class) {
            push_text_excluding(&child, class, out);
        }
    }
}

/// Raw text content of the element and its descendants.
pub fn text(sel: &Selection) -> String {
    sel.text().to_string()
}

/// Text content passed through the whitespace normalizer.
pub fn clean_text(sel: &Selection) -> String {
    normalize(&sel.text())
}

pub fn attr(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|v| v.to_string())
}

/// Element children of the first node in `sel`.
pub fn children<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    materialize(&sel.children())
}

/// The element that follows `sel` in document order among its siblings,
/// skipping text and comment nodes.
pub fn next_element<'a>(sel: &Selection<'a>) -> Option<Selection<'a>> {
    sel.nodes().first().and_then(|node| {
        let mut sibling = node.next_sibling();
        while let Some(s) = sibling {
            if s.is_element() {
                return Some(Selection::from(s));
            }
            sibling = s.next_sibling();
        }
        None
    })
}

/// Every element sharing a parent with `sel`, excluding `sel` itself.
pub fn element_siblings<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    let Some(node) = sel.nodes().first() else {
        return Vec::new();
    };

    sel.parent()
        .children()
        .nodes()
        .iter()
        .filter(|n| n.id != node.id)
        .map(|n| Selection::from(*n))
        .collect()
}
