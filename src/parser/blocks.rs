use super::dom::{self, Document, Selection};
use super::fields::REQUIRED_LABEL;
use crate::error::ExtractError;

const BLOCK_CLASS: &str = "variablelist";
const BLOCK_SELECTOR: &str = ".variablelist";
const TERM_SELECTOR: &str = "dt";
const BODY_SELECTOR: &str = "dd";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Property,
    Attribute,
}

/// Property lists always carry a "Required:" marker somewhere in their text;
/// return-value lists never do.
pub fn classify(block_text: &str) -> BlockKind {
    if block_text.contains(REQUIRED_LABEL) {
        BlockKind::Property
    } else {
        BlockKind::Attribute
    }
}

/// One term paired with its description body.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Normalized term text.
    pub term: String,
    /// Raw body text, left for the caller to parse or normalize.
    pub body: String,
}

pub struct DefinitionBlock<'a> {
    pub kind: BlockKind,
    pub node: Selection<'a>,
}

/// Every definition-list block on the page, classified, in document order.
///
/// A block nested inside another block's description is a block of its own;
/// its text does not count towards the enclosing block's classification.
pub fn collect_blocks(doc: &Document) -> Vec<DefinitionBlock<'_>> {
    dom::find_all(doc, BLOCK_SELECTOR)
        .into_iter()
        .map(|node| DefinitionBlock {
            kind: classify(&dom::text_excluding_class(&node, BLOCK_CLASS)),
            node,
        })
        .collect()
}

/// Descendants of `block` matching `selector` that no nested block owns.
fn own_items<'a>(block: &Selection<'a>, selector: &str) -> Vec<Selection<'a>> {
    dom::select_all(block, selector)
        .into_iter()
        .filter(|item| {
            dom::closest_ancestor_with_class(item, BLOCK_CLASS)
                .is_some_and(|owner| dom::same_node(&owner, block))
        })
        .collect()
}

/// Pair the i-th term with the i-th body.
///
/// Uneven counts would shift every later description onto the wrong name, so
/// they are rejected with `MalformedBlock`. `position` and `resource` only
/// label the error.
pub fn pair_entries(
    block: &Selection,
    position: usize,
    resource: &str,
) -> Result<Vec<Entry>, ExtractError> {
    let terms = own_items(block, TERM_SELECTOR);
    let bodies = own_items(block, BODY_SELECTOR);

    if terms.len() != bodies.len() {
        return Err(ExtractError::MalformedBlock {
            resource: resource.to_string(),
            block: position,
            terms: terms.len(),
            bodies: bodies.len(),
        });
    }

    Ok(terms
        .iter()
        .zip(&bodies)
        .map(|(term, body)| Entry {
            term: dom::clean_text(term),
            body: dom::text_excluding_class(body, BLOCK_CLASS),
        })
        .collect())
}
