//! Mapping from the attributed tree onto the typed document models.
//!
//! Mappers only fail on structural problems (missing root, conflicting
//! discriminants, duplicated single-occurrence containers). Everything else
//! is carried into the model, invalid values included, for the validators.

pub mod vast;
pub mod vmap;

use crate::models::Content;
use crate::tree::Node;

/// Keep `node` as an opaque fragment when it carries markup besides the
/// `ignored` attributes, otherwise collapse it to its text.
pub(crate) fn text_or_fragment(node: &Node, ignored: &[&str]) -> Option<Content> {
    if node.has_markup(ignored) {
        Some(Content::Fragment(node.clone()))
    } else {
        node.text().map(|text| Content::Text(text.to_string()))
    }
}
