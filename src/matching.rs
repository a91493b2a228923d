use crate::{dom::Dom, id_index::IdIndex};

/// Same node kind and, for elements, same tag name.
pub(crate) fn same_type<D: Dom>(dom: &D, a: &D::Node, b: &D::Node) -> bool {
	dom.kind(a) == dom.kind(b) && dom.tag_name(a) == dom.tag_name(b)
}

/// Whether `target` should be morphed into `reference` without further search:
/// They are of the same type and either bear the same unconsumed persistent identifier or share one in their subtrees.
pub(crate) fn is_match<D: Dom>(dom: &D, index: &IdIndex<D::Node>, reference: &D::Node, target: &D::Node) -> bool {
	if !same_type(dom, reference, target) {
		return false;
	}
	let same_id = match (index.token(dom, reference), index.token(dom, target)) {
		(Some(reference), Some(target)) => reference == target && !index.is_consumed(reference),
		_ => false,
	};
	same_id || index.overlap(reference, target) > 0
}
