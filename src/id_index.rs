//! Which persistent identifiers each node's subtree contains.

use crate::{dom::Dom, rc_hash_map::RcHashMap};
use core::hash::Hash;
use hashbrown::{HashMap, HashSet};
use std::borrow::Cow;
use tracing::{instrument, trace};

/// An interned persistent identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct IdToken(u32);

/// Maps nodes of a target and a reference subtree to the persistent identifiers they contain.
///
/// An identifier is persistent iff it occurs exactly once in each subtree, on elements with the same tag name.
/// A node's set contains the identifiers of its own subtree, so it includes everything its descendants bear.
///
/// Placing a reference node consumes its tokens. Consumed tokens no longer count towards any overlap.
#[derive(Debug)]
pub(crate) struct IdIndex<N: Eq + Hash> {
	tokens: HashMap<String, IdToken>,
	sets: HashMap<N, HashSet<IdToken>>,
	consumed: HashSet<IdToken>,
}

impl<N: Clone + Eq + Hash> IdIndex<N> {
	#[instrument(skip_all)]
	pub(crate) fn build<D: Dom<Node = N>>(dom: &D, target: &N, reference: &N) -> Self {
		let target_ids = occurrences(dom, target);
		let reference_ids = occurrences(dom, reference);

		let mut tokens = HashMap::new();
		for (id, count, bearer) in reference_ids.iter() {
			if *count != 1 {
				continue;
			}
			match target_ids.get(id.as_str()) {
				Some((target_count, target_bearer)) if *target_count == 1 && dom.tag_name(bearer) == dom.tag_name(target_bearer) => {
					tokens.insert(id.clone(), IdToken(tokens.len() as u32));
				}
				_ => (),
			}
		}

		let mut sets = HashMap::<N, HashSet<IdToken>>::new();
		for root in [target, reference] {
			for node in dom.descendants(root) {
				let token = match dom.id(&node).and_then(|id| tokens.get(id.as_ref()).copied()) {
					Some(token) => token,
					None => continue,
				};
				let mut current = Some(node);
				while let Some(node) = current {
					current = if &node == root { None } else { dom.parent(&node) };
					sets.entry(node).or_insert_with(HashSet::new).insert(token);
				}
			}
		}

		if cfg!(feature = "dangerous-logging") {
			trace!(persistent = ?tokens.keys().collect::<Vec<_>>(), "Indexed identifiers.");
		} else {
			trace!(persistent = tokens.len(), nodes = sets.len(), "Indexed identifiers.");
		}

		Self {
			tokens,
			sets,
			consumed: HashSet::new(),
		}
	}

	/// The persistent identifier `node` bears itself, consumed or not.
	pub(crate) fn token<D: Dom<Node = N>>(&self, dom: &D, node: &N) -> Option<IdToken> {
		dom.id(node).and_then(|id| self.tokens.get(id.as_ref()).copied())
	}

	pub(crate) fn is_consumed(&self, token: IdToken) -> bool {
		self.consumed.contains(&token)
	}

	/// Whether `node`'s subtree contains any persistent identifier, consumed or not.
	pub(crate) fn holds_persistent(&self, node: &N) -> bool {
		self.sets.contains_key(node)
	}

	/// Number of unconsumed persistent identifiers both `a`'s and `b`'s subtrees contain.
	pub(crate) fn overlap(&self, a: &N, b: &N) -> usize {
		match (self.sets.get(a), self.sets.get(b)) {
			(Some(a), Some(b)) => a.iter().filter(|token| b.contains(*token) && !self.consumed.contains(*token)).count(),
			_ => 0,
		}
	}

	/// Marks every identifier in `node`'s subtree as placed.
	pub(crate) fn consume(&mut self, node: &N) {
		if let Some(set) = self.sets.get(node) {
			self.consumed.extend(set.iter().copied());
		}
	}
}

fn occurrences<D: Dom>(dom: &D, root: &D::Node) -> RcHashMap<String, u16, D::Node> {
	let mut occurrences = RcHashMap::new();
	for node in dom.descendants(root) {
		if let Some(id) = dom.id(&node).map(Cow::into_owned) {
			// A saturated count is still not one.
			let _ = occurrences.increment_or_insert_with(id, || node.clone());
		}
	}
	occurrences
}
