//! Deferred reuse of discarded nodes in two-pass mode.
//!
//! During the walk, discarded nodes that bear a persistent identifier are detached with their state intact instead of being dropped,
//! and reference nodes bearing one are inserted as placeholders without notifying any hooks.
//! Afterwards, each held node takes its placeholder's place and is morphed into it.
//!
//! Only reference nodes that were moved into the live tree can be claimed this way.
//! A live node that merely acquired a held node's identifier while being morphed is never swapped out.

use crate::{
	dom::Dom,
	id_index::IdIndex,
	matching::same_type,
	morph::{describe, Walk},
};
use core::mem;
use hashbrown::HashMap;
use tracing::{error, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

#[derive(Debug)]
pub(crate) struct Pantry<N> {
	pub(crate) held: Vec<N>,
	/// Reference nodes that were inserted without notifying any hooks.
	pub(crate) placeholders: Vec<N>,
	/// Inserted reference elements by identifier. Held nodes are only ever swapped in for one of these.
	slots: HashMap<String, N>,
	/// Set once restoration started, after which nothing is held aside or inserted silently anymore.
	restoring: bool,
}

impl<N> Pantry<N> {
	pub(crate) fn new() -> Self {
		Self {
			held: Vec::new(),
			placeholders: Vec::new(),
			slots: HashMap::new(),
			restoring: false,
		}
	}

	pub(crate) fn collecting(&self) -> bool {
		!self.restoring
	}
}

impl<'d, 'h, D: Dom> Walk<'d, 'h, D> {
	/// Detaches `node` into the pantry if it bears a persistent identifier itself.
	/// Otherwise, removes it normally, but first holds aside those of its children that contain one.
	pub(crate) fn hold_aside(&mut self, node: &D::Node) {
		let span = trace_span!("Holding aside", node = %describe(&*self.dom, node));
		let _enter = span.enter();

		if self.index.token(&*self.dom, node).is_none() {
			if !self.hooks.before_node_removed(&*self.dom, node) {
				return trace!("Vetoed removal. Its children stay in place too.");
			}
			let mut child = self.dom.first_child(node);
			while let Some(current) = child {
				child = self.dom.next_sibling(&current);
				if self.index.holds_persistent(&current) {
					self.hold_aside(&current);
				}
			}
			return self.detach_removed(node);
		}

		if !self.hooks.before_node_held(&*self.dom, node) {
			return trace!("Vetoed.");
		}
		if let Err(error) = self.dom.remove(node) {
			return error!("Failed to detach the node: {}", error);
		}
		if let Some(pantry) = self.pantry.as_mut() {
			pantry.held.push(node.clone());
		}
		self.stats.held += 1;
	}

	/// Remembers the elements of `inserted`, a reference subtree that was just moved into the live tree, as slots for held nodes.
	pub(crate) fn register_slots(&mut self, inserted: &D::Node) {
		let dom = &*self.dom;
		if let Some(pantry) = self.pantry.as_mut() {
			for node in dom.descendants(inserted) {
				if let Some(id) = dom.id(&node) {
					pantry.slots.insert(id.into_owned(), node);
				}
			}
		}
	}

	/// Swaps each held node in for the inserted reference element bearing its identifier, latest held first, and then morphs it into that placeholder.
	///
	/// Placeholders outside of `roots` can't be claimed.
	#[instrument(skip(self, roots))]
	pub(crate) fn restore_held(&mut self, roots: &[D::Node]) {
		let (held, mut placeholders) = match self.pantry.as_mut() {
			Some(pantry) => {
				pantry.restoring = true;
				(mem::take(&mut pantry.held), mem::take(&mut pantry.placeholders))
			}
			None => return,
		};

		for node in held.into_iter().rev() {
			let span = trace_span!("Restoring", node = %describe(&*self.dom, &node));
			let _enter = span.enter();

			let claimed = self.claim_slot(&node, roots);
			let (placeholder, parent) = match claimed.and_then(|placeholder| Some((self.dom.parent(&placeholder)?, placeholder))) {
				Some((parent, placeholder)) => (placeholder, parent),
				None => {
					if STATIC_MAX_LEVEL >= Level::WARN {
						warn!("No placeholder claimed {}. It stays detached.", describe(&*self.dom, &node));
					}
					self.hooks.after_node_removed(&*self.dom, &node);
					self.stats.removed += 1;
					continue;
				}
			};

			if let Err(error) = self.dom.insert_before(&parent, &node, Some(&placeholder)) {
				error!("Failed to reinsert the node: {}", error);
				continue;
			}
			if let Err(error) = self.dom.remove(&placeholder) {
				error!("Failed to remove the placeholder: {}", error);
			}
			placeholders.retain(|candidate| candidate != &placeholder);

			self.index = IdIndex::build(&*self.dom, &node, &placeholder);
			self.morph_node(&node, &placeholder);
			self.stats.restored += 1;
		}
		self.pantry = None;

		for placeholder in placeholders {
			let parent = match self.dom.parent(&placeholder) {
				Some(parent) => parent,
				None => continue,
			};
			if self.hooks.before_node_added(&*self.dom, &placeholder) {
				self.hooks.after_node_added(&*self.dom, &placeholder);
				self.stats.inserted += 1;
			} else {
				trace!("Vetoed insertion of an unclaimed placeholder.");
				if let Err(error) = self.dom.remove(&placeholder) {
					error!("Failed to remove the placeholder from {:?}: {}", parent, error);
				}
			}
		}
	}

	/// Takes the slot for `node`'s identifier, if it is still part of the live tree and of the same type.
	fn claim_slot(&mut self, node: &D::Node, roots: &[D::Node]) -> Option<D::Node> {
		let id = self.dom.id(node)?.into_owned();
		let slot = self.pantry.as_mut()?.slots.remove(&id)?;
		let dom = &*self.dom;
		if &slot == node || !same_type(dom, &slot, node) || !roots.iter().any(|root| dom.contains(root, &slot)) {
			trace!("The slot for {:?} left the live tree or doesn't fit.", id);
			return None;
		}
		Some(slot)
	}
}
