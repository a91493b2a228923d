//! Lifecycle callbacks, both per call ([`Options::hooks`](`crate::Options::hooks`))
//! and registered on a [`Morpher`](`crate::Morpher`) as extensions.

use crate::dom::Dom;

/// A listener's answer to a "before" event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
	Proceed,
	/// Skips the operation. Later listeners aren't asked.
	Veto,
	/// No opinion. Equivalent to [`Verdict::Proceed`] unless another listener vetoes.
	Abstain,
}

impl Default for Verdict {
	fn default() -> Self {
		Self::Abstain
	}
}

/// `true` proceeds, `false` vetoes.
impl From<bool> for Verdict {
	fn from(proceed: bool) -> Self {
		if proceed {
			Self::Proceed
		} else {
			Self::Veto
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeUpdate {
	Update,
	Remove,
}

/// Observes and optionally vetoes each step of a reconciliation.
///
/// Every method defaults to doing nothing (and [`Verdict::Abstain`]), so implementors only override what they need.
///
/// Veto semantics:
///
/// - [`before_node_added`](`Hooks::before_node_added`): the reference node isn't inserted and the walk continues with the next one.
/// - [`before_node_removed`](`Hooks::before_node_removed`): the target node stays where it is.
/// - [`before_node_morphed`](`Hooks::before_node_morphed`): neither the node nor its children are reconciled.
/// - [`before_attribute_updated`](`Hooks::before_attribute_updated`): only that one attribute write or removal is skipped.
/// - [`before_node_held`](`Hooks::before_node_held`): the node is neither held aside nor removed.
#[allow(unused_variables)]
pub trait Hooks<D: Dom> {
	fn before_node_added(&mut self, dom: &D, node: &D::Node) -> Verdict {
		Verdict::Abstain
	}
	fn after_node_added(&mut self, dom: &D, node: &D::Node) {}

	fn before_node_removed(&mut self, dom: &D, node: &D::Node) -> Verdict {
		Verdict::Abstain
	}
	fn after_node_removed(&mut self, dom: &D, node: &D::Node) {}

	fn before_node_morphed(&mut self, dom: &D, target: &D::Node, reference: &D::Node) -> Verdict {
		Verdict::Abstain
	}
	fn after_node_morphed(&mut self, dom: &D, target: &D::Node, reference: &D::Node) {}

	fn before_attribute_updated(&mut self, dom: &D, name: &str, element: &D::Node, update: AttributeUpdate) -> Verdict {
		Verdict::Abstain
	}

	/// Only called in two-pass mode, for discarded nodes that may be reused later in the same call.
	fn before_node_held(&mut self, dom: &D, node: &D::Node) -> Verdict {
		Verdict::Abstain
	}
}

/// Extensions followed by the per-call listener, for the duration of one call.
///
/// "before" events are asked in order until one vetoes. "after" events are delivered in reverse order.
pub(crate) struct HookChain<'h, D: Dom> {
	listeners: Vec<&'h mut dyn Hooks<D>>,
}

impl<'h, D: Dom> HookChain<'h, D> {
	pub(crate) fn new(listeners: Vec<&'h mut dyn Hooks<D>>) -> Self {
		Self { listeners }
	}

	fn allows(&mut self, mut ask: impl FnMut(&mut (dyn Hooks<D> + 'h)) -> Verdict) -> bool {
		for listener in &mut self.listeners {
			if ask(&mut **listener) == Verdict::Veto {
				return false;
			}
		}
		true
	}

	fn notify(&mut self, mut tell: impl FnMut(&mut (dyn Hooks<D> + 'h))) {
		for listener in self.listeners.iter_mut().rev() {
			tell(&mut **listener);
		}
	}

	pub(crate) fn before_node_added(&mut self, dom: &D, node: &D::Node) -> bool {
		self.allows(|listener| listener.before_node_added(dom, node))
	}

	pub(crate) fn after_node_added(&mut self, dom: &D, node: &D::Node) {
		self.notify(|listener| listener.after_node_added(dom, node));
	}

	pub(crate) fn before_node_removed(&mut self, dom: &D, node: &D::Node) -> bool {
		self.allows(|listener| listener.before_node_removed(dom, node))
	}

	pub(crate) fn after_node_removed(&mut self, dom: &D, node: &D::Node) {
		self.notify(|listener| listener.after_node_removed(dom, node));
	}

	pub(crate) fn before_node_morphed(&mut self, dom: &D, target: &D::Node, reference: &D::Node) -> bool {
		self.allows(|listener| listener.before_node_morphed(dom, target, reference))
	}

	pub(crate) fn after_node_morphed(&mut self, dom: &D, target: &D::Node, reference: &D::Node) {
		self.notify(|listener| listener.after_node_morphed(dom, target, reference));
	}

	pub(crate) fn before_attribute_updated(&mut self, dom: &D, name: &str, element: &D::Node, update: AttributeUpdate) -> bool {
		self.allows(|listener| listener.before_attribute_updated(dom, name, element, update))
	}

	pub(crate) fn before_node_held(&mut self, dom: &D, node: &D::Node) -> bool {
		self.allows(|listener| listener.before_node_held(dom, node))
	}
}
