//! The seam between the reconciliation engine and a concrete tree.

use crate::Error;
use core::{fmt::Debug, hash::Hash};
use std::borrow::Cow;

/// The kind of a node, as far as matching is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Element,
	Text,
	Comment,
	/// Anything else (processing instructions, document types…). Never matched softly with a different kind.
	Other,
}

/// Live boolean state of form controls.
///
/// [`Flag::Disabled`] reflects its attribute directly.
/// [`Flag::Checked`] and [`Flag::Selected`] follow their attribute only until they were set through the property.
/// [`Flag::Indeterminate`] has no attribute at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
	Checked,
	Disabled,
	Selected,
	Indeterminate,
}

impl Flag {
	/// The attribute mirroring this flag in markup, if any.
	#[must_use]
	pub fn attribute_name(self) -> Option<&'static str> {
		match self {
			Flag::Checked => Some("checked"),
			Flag::Disabled => Some("disabled"),
			Flag::Selected => Some("selected"),
			Flag::Indeterminate => None,
		}
	}
}

/// A mutable tree of elements, text and comments.
///
/// Handles are cheap to clone and compare by node identity.
/// The reference tree handed to [`Morpher::morph`](`crate::Morpher::morph`) lives in the same `Dom` as the target,
/// detached; its nodes are moved into the target tree whenever they are inserted.
pub trait Dom {
	type Node: Clone + Eq + Hash + Debug;

	fn kind(&self, node: &Self::Node) -> NodeKind;
	/// Only elements have a tag name.
	fn tag_name(&self, node: &Self::Node) -> Option<Cow<'_, str>>;
	fn attribute(&self, node: &Self::Node, name: &str) -> Option<Cow<'_, str>>;
	/// All attributes in document order.
	fn attributes(&self, node: &Self::Node) -> Vec<(String, String)>;
	/// The content of text and comment nodes.
	fn character_data(&self, node: &Self::Node) -> Option<Cow<'_, str>>;

	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
	fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

	/// The live value of text entry controls. Empty for everything else.
	fn value(&self, node: &Self::Node) -> String;
	fn flag(&self, node: &Self::Node, flag: Flag) -> bool;
	fn active_element(&self) -> Option<Self::Node>;
	fn selection_range(&self, node: &Self::Node) -> Option<(u32, u32)>;

	/// # Errors
	///
	/// Iff the backend rejects the tag name.
	fn create_element(&mut self, tag_name: &str) -> Result<Self::Node, Error>;
	fn create_text(&mut self, data: &str) -> Self::Node;
	fn create_comment(&mut self, data: &str) -> Self::Node;

	/// Moves `node` (detaching it first, if necessary) into `parent`, before `before` or at the end.
	///
	/// # Errors
	///
	/// [`Error::Hierarchy`] if `parent` is `node` or one of its descendants.
	fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, before: Option<&Self::Node>) -> Result<(), Error>;
	/// Detaches `node` from its parent. Detached nodes stay valid handles.
	///
	/// # Errors
	///
	/// Iff the backend fails to detach the node.
	fn remove(&mut self, node: &Self::Node) -> Result<(), Error>;
	/// # Errors
	///
	/// Iff the backend rejects the attribute name.
	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), Error>;
	/// # Errors
	///
	/// Iff the backend fails to remove the attribute.
	fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), Error>;
	fn set_character_data(&mut self, node: &Self::Node, data: &str);
	fn set_value(&mut self, node: &Self::Node, value: &str);
	fn set_flag(&mut self, node: &Self::Node, flag: Flag, on: bool);
	/// # Errors
	///
	/// Iff the node can't receive focus.
	fn focus(&mut self, node: &Self::Node) -> Result<(), Error>;
	/// # Errors
	///
	/// Iff the node has no selectable text.
	fn set_selection_range(&mut self, node: &Self::Node, start: u32, end: u32) -> Result<(), Error>;

	/// Whether `node` is a handle into this tree at all.
	fn owns(&self, _node: &Self::Node) -> bool {
		true
	}

	/// The identifier token of an element, if it has a nonempty one.
	fn id(&self, node: &Self::Node) -> Option<Cow<'_, str>> {
		self.attribute(node, "id").filter(|id| !id.is_empty())
	}

	fn has_attribute(&self, node: &Self::Node, name: &str) -> bool {
		self.attribute(node, name).is_some()
	}

	/// Whether `node` is `ancestor` or one of its descendants.
	fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
		let mut current = Some(node.clone());
		while let Some(candidate) = current {
			if &candidate == ancestor {
				return true;
			}
			current = self.parent(&candidate);
		}
		false
	}

	/// Pre-order traversal of `root` and its descendants.
	fn descendants(&self, root: &Self::Node) -> Descendants<'_, Self>
	where
		Self: Sized,
	{
		Descendants {
			dom: self,
			root: root.clone(),
			next: Some(root.clone()),
		}
	}

	/// The first element in `root`'s subtree (`root` included) whose identifier is `id`.
	fn find_by_id(&self, root: &Self::Node, id: &str) -> Option<Self::Node>
	where
		Self: Sized,
	{
		self.descendants(root).find(|node| self.id(node).as_deref() == Some(id))
	}
}

/// See [`Dom::descendants`].
pub struct Descendants<'a, D: Dom> {
	dom: &'a D,
	root: D::Node,
	next: Option<D::Node>,
}

impl<'a, D: Dom> Iterator for Descendants<'a, D> {
	type Item = D::Node;

	fn next(&mut self) -> Option<Self::Item> {
		let current = self.next.take()?;
		if let Some(child) = self.dom.first_child(&current) {
			self.next = Some(child);
		} else {
			let mut node = current.clone();
			while node != self.root {
				if let Some(sibling) = self.dom.next_sibling(&node) {
					self.next = Some(sibling);
					break;
				}
				match self.dom.parent(&node) {
					Some(parent) => node = parent,
					None => break,
				}
			}
		}
		Some(current)
	}
}
