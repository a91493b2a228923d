//! An in-memory [`Dom`] with HTML-like live form state.
//!
//! Nodes are never freed: removing a node only detaches it, so every [`NodeId`] stays valid for the lifetime of its [`Document`].
//! That mirrors a garbage-collected browser DOM closely enough for state-preservation checks,
//! which compare handles before and after a morph.

use crate::{
	dom::{Dom, Flag, NodeKind},
	load::{self, RAW_TEXT_ELEMENTS, VOID_ELEMENTS},
	Error,
};
use core::{
	fmt::{self, Display, Formatter},
	sync::atomic::{AtomicU32, Ordering},
};
use std::borrow::Cow;

static NEXT_DOCUMENT: AtomicU32 = AtomicU32::new(0);

/// Handle of a node in a [`Document`]. Handles of different documents never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
	document: u32,
	index: u32,
}

impl Display for NodeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.document, self.index)
	}
}

#[derive(Debug)]
pub struct Document {
	id: u32,
	nodes: Vec<NodeData>,
	active: Option<NodeId>,
	mutations: u64,
}

#[derive(Debug)]
struct NodeData {
	parent: Option<usize>,
	first_child: Option<usize>,
	last_child: Option<usize>,
	previous_sibling: Option<usize>,
	next_sibling: Option<usize>,
	content: Content,
}

#[derive(Debug)]
enum Content {
	Element(Element),
	Text(String),
	Comment(String),
}

#[derive(Debug)]
struct Element {
	tag_name: String,
	attributes: Vec<(String, String)>,
	live: LiveState,
}

/// Property state that only follows markup until it's written directly.
#[derive(Debug, Default)]
struct LiveState {
	value: Option<String>,
	checked: Option<bool>,
	selected: Option<bool>,
	indeterminate: bool,
	selection: Option<(u32, u32)>,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	#[must_use]
	pub fn new() -> Self {
		Self {
			id: NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed),
			nodes: Vec::new(),
			active: None,
			mutations: 0,
		}
	}

	/// Parses `markup` into detached top-level nodes.
	///
	/// # Errors
	///
	/// See [`load::parse_fragment`].
	pub fn parse_fragment(&mut self, markup: &str) -> Result<Vec<NodeId>, Error> {
		load::parse_fragment(self, markup)
	}

	/// Number of observable changes made to any node so far: tree structure, attributes, character data and live form state.
	///
	/// Focus changes are not counted.
	#[must_use]
	pub fn mutation_count(&self) -> u64 {
		self.mutations
	}

	#[must_use]
	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		let mut children = Vec::new();
		let mut current = self.data(node).first_child;
		while let Some(index) = current {
			children.push(self.handle(index));
			current = self.nodes[index].next_sibling;
		}
		children
	}

	/// Serializes `node` including itself. Live form state is not serialized, just like in a browser.
	#[must_use]
	pub fn outer_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_node(&mut html, self.index(node));
		html
	}

	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		let mut current = self.data(node).first_child;
		while let Some(index) = current {
			self.write_node(&mut html, index);
			current = self.nodes[index].next_sibling;
		}
		html
	}

	fn handle(&self, index: usize) -> NodeId {
		NodeId {
			document: self.id,
			index: index as u32,
		}
	}

	fn index(&self, node: NodeId) -> usize {
		assert!(node.document == self.id && (node.index as usize) < self.nodes.len(), "Node {} doesn't belong to document {}", node, self.id);
		node.index as usize
	}

	fn data(&self, node: NodeId) -> &NodeData {
		&self.nodes[self.index(node)]
	}

	fn element(&self, node: NodeId) -> Option<&Element> {
		match &self.data(node).content {
			Content::Element(element) => Some(element),
			Content::Text(_) | Content::Comment(_) => None,
		}
	}

	fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
		let index = self.index(node);
		match &mut self.nodes[index].content {
			Content::Element(element) => Some(element),
			Content::Text(_) | Content::Comment(_) => None,
		}
	}

	fn push(&mut self, content: Content) -> NodeId {
		self.nodes.push(NodeData {
			parent: None,
			first_child: None,
			last_child: None,
			previous_sibling: None,
			next_sibling: None,
			content,
		});
		self.handle(self.nodes.len() - 1)
	}

	fn unlink(&mut self, index: usize) {
		let (parent, previous, next) = {
			let data = &self.nodes[index];
			(data.parent, data.previous_sibling, data.next_sibling)
		};
		if let Some(parent) = parent {
			match previous {
				Some(previous) => self.nodes[previous].next_sibling = next,
				None => self.nodes[parent].first_child = next,
			}
			match next {
				Some(next) => self.nodes[next].previous_sibling = previous,
				None => self.nodes[parent].last_child = previous,
			}
		}
		let data = &mut self.nodes[index];
		data.parent = None;
		data.previous_sibling = None;
		data.next_sibling = None;
	}

	fn link(&mut self, parent: usize, index: usize, before: Option<usize>) {
		let previous = match before {
			Some(before) => self.nodes[before].previous_sibling,
			None => self.nodes[parent].last_child,
		};
		match previous {
			Some(previous) => self.nodes[previous].next_sibling = Some(index),
			None => self.nodes[parent].first_child = Some(index),
		}
		match before {
			Some(before) => self.nodes[before].previous_sibling = Some(index),
			None => self.nodes[parent].last_child = Some(index),
		}
		let data = &mut self.nodes[index];
		data.parent = Some(parent);
		data.previous_sibling = previous;
		data.next_sibling = before;
	}

	/// A focused node loses focus when it or one of its ancestors is detached or moved.
	fn blur_within(&mut self, node: NodeId) {
		if let Some(active) = self.active {
			if self.contains(&node, &active) {
				self.active = None;
			}
		}
	}

	fn write_node(&self, html: &mut String, index: usize) {
		let data = &self.nodes[index];
		match &data.content {
			Content::Text(text) => {
				let raw = data
					.parent
					.and_then(|parent| match &self.nodes[parent].content {
						Content::Element(element) => Some(RAW_TEXT_ELEMENTS.contains(&element.tag_name.as_str())),
						Content::Text(_) | Content::Comment(_) => None,
					})
					.unwrap_or(false);
				if raw {
					html.push_str(text)
				} else {
					escape_into(html, text, false)
				}
			}
			Content::Comment(comment) => {
				html.push_str("<!--");
				html.push_str(comment);
				html.push_str("-->");
			}
			Content::Element(element) => {
				html.push('<');
				html.push_str(&element.tag_name);
				for (name, value) in &element.attributes {
					html.push(' ');
					html.push_str(name);
					html.push_str("=\"");
					escape_into(html, value, true);
					html.push('"');
				}
				html.push('>');
				if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
					return;
				}
				let mut current = data.first_child;
				while let Some(child) = current {
					self.write_node(html, child);
					current = self.nodes[child].next_sibling;
				}
				html.push_str("</");
				html.push_str(&element.tag_name);
				html.push('>');
			}
		}
	}
}

fn escape_into(html: &mut String, text: &str, attribute: bool) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'"' if attribute => html.push_str("&quot;"),
			'<' if !attribute => html.push_str("&lt;"),
			'>' if !attribute => html.push_str("&gt;"),
			c => html.push(c),
		}
	}
}

fn is_valid_name(name: &str) -> bool {
	!name.is_empty() && !name.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '=' | '"' | '\'' | '\0'))
}

impl Dom for Document {
	type Node = NodeId;

	fn owns(&self, node: &NodeId) -> bool {
		node.document == self.id && (node.index as usize) < self.nodes.len()
	}

	fn kind(&self, node: &NodeId) -> NodeKind {
		match self.data(*node).content {
			Content::Element(_) => NodeKind::Element,
			Content::Text(_) => NodeKind::Text,
			Content::Comment(_) => NodeKind::Comment,
		}
	}

	fn tag_name(&self, node: &NodeId) -> Option<Cow<'_, str>> {
		self.element(*node).map(|element| Cow::Borrowed(element.tag_name.as_str()))
	}

	fn attribute(&self, node: &NodeId, name: &str) -> Option<Cow<'_, str>> {
		self.element(*node)?
			.attributes
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, value)| Cow::Borrowed(value.as_str()))
	}

	fn attributes(&self, node: &NodeId) -> Vec<(String, String)> {
		self.element(*node).map(|element| element.attributes.clone()).unwrap_or_default()
	}

	fn character_data(&self, node: &NodeId) -> Option<Cow<'_, str>> {
		match &self.data(*node).content {
			Content::Text(data) | Content::Comment(data) => Some(Cow::Borrowed(data.as_str())),
			Content::Element(_) => None,
		}
	}

	fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.data(*node).parent.map(|index| self.handle(index))
	}

	fn first_child(&self, node: &NodeId) -> Option<NodeId> {
		self.data(*node).first_child.map(|index| self.handle(index))
	}

	fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
		self.data(*node).next_sibling.map(|index| self.handle(index))
	}

	fn value(&self, node: &NodeId) -> String {
		let element = match self.element(*node) {
			Some(element) => element,
			None => return String::new(),
		};
		if let Some(value) = &element.live.value {
			return value.clone();
		}
		match element.tag_name.as_str() {
			"input" => self.attribute(node, "value").map(Cow::into_owned).unwrap_or_default(),
			"textarea" => self
				.children(*node)
				.iter()
				.filter_map(|child| self.character_data(child).filter(|_| self.kind(child) == NodeKind::Text))
				.collect(),
			_ => String::new(),
		}
	}

	fn flag(&self, node: &NodeId, flag: Flag) -> bool {
		let element = match self.element(*node) {
			Some(element) => element,
			None => return false,
		};
		match flag {
			Flag::Checked => element.live.checked,
			Flag::Selected => element.live.selected,
			Flag::Indeterminate => Some(element.live.indeterminate),
			Flag::Disabled => None,
		}
		.unwrap_or_else(|| flag.attribute_name().map_or(false, |name| self.has_attribute(node, name)))
	}

	fn active_element(&self) -> Option<NodeId> {
		self.active
	}

	fn selection_range(&self, node: &NodeId) -> Option<(u32, u32)> {
		self.element(*node)?.live.selection
	}

	fn create_element(&mut self, tag_name: &str) -> Result<NodeId, Error> {
		if !is_valid_name(tag_name) {
			return Err(Error::Dom(format!("invalid tag name {:?}", tag_name)));
		}
		Ok(self.push(Content::Element(Element {
			tag_name: tag_name.to_ascii_lowercase(),
			attributes: Vec::new(),
			live: LiveState::default(),
		})))
	}

	fn create_text(&mut self, data: &str) -> NodeId {
		self.push(Content::Text(data.to_owned()))
	}

	fn create_comment(&mut self, data: &str) -> NodeId {
		self.push(Content::Comment(data.to_owned()))
	}

	fn insert_before(&mut self, parent: &NodeId, node: &NodeId, before: Option<&NodeId>) -> Result<(), Error> {
		for handle in IntoIterator::into_iter([Some(parent), Some(node), before]).flatten() {
			if !self.owns(handle) {
				return Err(Error::ForeignNode(handle.to_string()));
			}
		}
		if self.kind(parent) != NodeKind::Element || self.contains(node, parent) {
			return Err(Error::Hierarchy);
		}
		if let Some(before) = before {
			if self.parent(before).as_ref() != Some(parent) {
				return Err(Error::Dom(format!("{} is not a child of {}", before, parent)));
			}
			if before == node {
				return Ok(());
			}
		}

		if self.parent(node).is_some() {
			self.blur_within(*node);
		}
		let index = self.index(*node);
		self.unlink(index);
		let before = before.map(|before| self.index(*before));
		self.link(self.index(*parent), index, before);
		self.mutations += 1;
		Ok(())
	}

	fn remove(&mut self, node: &NodeId) -> Result<(), Error> {
		if !self.owns(node) {
			return Err(Error::ForeignNode(node.to_string()));
		}
		if self.parent(node).is_none() {
			return Ok(());
		}
		self.blur_within(*node);
		self.unlink(self.index(*node));
		self.mutations += 1;
		Ok(())
	}

	fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), Error> {
		if !is_valid_name(name) {
			return Err(Error::Dom(format!("invalid attribute name {:?}", name)));
		}
		let element = self.element_mut(*node).ok_or_else(|| Error::Dom(format!("{} is not an element", node)))?;
		match element.attributes.iter_mut().find(|(n, _)| n == name) {
			Some((_, existing)) => *existing = value.to_owned(),
			None => element.attributes.push((name.to_owned(), value.to_owned())),
		}
		self.mutations += 1;
		Ok(())
	}

	fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), Error> {
		let element = self.element_mut(*node).ok_or_else(|| Error::Dom(format!("{} is not an element", node)))?;
		let count = element.attributes.len();
		element.attributes.retain(|(n, _)| n != name);
		if element.attributes.len() != count {
			self.mutations += 1;
		}
		Ok(())
	}

	fn set_character_data(&mut self, node: &NodeId, data: &str) {
		let index = self.index(*node);
		match &mut self.nodes[index].content {
			Content::Text(existing) | Content::Comment(existing) => {
				*existing = data.to_owned();
				self.mutations += 1;
			}
			Content::Element(_) => (),
		}
	}

	fn set_value(&mut self, node: &NodeId, value: &str) {
		if let Some(element) = self.element_mut(*node) {
			element.live.value = Some(value.to_owned());
			self.mutations += 1;
		}
	}

	fn set_flag(&mut self, node: &NodeId, flag: Flag, on: bool) {
		let element = match self.element_mut(*node) {
			Some(element) => element,
			None => return,
		};
		match flag {
			Flag::Checked => element.live.checked = Some(on),
			Flag::Selected => element.live.selected = Some(on),
			Flag::Indeterminate => element.live.indeterminate = on,
			Flag::Disabled => {
				element.attributes.retain(|(name, _)| name != "disabled");
				if on {
					element.attributes.push(("disabled".to_owned(), String::new()));
				}
			}
		}
		self.mutations += 1;
	}

	fn focus(&mut self, node: &NodeId) -> Result<(), Error> {
		if self.element(*node).is_none() {
			return Err(Error::Dom(format!("{} is not an element and can't receive focus", node)));
		}
		self.active = Some(*node);
		Ok(())
	}

	fn set_selection_range(&mut self, node: &NodeId, start: u32, end: u32) -> Result<(), Error> {
		match self.element_mut(*node) {
			Some(element) if matches!(element.tag_name.as_str(), "input" | "textarea") => {
				element.live.selection = Some((start.min(end), end));
				Ok(())
			}
			_ => Err(Error::Dom(format!("{} has no text selection", node))),
		}
	}
}
