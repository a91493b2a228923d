//! [`Dom`] implementation for the browser DOM, via [`web_sys`].

use crate::{
	dom::{Dom, Flag, NodeKind},
	Error,
};
use core::{
	hash::{Hash, Hasher},
	sync::atomic::{AtomicU32, Ordering},
};
use js_sys::{Reflect, Symbol};
use std::borrow::Cow;
use tracing::error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Attr, CharacterData, Document, Element, HtmlElement, HtmlInputElement, HtmlOptionElement, HtmlTextAreaElement, Node};

static NEXT_KEY: AtomicU32 = AtomicU32::new(0);

/// A [`web_sys::Node`] with a stable hash.
///
/// The key is stored on the node itself under a registered symbol, so wrapping the same node twice yields equal handles.
#[derive(Debug, Clone)]
pub struct WebNode {
	node: Node,
	key: u32,
}

impl WebNode {
	#[must_use]
	pub fn node(&self) -> &Node {
		&self.node
	}
}

impl PartialEq for WebNode {
	fn eq(&self, other: &Self) -> bool {
		self.key == other.key
	}
}
impl Eq for WebNode {}

impl Hash for WebNode {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.key.hash(state)
	}
}

/// A browser [`Document`] as [`Dom`].
#[derive(Debug)]
pub struct WebDom {
	document: Document,
	key: JsValue,
}

impl WebDom {
	#[must_use]
	pub fn new(document: Document) -> Self {
		Self {
			document,
			key: Symbol::for_("dom-morph.key").into(),
		}
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// Wraps `node`, assigning it a key on first use.
	#[must_use]
	pub fn wrap(&self, node: Node) -> WebNode {
		let existing = Reflect::get(&node, &self.key).ok().and_then(|key| key.as_f64());
		let key = match existing {
			Some(key) => key as u32,
			None => {
				let key = NEXT_KEY.fetch_add(1, Ordering::Relaxed);
				if let Err(error) = Reflect::set(&node, &self.key, &JsValue::from(key)) {
					error!("Failed to store the node key, so handles to this node won't compare equal: {:?}", error);
				}
				key
			}
		};
		WebNode { node, key }
	}

	fn wrap_element(&self, element: Element) -> WebNode {
		self.wrap(element.into())
	}
}

fn js_error(error: JsValue) -> Error {
	Error::Dom(format!("{:?}", error))
}

fn element(node: &WebNode) -> Result<&Element, Error> {
	node.node.dyn_ref::<Element>().ok_or_else(|| Error::Dom(format!("{:?} is not an element", node.node)))
}

impl Dom for WebDom {
	type Node = WebNode;

	fn owns(&self, node: &WebNode) -> bool {
		node.node.owner_document().as_ref() == Some(&self.document)
	}

	fn kind(&self, node: &WebNode) -> NodeKind {
		match node.node.node_type() {
			Node::ELEMENT_NODE => NodeKind::Element,
			Node::TEXT_NODE => NodeKind::Text,
			Node::COMMENT_NODE => NodeKind::Comment,
			_ => NodeKind::Other,
		}
	}

	fn tag_name(&self, node: &WebNode) -> Option<Cow<'_, str>> {
		node.node.dyn_ref::<Element>().map(|element| Cow::Owned(element.local_name()))
	}

	fn attribute(&self, node: &WebNode, name: &str) -> Option<Cow<'_, str>> {
		node.node.dyn_ref::<Element>()?.get_attribute(name).map(Cow::Owned)
	}

	fn attributes(&self, node: &WebNode) -> Vec<(String, String)> {
		let attributes = match node.node.dyn_ref::<Element>() {
			Some(element) => element.attributes(),
			None => return Vec::new(),
		};
		(0..attributes.length())
			.filter_map(|i| attributes.item(i))
			.map(|attribute: Attr| (attribute.name(), attribute.value()))
			.collect()
	}

	fn character_data(&self, node: &WebNode) -> Option<Cow<'_, str>> {
		node.node.dyn_ref::<CharacterData>().map(|data| Cow::Owned(data.data()))
	}

	fn parent(&self, node: &WebNode) -> Option<WebNode> {
		node.node.parent_node().map(|parent| self.wrap(parent))
	}

	fn first_child(&self, node: &WebNode) -> Option<WebNode> {
		node.node.first_child().map(|child| self.wrap(child))
	}

	fn next_sibling(&self, node: &WebNode) -> Option<WebNode> {
		node.node.next_sibling().map(|sibling| self.wrap(sibling))
	}

	fn value(&self, node: &WebNode) -> String {
		if let Some(input) = node.node.dyn_ref::<HtmlInputElement>() {
			input.value()
		} else if let Some(text_area) = node.node.dyn_ref::<HtmlTextAreaElement>() {
			text_area.value()
		} else {
			String::new()
		}
	}

	fn flag(&self, node: &WebNode, flag: Flag) -> bool {
		match flag {
			Flag::Checked => node.node.dyn_ref::<HtmlInputElement>().map_or(false, HtmlInputElement::checked),
			Flag::Indeterminate => node.node.dyn_ref::<HtmlInputElement>().map_or(false, HtmlInputElement::indeterminate),
			Flag::Selected => node.node.dyn_ref::<HtmlOptionElement>().map_or(false, HtmlOptionElement::selected),
			Flag::Disabled => node.node.dyn_ref::<Element>().map_or(false, |element| element.has_attribute("disabled")),
		}
	}

	fn active_element(&self) -> Option<WebNode> {
		self.document.active_element().map(|element| self.wrap_element(element))
	}

	fn selection_range(&self, node: &WebNode) -> Option<(u32, u32)> {
		let (start, end) = if let Some(input) = node.node.dyn_ref::<HtmlInputElement>() {
			(input.selection_start(), input.selection_end())
		} else if let Some(text_area) = node.node.dyn_ref::<HtmlTextAreaElement>() {
			(text_area.selection_start(), text_area.selection_end())
		} else {
			return None;
		};
		Some((start.ok()??, end.ok()??))
	}

	fn create_element(&mut self, tag_name: &str) -> Result<WebNode, Error> {
		let element = self.document.create_element(tag_name).map_err(js_error)?;
		Ok(self.wrap_element(element))
	}

	fn create_text(&mut self, data: &str) -> WebNode {
		self.wrap(self.document.create_text_node(data).into())
	}

	fn create_comment(&mut self, data: &str) -> WebNode {
		self.wrap(self.document.create_comment(data).into())
	}

	fn insert_before(&mut self, parent: &WebNode, node: &WebNode, before: Option<&WebNode>) -> Result<(), Error> {
		if node.node.contains(Some(&parent.node)) {
			return Err(Error::Hierarchy);
		}
		parent.node.insert_before(&node.node, before.map(|before| &before.node)).map(drop).map_err(js_error)
	}

	fn remove(&mut self, node: &WebNode) -> Result<(), Error> {
		match node.node.parent_node() {
			Some(parent) => parent.remove_child(&node.node).map(drop).map_err(js_error),
			None => Ok(()),
		}
	}

	fn set_attribute(&mut self, node: &WebNode, name: &str, value: &str) -> Result<(), Error> {
		element(node)?.set_attribute(name, value).map_err(js_error)
	}

	fn remove_attribute(&mut self, node: &WebNode, name: &str) -> Result<(), Error> {
		element(node)?.remove_attribute(name).map_err(js_error)
	}

	fn set_character_data(&mut self, node: &WebNode, data: &str) {
		if let Some(character_data) = node.node.dyn_ref::<CharacterData>() {
			character_data.set_data(data)
		}
	}

	fn set_value(&mut self, node: &WebNode, value: &str) {
		if let Some(input) = node.node.dyn_ref::<HtmlInputElement>() {
			input.set_value(value)
		} else if let Some(text_area) = node.node.dyn_ref::<HtmlTextAreaElement>() {
			text_area.set_value(value)
		}
	}

	fn set_flag(&mut self, node: &WebNode, flag: Flag, on: bool) {
		match flag {
			Flag::Checked => {
				if let Some(input) = node.node.dyn_ref::<HtmlInputElement>() {
					input.set_checked(on)
				}
			}
			Flag::Indeterminate => {
				if let Some(input) = node.node.dyn_ref::<HtmlInputElement>() {
					input.set_indeterminate(on)
				}
			}
			Flag::Selected => {
				if let Some(option) = node.node.dyn_ref::<HtmlOptionElement>() {
					option.set_selected(on)
				}
			}
			Flag::Disabled => {
				if let Some(element) = node.node.dyn_ref::<Element>() {
					let result = if on { element.set_attribute("disabled", "") } else { element.remove_attribute("disabled") };
					if let Err(error) = result {
						error!("Failed to update `disabled`: {:?}", error);
					}
				}
			}
		}
	}

	fn focus(&mut self, node: &WebNode) -> Result<(), Error> {
		node.node
			.dyn_ref::<HtmlElement>()
			.ok_or_else(|| Error::Dom(format!("{:?} can't receive focus", node.node)))?
			.focus()
			.map_err(js_error)
	}

	fn set_selection_range(&mut self, node: &WebNode, start: u32, end: u32) -> Result<(), Error> {
		if let Some(input) = node.node.dyn_ref::<HtmlInputElement>() {
			input.set_selection_range(start, end).map_err(js_error)
		} else if let Some(text_area) = node.node.dyn_ref::<HtmlTextAreaElement>() {
			text_area.set_selection_range(start, end).map_err(js_error)
		} else {
			Err(Error::Dom(format!("{:?} has no text selection", node.node)))
		}
	}
}
