//! Brings a single matched node up to date with its reference, without touching its children
//! (except for a `<textarea>`'s lone text node, which mirrors its value).

use crate::{
	dom::{Dom, Flag, NodeKind},
	hooks::AttributeUpdate,
	morph::Walk,
};
use std::borrow::Cow;
use tracing::{error, trace};

/// How an element's live state is reconciled beyond its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
	/// Any `<input>` except file pickers: value, `checked` and `disabled`.
	TextEntry,
	/// `<option>`: `selected`.
	Choice,
	/// `<textarea>`: value, mirrored into its text content.
	MultiLineText,
	Generic,
}

impl ControlKind {
	pub fn of<D: Dom>(dom: &D, node: &D::Node) -> Self {
		let tag_name = match dom.tag_name(node) {
			Some(tag_name) => tag_name,
			None => return Self::Generic,
		};
		if tag_name.eq_ignore_ascii_case("input") {
			match dom.attribute(node, "type") {
				Some(kind) if kind.eq_ignore_ascii_case("file") => Self::Generic,
				_ => Self::TextEntry,
			}
		} else if tag_name.eq_ignore_ascii_case("option") {
			Self::Choice
		} else if tag_name.eq_ignore_ascii_case("textarea") {
			Self::MultiLineText
		} else {
			Self::Generic
		}
	}
}

impl<'d, 'h, D: Dom> Walk<'d, 'h, D> {
	pub(crate) fn sync_node(&mut self, target: &D::Node, reference: &D::Node) {
		match self.dom.kind(reference) {
			NodeKind::Element => {
				self.sync_attributes(target, reference);
				if self.ignore_active_value && self.is_active(target) {
					return trace!("Keeping the active element's live state.");
				}
				match ControlKind::of(&*self.dom, target) {
					ControlKind::TextEntry => self.sync_text_entry(target, reference),
					ControlKind::Choice => self.sync_flag(target, reference, Flag::Selected),
					ControlKind::MultiLineText => self.sync_multi_line_text(target, reference),
					ControlKind::Generic => (),
				}
			}
			NodeKind::Text | NodeKind::Comment => {
				let data = self.dom.character_data(reference).map(Cow::into_owned).unwrap_or_default();
				if self.dom.character_data(target).as_deref() != Some(data.as_str()) {
					self.dom.set_character_data(target, &data);
				}
			}
			NodeKind::Other => (),
		}
	}

	/// Whether a hook (or [`Options::ignore_active_value`](`crate::Options::ignore_active_value`)) keeps `name` as it is.
	fn keeps_attribute(&mut self, name: &str, element: &D::Node, update: AttributeUpdate) -> bool {
		if name == "value" && self.ignore_active_value && self.is_active(element) {
			return true;
		}
		!self.hooks.before_attribute_updated(&*self.dom, name, element, update)
	}

	/// Writes all differing attributes first, then removes those the reference lacks.
	fn sync_attributes(&mut self, target: &D::Node, reference: &D::Node) {
		let reference_attributes = self.dom.attributes(reference);
		for (name, value) in &reference_attributes {
			if self.dom.attribute(target, name).as_deref() == Some(value.as_str()) || self.keeps_attribute(name, target, AttributeUpdate::Update) {
				continue;
			}
			if let Err(error) = self.dom.set_attribute(target, name, value) {
				error!("Failed to set attribute {:?}: {}", name, error);
			}
		}

		let stale: Vec<String> = {
			let names = self.names.temp();
			names.extend(reference_attributes.iter().map(|(name, _)| name.as_str()));
			self.dom
				.attributes(target)
				.into_iter()
				.rev()
				.map(|(name, _)| name)
				.filter(|name| !names.contains(&name.as_str()))
				.collect()
		};
		for name in stale {
			if self.keeps_attribute(&name, target, AttributeUpdate::Remove) {
				continue;
			}
			if let Err(error) = self.dom.remove_attribute(target, &name) {
				error!("Failed to remove attribute {:?}: {}", name, error);
			}
		}
	}

	/// Mirrors a live flag, and its attribute if it has one.
	///
	/// An attribute the target already carries is left as is, so that a flag that merely diverged from it doesn't rewrite it.
	fn sync_flag(&mut self, target: &D::Node, reference: &D::Node, flag: Flag) {
		let on = self.dom.flag(reference, flag);
		if self.dom.flag(target, flag) == on {
			return;
		}
		match flag.attribute_name() {
			Some(name) if on => {
				if self.keeps_attribute(name, target, AttributeUpdate::Update) {
					return;
				}
				self.dom.set_flag(target, flag, true);
				if !self.dom.has_attribute(target, name) {
					let value = self.dom.attribute(reference, name).map(Cow::into_owned).unwrap_or_default();
					if let Err(error) = self.dom.set_attribute(target, name, &value) {
						error!("Failed to set attribute {:?}: {}", name, error);
					}
				}
			}
			Some(name) => {
				if self.keeps_attribute(name, target, AttributeUpdate::Remove) {
					return;
				}
				self.dom.set_flag(target, flag, false);
				if self.dom.has_attribute(target, name) && !self.dom.has_attribute(reference, name) {
					if let Err(error) = self.dom.remove_attribute(target, name) {
						error!("Failed to remove attribute {:?}: {}", name, error);
					}
				}
			}
			None => self.dom.set_flag(target, flag, on),
		}
	}

	fn sync_text_entry(&mut self, target: &D::Node, reference: &D::Node) {
		self.sync_flag(target, reference, Flag::Checked);
		self.sync_flag(target, reference, Flag::Disabled);

		if self.dom.has_attribute(reference, "value") {
			let value = self.dom.value(reference);
			if self.dom.value(target) == value || self.keeps_attribute("value", target, AttributeUpdate::Update) {
				return;
			}
			if let Err(error) = self.dom.set_attribute(target, "value", &value) {
				error!("Failed to set attribute \"value\": {}", error);
			}
			self.dom.set_value(target, &value);
		} else {
			let has_value = !self.dom.value(target).is_empty();
			let has_attribute = self.dom.has_attribute(target, "value");
			if !(has_value || has_attribute) || self.keeps_attribute("value", target, AttributeUpdate::Remove) {
				return;
			}
			if has_value {
				self.dom.set_value(target, "");
			}
			if has_attribute {
				if let Err(error) = self.dom.remove_attribute(target, "value") {
					error!("Failed to remove attribute \"value\": {}", error);
				}
			}
		}
	}

	fn sync_multi_line_text(&mut self, target: &D::Node, reference: &D::Node) {
		let value = self.dom.value(reference);
		let stale_value = self.dom.value(target) != value;
		let stale_text = self.dom.first_child(target).filter(|child| {
			self.dom.kind(child) == NodeKind::Text
				&& self.dom.next_sibling(child).is_none()
				&& self.dom.character_data(child).as_deref() != Some(value.as_str())
		});
		if (!stale_value && stale_text.is_none()) || self.keeps_attribute("value", target, AttributeUpdate::Update) {
			return;
		}
		if stale_value {
			self.dom.set_value(target, &value);
		}
		if let Some(text) = stale_text {
			self.dom.set_character_data(&text, &value);
		}
	}
}
