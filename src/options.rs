use crate::{dom::Dom, hooks::Hooks};
use core::fmt::{self, Debug, Formatter};

/// What part of the target is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
	/// The target itself, including its attributes. The target may be replaced if the reference root's type differs.
	Outer,
	/// Only the target's children.
	Inner,
}

impl Default for Mode {
	fn default() -> Self {
		Self::Outer
	}
}

/// Per-call configuration of [`Morpher::morph`](`crate::Morpher::morph`).
pub struct Options<'h, D: Dom> {
	pub mode: Mode,
	/// Leaves the focused element (and its subtree) completely untouched.
	pub ignore_active: bool,
	/// Leaves the focused element's `value` attribute and live control state untouched, but reconciles everything else.
	pub ignore_active_value: bool,
	/// Refocuses the element that took over the focused element's identifier, if focus was lost.
	pub restore_focus: bool,
	/// Holds discarded nodes with persistent identifiers aside and reuses them where they reappear.
	pub two_pass: bool,
	/// Called after any extensions registered on the [`Morpher`](`crate::Morpher`).
	pub hooks: Option<&'h mut dyn Hooks<D>>,
}

impl<'h, D: Dom> Default for Options<'h, D> {
	fn default() -> Self {
		Self {
			mode: Mode::default(),
			ignore_active: false,
			ignore_active_value: false,
			restore_focus: false,
			two_pass: false,
			hooks: None,
		}
	}
}

impl<'h, D: Dom> Debug for Options<'h, D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Options")
			.field("mode", &self.mode)
			.field("ignore_active", &self.ignore_active)
			.field("ignore_active_value", &self.ignore_active_value)
			.field("restore_focus", &self.restore_focus)
			.field("two_pass", &self.two_pass)
			.field("hooks", &self.hooks.is_some())
			.finish()
	}
}

impl<'h, D: Dom> Options<'h, D> {
	#[must_use]
	pub fn with_mode(self, mode: Mode) -> Self {
		Self { mode, ..self }
	}

	#[must_use]
	pub fn with_ignore_active(self, ignore_active: bool) -> Self {
		Self { ignore_active, ..self }
	}

	#[must_use]
	pub fn with_ignore_active_value(self, ignore_active_value: bool) -> Self {
		Self { ignore_active_value, ..self }
	}

	#[must_use]
	pub fn with_restore_focus(self, restore_focus: bool) -> Self {
		Self { restore_focus, ..self }
	}

	#[must_use]
	pub fn with_two_pass(self, two_pass: bool) -> Self {
		Self { two_pass, ..self }
	}

	#[must_use]
	pub fn with_hooks(self, hooks: &'h mut dyn Hooks<D>) -> Self {
		Self { hooks: Some(hooks), ..self }
	}
}
