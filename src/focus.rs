use crate::dom::Dom;
use std::borrow::Cow;
use tracing::{error, trace};

/// The focused element as it was before a morph.
pub(crate) struct FocusSnapshot<N> {
	element: N,
	id: Option<String>,
	selection: Option<(u32, u32)>,
}

impl<N: Clone + Eq> FocusSnapshot<N> {
	pub(crate) fn capture<D: Dom<Node = N>>(dom: &D) -> Option<Self> {
		let element = dom.active_element()?;
		Some(Self {
			id: dom.id(&element).map(Cow::into_owned),
			selection: dom.selection_range(&element),
			element,
		})
	}

	/// Refocuses the element now bearing the captured identifier within `roots`, unless the captured element kept focus.
	pub(crate) fn restore<D: Dom<Node = N>>(self, dom: &mut D, roots: &[N]) {
		if dom.active_element().as_ref() == Some(&self.element) {
			return trace!("Focus was kept.");
		}
		let id = match self.id {
			Some(id) => id,
			None => return trace!("The focused element had no identifier. Not restoring focus."),
		};
		let successor = match roots.iter().find_map(|root| dom.find_by_id(root, &id)) {
			Some(successor) => successor,
			None => return trace!("No successor of the focused element found."),
		};

		if let Err(error) = dom.focus(&successor) {
			return error!("Failed to restore focus: {}", error);
		}
		if let Some((start, end)) = self.selection {
			if let Err(error) = dom.set_selection_range(&successor, start, end) {
				error!("Failed to restore the selection: {}", error);
			}
		}
		trace!("Restored focus.");
	}
}
