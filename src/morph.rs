use crate::{
	dom::{Dom, NodeKind},
	focus::FocusSnapshot,
	hooks::{HookChain, Hooks},
	id_index::IdIndex,
	load,
	matching::{is_match, same_type},
	options::{Mode, Options},
	pantry::Pantry,
	temp_set::TempNameSet,
	Error,
};
use core::fmt::{self, Debug, Formatter};
use tracing::{error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// The desired shape of the target.
///
/// Reference nodes must belong to the same [`Dom`] as the target, but must neither contain it nor be part of it.
/// They are consumed: whatever isn't matched with an existing node is moved into the live tree.
#[derive(Debug, Clone)]
pub enum Reference<'m, N> {
	Node(N),
	Nodes(Vec<N>),
	/// Parsed with [`load::parse_fragment`] first.
	Markup(&'m str),
}

/// Reconciles live trees with reference trees, in place.
///
/// A `Morpher` carries the extensions that should observe every call.
/// Use [`morph`] for one-off calls without extensions.
pub struct Morpher<D: Dom> {
	extensions: Vec<Box<dyn Hooks<D>>>,
}

impl<D: Dom> Default for Morpher<D> {
	fn default() -> Self {
		Self::new()
	}
}

impl<D: Dom> Debug for Morpher<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Morpher").field("extensions", &self.extensions.len()).finish()
	}
}

impl<D: Dom> Morpher<D> {
	#[must_use]
	pub fn new() -> Self {
		Self { extensions: Vec::new() }
	}

	/// Adds an extension. Extensions are asked before the per-call [`Options::hooks`], in registration order.
	pub fn register(&mut self, extension: impl Hooks<D> + 'static) -> &mut Self {
		self.extensions.push(Box::new(extension));
		self
	}

	/// Morphs `target` into the shape of `reference`.
	///
	/// Returns the node now standing where `target` stood. That's `target` itself unless it was replaced in [`Mode::Outer`],
	/// because the best reference node has a different type.
	///
	/// # Errors
	///
	/// Before anything is mutated:
	///
	/// - [`Error::ForeignNode`] if `target` or a reference node isn't part of `dom`,
	/// - [`Error::Entangled`] if a reference node contains `target` or is contained in it,
	/// - [`Error::EmptyReference`] in [`Mode::Outer`] if there are no reference nodes,
	/// - [`Error::Markup`] if [`Reference::Markup`] fails to parse,
	/// - whatever `dom` reports while creating the synthetic wrapper element.
	///
	/// Failures of individual DOM operations during the walk are logged and skipped.
	#[instrument(skip(self, dom, reference, options))]
	pub fn morph(&mut self, dom: &mut D, target: &D::Node, reference: Reference<'_, D::Node>, options: Options<'_, D>) -> Result<D::Node, Error> {
		let Options {
			mode,
			ignore_active,
			ignore_active_value,
			restore_focus,
			two_pass,
			hooks,
		} = options;

		if !dom.owns(target) {
			return Err(Error::ForeignNode(format!("{:?}", target)));
		}
		let references = match reference {
			Reference::Node(node) => vec![node],
			Reference::Nodes(nodes) => nodes,
			Reference::Markup(markup) => load::parse_fragment(dom, markup)?,
		};
		for node in &references {
			if !dom.owns(node) {
				return Err(Error::ForeignNode(format!("{:?}", node)));
			}
			if dom.contains(target, node) || dom.contains(node, target) {
				return Err(Error::Entangled);
			}
		}
		if mode == Mode::Outer && references.is_empty() {
			return Err(Error::EmptyReference);
		}

		// A lone outer reference is compared directly. Anything else becomes the child list of a synthetic element.
		let reference_root = match (mode, references.as_slice()) {
			(Mode::Outer, [single]) => single.clone(),
			_ => {
				let wrapper = dom.create_element("div")?;
				for node in &references {
					dom.insert_before(&wrapper, node, None)?;
				}
				wrapper
			}
		};

		let focus = FocusSnapshot::capture(&*dom);
		let mut listeners: Vec<&mut dyn Hooks<D>> = self.extensions.iter_mut().map(|extension| &mut **extension as &mut dyn Hooks<D>).collect();
		if let Some(hooks) = hooks {
			listeners.push(hooks);
		}

		let mut walk = Walk {
			index: IdIndex::build(&*dom, target, &reference_root),
			active: dom.active_element(),
			dom,
			hooks: HookChain::new(listeners),
			ignore_active,
			ignore_active_value,
			pantry: if two_pass { Some(Pantry::new()) } else { None },
			names: TempNameSet::new(),
			stats: Stats::default(),
		};

		let (live, roots) = match mode {
			Mode::Inner => {
				walk.morph_children(&reference_root, target);
				(target.clone(), vec![target.clone()])
			}
			Mode::Outer => walk.morph_outer(target, &references),
		};

		walk.restore_held(&roots);

		if restore_focus {
			if let Some(focus) = focus {
				focus.restore(walk.dom, &roots);
			}
		}

		info!(
			"Morphed {}, inserted {}, removed {}, held {} and restored {} node(s).",
			walk.stats.morphed, walk.stats.inserted, walk.stats.removed, walk.stats.held, walk.stats.restored
		);
		info!("Scratch heap capacity (attribute names): {}", walk.names.capacity());
		Ok(live)
	}
}

/// Morphs `target` into the shape of `reference` without any extensions.
///
/// # Errors
///
/// See [`Morpher::morph`].
pub fn morph<D: Dom>(dom: &mut D, target: &D::Node, reference: Reference<'_, D::Node>, options: Options<'_, D>) -> Result<D::Node, Error> {
	Morpher::new().morph(dom, target, reference, options)
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Stats {
	pub(crate) morphed: usize,
	pub(crate) inserted: usize,
	pub(crate) removed: usize,
	pub(crate) held: usize,
	pub(crate) restored: usize,
}

/// State of one [`Morpher::morph`] call.
pub(crate) struct Walk<'d, 'h, D: Dom> {
	pub(crate) dom: &'d mut D,
	pub(crate) index: IdIndex<D::Node>,
	pub(crate) hooks: HookChain<'h, D>,
	/// The element that was focused when the call started.
	pub(crate) active: Option<D::Node>,
	pub(crate) ignore_active: bool,
	pub(crate) ignore_active_value: bool,
	/// Only present in two-pass mode.
	pub(crate) pantry: Option<Pantry<D::Node>>,
	pub(crate) names: TempNameSet,
	pub(crate) stats: Stats,
}

/// Short structural description of a node, for logging.
pub(crate) fn describe<D: Dom>(dom: &D, node: &D::Node) -> String {
	match dom.kind(node) {
		NodeKind::Element => {
			let tag_name = dom.tag_name(node).unwrap_or_default();
			match dom.id(node) {
				Some(id) if cfg!(feature = "dangerous-logging") => format!("<{} id={:?}>", tag_name, id),
				_ => format!("<{}>", tag_name),
			}
		}
		NodeKind::Text if cfg!(feature = "dangerous-logging") => format!("#text {:?}", dom.character_data(node).unwrap_or_default()),
		NodeKind::Text => "#text".to_owned(),
		NodeKind::Comment => "#comment".to_owned(),
		NodeKind::Other => "#other".to_owned(),
	}
}

impl<'d, 'h, D: Dom> Walk<'d, 'h, D> {
	pub(crate) fn is_active(&self, node: &D::Node) -> bool {
		self.active.as_ref() == Some(node)
	}

	/// Drives the best of `references` against `target` and places the others around the result.
	///
	/// Returns the live root and every root that needs to be searched for placeholders and focus successors.
	fn morph_outer(&mut self, target: &D::Node, references: &[D::Node]) -> (D::Node, Vec<D::Node>) {
		let best = self.best_match(target, references);
		let live = self.morph_root(target, &references[best]);

		let mut roots = Vec::with_capacity(references.len());
		match self.dom.parent(&live) {
			Some(parent) => {
				for node in &references[..best] {
					if self.insert(&parent, node, Some(&live)) {
						roots.push(node.clone());
					}
				}
				roots.push(live.clone());
				let after = self.dom.next_sibling(&live);
				for node in &references[best + 1..] {
					if self.insert(&parent, node, after.as_ref()) {
						roots.push(node.clone());
					}
				}
			}
			None => {
				if STATIC_MAX_LEVEL >= Level::WARN && references.len() > 1 {
					warn!("The target has no parent, so {} sibling reference node(s) were dropped.", references.len() - 1);
				}
				roots.push(live.clone());
			}
		}
		(live, roots)
	}

	/// Same type with the most overlapping identifiers, the earliest on ties, or else the first node.
	fn best_match(&self, target: &D::Node, references: &[D::Node]) -> usize {
		let mut best: Option<(usize, usize)> = None;
		for (i, reference) in references.iter().enumerate() {
			if !same_type(&*self.dom, target, reference) {
				continue;
			}
			let overlap = self.index.overlap(target, reference);
			if best.map_or(true, |(_, best_overlap)| overlap > best_overlap) {
				best = Some((i, overlap));
			}
		}
		best.map_or(0, |(i, _)| i)
	}

	/// Morphs `target` into `reference`, or replaces it if their types differ.
	fn morph_root(&mut self, target: &D::Node, reference: &D::Node) -> D::Node {
		if same_type(&*self.dom, target, reference) {
			self.morph_node(target, reference);
			return target.clone();
		}

		let span = trace_span!("Replacing root", target = %describe(&*self.dom, target), reference = %describe(&*self.dom, reference));
		let _enter = span.enter();
		if !self.hooks.before_node_removed(&*self.dom, target) || !self.hooks.before_node_added(&*self.dom, reference) {
			trace!("Vetoed.");
			return target.clone();
		}
		if let Some(parent) = self.dom.parent(target) {
			if let Err(error) = self.dom.insert_before(&parent, reference, Some(target)) {
				error!("Failed to insert the replacement: {}", error);
				return target.clone();
			}
			if let Err(error) = self.dom.remove(target) {
				error!("Failed to remove the replaced root: {}", error);
			}
		}
		self.hooks.after_node_added(&*self.dom, reference);
		self.hooks.after_node_removed(&*self.dom, target);
		self.stats.inserted += 1;
		self.stats.removed += 1;
		reference.clone()
	}

	/// Synchronizes `target` with `reference` and then reconciles their children.
	pub(crate) fn morph_node(&mut self, target: &D::Node, reference: &D::Node) {
		let span = trace_span!("Morphing", node = %describe(&*self.dom, target));
		let _enter = span.enter();

		if self.ignore_active && self.is_active(target) {
			return trace!("Leaving the active element untouched.");
		}
		if !self.hooks.before_node_morphed(&*self.dom, target, reference) {
			return trace!("Vetoed.");
		}

		self.sync_node(target, reference);
		if self.dom.kind(target) == NodeKind::Element {
			self.morph_children(reference, target);
		}

		self.hooks.after_node_morphed(&*self.dom, target, reference);
		self.stats.morphed += 1;
	}

	/// Reconciles `target_parent`'s children with `reference_parent`'s, left to right.
	pub(crate) fn morph_children(&mut self, reference_parent: &D::Node, target_parent: &D::Node) {
		let mut cursor = self.dom.first_child(target_parent);
		let mut next_reference = self.dom.first_child(reference_parent);
		while let Some(reference) = next_reference {
			// `reference` may be moved into the live tree below.
			next_reference = self.dom.next_sibling(&reference);
			cursor = self.place(reference_parent, target_parent, &reference, cursor);
			self.index.consume(&reference);
		}

		while let Some(node) = cursor {
			cursor = self.dom.next_sibling(&node);
			self.discard(&node);
		}
	}

	/// Finds or creates the live counterpart of `reference` at or after `cursor`.
	///
	/// Returns the new cursor.
	fn place(&mut self, reference_parent: &D::Node, target_parent: &D::Node, reference: &D::Node, cursor: Option<D::Node>) -> Option<D::Node> {
		let current = match cursor {
			Some(current) => current,
			None => {
				self.insert(target_parent, reference, None);
				return None;
			}
		};

		if is_match(&*self.dom, &self.index, reference, &current) {
			self.morph_node(&current, reference);
			return self.dom.next_sibling(&current);
		}

		let found = self
			.find_id_match(reference_parent, target_parent, reference, &current)
			.or_else(|| self.find_soft_match(reference_parent, reference, &current));
		match found {
			Some(found) => {
				self.discard_between(&current, &found);
				self.morph_node(&found, reference);
				self.dom.next_sibling(&found)
			}
			None => {
				self.insert(target_parent, reference, Some(&current));
				Some(current)
			}
		}
	}

	/// Scans forward from `start` for a node matching `reference`,
	/// giving up once the skipped nodes would take more identifiers with them than `reference` could bring back.
	fn find_id_match(&self, reference_parent: &D::Node, target_parent: &D::Node, reference: &D::Node, start: &D::Node) -> Option<D::Node> {
		let budget = self.index.overlap(reference, target_parent);
		if budget == 0 {
			return None;
		}

		let mut discarded = 0;
		let mut candidate = Some(start.clone());
		while let Some(node) = candidate {
			if is_match(&*self.dom, &self.index, reference, &node) {
				return Some(node);
			}
			discarded += self.index.overlap(&node, reference_parent);
			if discarded > budget {
				trace!(budget, discarded, "Identifier scan exceeded its budget.");
				return None;
			}
			candidate = self.dom.next_sibling(&node);
		}
		None
	}

	/// Scans forward from `start` for a node of the same type as `reference`,
	/// stopping at the first node that still has identifiers to offer elsewhere among the reference siblings.
	fn find_soft_match(&self, reference_parent: &D::Node, reference: &D::Node, start: &D::Node) -> Option<D::Node> {
		let mut candidate = Some(start.clone());
		while let Some(node) = candidate {
			if self.index.overlap(&node, reference_parent) > 0 {
				return None;
			}
			if same_type(&*self.dom, &node, reference) {
				return Some(node);
			}
			candidate = self.dom.next_sibling(&node);
		}
		None
	}

	/// Discards the siblings from `start` up to but excluding `end`.
	fn discard_between(&mut self, start: &D::Node, end: &D::Node) {
		let mut node = start.clone();
		while &node != end {
			let next = self.dom.next_sibling(&node);
			self.discard(&node);
			node = match next {
				Some(next) => next,
				None => return error!("Reached the end of the child list before the matched node."),
			};
		}
	}

	/// Removes `node`, or holds it aside for later reuse in two-pass mode.
	fn discard(&mut self, node: &D::Node) {
		if self.collecting() && self.index.holds_persistent(node) {
			self.hold_aside(node);
		} else {
			self.remove(node);
		}
	}

	pub(crate) fn remove(&mut self, node: &D::Node) {
		let span = trace_span!("Removing", node = %describe(&*self.dom, node));
		let _enter = span.enter();
		if !self.hooks.before_node_removed(&*self.dom, node) {
			return trace!("Vetoed.");
		}
		self.detach_removed(node);
	}

	/// Detaches `node` once its removal was allowed.
	pub(crate) fn detach_removed(&mut self, node: &D::Node) {
		if let Err(error) = self.dom.remove(node) {
			return error!("Failed to remove the node: {}", error);
		}
		self.hooks.after_node_removed(&*self.dom, node);
		self.stats.removed += 1;
	}

	/// Whether discarded nodes are held aside and reference nodes with persistent identifiers are inserted silently.
	fn collecting(&self) -> bool {
		self.pantry.as_ref().map_or(false, Pantry::collecting)
	}

	/// Moves `reference` into `parent` before `before`.
	///
	/// In two-pass mode, reference nodes bearing a persistent identifier are inserted silently as placeholders instead.
	///
	/// Returns whether the node was inserted.
	pub(crate) fn insert(&mut self, parent: &D::Node, reference: &D::Node, before: Option<&D::Node>) -> bool {
		let span = trace_span!("Inserting", node = %describe(&*self.dom, reference));
		let _enter = span.enter();

		let placeholder = self.collecting() && self.index.token(&*self.dom, reference).is_some();
		if !placeholder && !self.hooks.before_node_added(&*self.dom, reference) {
			trace!("Vetoed.");
			return false;
		}
		if let Err(error) = self.dom.insert_before(parent, reference, before) {
			error!("Failed to insert the node: {}", error);
			return false;
		}

		self.register_slots(reference);
		if placeholder {
			trace!("Inserted as placeholder.");
			if let Some(pantry) = self.pantry.as_mut() {
				pantry.placeholders.push(reference.clone());
			}
		} else {
			self.hooks.after_node_added(&*self.dom, reference);
			self.stats.inserted += 1;
		}
		true
	}
}
