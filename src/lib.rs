//! Morphs a live tree of elements, text and comments into the shape of a detached reference tree, in place.
//!
//! Nodes are reused wherever they can be matched, so that their live state (focus, form input, listeners, anything attached by scripts)
//! survives the update. Matching prefers elements that share persistent identifiers (`id` attributes that are unique on both sides)
//! and otherwise falls back to nodes of the same type at the same position.
//!
//! The tree itself is abstracted by the [`Dom`] trait. [`arena::Document`] is an in-memory implementation,
//! and the `"web"` feature adds [`web::WebDom`] for the browser DOM.
//!
//! Nothing here is asynchronous or thread-safe: one call reconciles synchronously and borrows the tree exclusively for its duration.

#![doc(html_root_url = "https://docs.rs/dom-morph/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod arena;
mod dom;
mod error;
mod focus;
pub mod hooks;
mod id_index;
pub mod load;
mod matching;
mod morph;
mod options;
mod pantry;
mod rc_hash_map;
mod sync;
mod temp_set;
#[cfg(feature = "web")]
pub mod web;

pub use dom::{Descendants, Dom, Flag, NodeKind};
pub use error::Error;
pub use hooks::{AttributeUpdate, Hooks, Verdict};
pub use morph::{morph, Morpher, Reference};
pub use options::{Mode, Options};
pub use sync::ControlKind;
