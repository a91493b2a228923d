use thiserror::Error;

/// Precondition violations and backend failures.
///
/// Reconciliation itself never fails half-way: every precondition is checked before the first mutation,
/// and failures reported by a [`Dom`](`crate::Dom`) backend during the walk are logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	#[error("node {0} does not belong to this tree")]
	ForeignNode(String),

	#[error("the reference content overlaps the target subtree")]
	Entangled,

	#[error("a node can't be inserted into its own subtree")]
	Hierarchy,

	#[error("the reference content is empty, so nothing can take the target's place")]
	EmptyReference,

	#[error("malformed markup at byte {offset}: {reason}")]
	Markup { offset: usize, reason: &'static str },

	#[error("DOM operation failed: {0}")]
	Dom(String),
}
