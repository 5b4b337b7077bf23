//! The real-tree primitives the differ is written against.
//!
//! A [`Host`] owns the live tree (a browser document, an in-memory arena, …) and hands out
//! [`NodeId`]s for its nodes. The differ never stores anything on host nodes; all framework
//! bookkeeping lives in side tables keyed by [`NodeId`].

use crate::value::{EventHandler, Map, Value};
use core::{convert::TryFrom, fmt};

/// Opaque identity of a real node, allocated by its [`Host`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);
impl NodeId {
	/// # Panics
	///
	/// Iff `index` doesn't fit into 32 bits.
	#[must_use]
	pub fn new(index: usize) -> Self {
		Self(u32::try_from(index).expect("NodeId index overflow"))
	}

	#[must_use]
	pub fn index(self) -> usize {
		self.0 as usize
	}
}
impl fmt::Debug for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A host-independent event, as seen by [`EventHandler`]s.
///
/// Hosts copy whatever is interesting about the native event into [`Event::detail`]
/// (for form controls at least `value`, and `checked` plus `type` for checkable inputs).
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
	pub kind: String,
	pub target: Option<NodeId>,
	pub detail: Map,
}
impl Event {
	#[must_use]
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			target: None,
			detail: Map::new(),
		}
	}

	#[must_use]
	pub fn with_target(mut self, target: NodeId) -> Self {
		self.target = Some(target);
		self
	}

	#[must_use]
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.detail.insert(name.into(), value.into());
		self
	}

	/// Resolves a dot-separated path (`"touches.0.x"`) against [`Event::detail`].
	#[must_use]
	pub fn lookup(&self, path: &str) -> Option<&Value> {
		let mut segments = path.split('.');
		let first = self.detail.get(segments.next()?)?;
		segments.try_fold(first, |value, segment| value.child(segment))
	}
}

/// Real-tree mutation and query primitives.
///
/// The differ treats these as total functions. Implementations that can fail (like the
/// web-backed one) report failures themselves instead of surfacing them here.
pub trait Host {
	fn create_element(&mut self, tag: &str, svg: bool) -> NodeId;
	fn create_text(&mut self, text: &str) -> NodeId;

	/// `None` for text nodes.
	fn tag_name(&self, node: NodeId) -> Option<String>;
	/// `None` for elements.
	fn text(&self, node: NodeId) -> Option<String>;
	fn is_text(&self, node: NodeId) -> bool {
		self.text(node).is_some()
	}
	fn set_text(&mut self, node: NodeId, text: &str);

	fn parent(&self, node: NodeId) -> Option<NodeId>;
	fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
	fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;

	/// Inserts (or moves, if it is already attached somewhere) `node` into `parent` before
	/// `reference`, or at the end if `reference` is `None`.
	fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>);
	/// Detaches `node` from its parent. Detached nodes stay valid.
	fn remove(&mut self, node: NodeId);

	fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
	fn remove_attribute(&mut self, node: NodeId, name: &str);
	/// Replaces the listener for `event` on `node`, or removes it for `None`.
	fn set_listener(&mut self, node: NodeId, event: &str, handler: Option<EventHandler>);

	/// Attributes present on a node the engine didn't create (for hydration).
	fn attributes(&self, _node: NodeId) -> Vec<(String, String)> {
		Vec::new()
	}

	/// The engine no longer refers to `node`, which is detached or below a detached node.
	///
	/// Hosts may drop their handle and reuse the id. A node that is later reached again through
	/// [`Host::child_nodes`], [`Host::parent`] or [`Host::next_sibling`] is registered anew.
	fn release(&mut self, _node: NodeId) {}
}
