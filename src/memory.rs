//! An arena-backed [`Host`] that counts mutations, for native use and tests.

use crate::{
	host::{Event, Host, NodeId},
	value::EventHandler,
};
use core::fmt::Write as _;
use hashbrown::HashMap;
use std::{
	cell::{Ref, RefCell},
	collections::BTreeMap,
	rc::Rc,
};
use tracing::{trace, warn};

/// How many primitive mutations a [`MemoryHost`] has seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mutations {
	pub elements_created: usize,
	pub texts_created: usize,
	pub insertions: usize,
	pub removals: usize,
	pub attributes_set: usize,
	pub attributes_removed: usize,
	pub texts_set: usize,
	pub listeners_added: usize,
	pub listeners_removed: usize,
}
impl Mutations {
	#[must_use]
	pub fn created(&self) -> usize {
		self.elements_created + self.texts_created
	}

	#[must_use]
	pub fn total(&self) -> usize {
		self.created() + self.insertions + self.removals + self.attributes_set + self.attributes_removed + self.texts_set + self.listeners_added + self.listeners_removed
	}
}

#[derive(Debug)]
enum Kind {
	Element {
		tag: String,
		svg: bool,
		attributes: BTreeMap<String, String>,
		listeners: HashMap<String, EventHandler>,
	},
	Text(String),
}

#[derive(Debug)]
struct Node {
	kind: Kind,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	marker: Option<String>,
	/// Handed back through [`Host::release`] and not reached since.
	released: bool,
}

#[derive(Debug, Default)]
struct Document {
	nodes: Vec<Node>,
	mutations: Mutations,
}
impl Document {
	fn push(&mut self, kind: Kind) -> NodeId {
		let id = NodeId::new(self.nodes.len());
		self.nodes.push(Node {
			kind,
			parent: None,
			children: Vec::new(),
			marker: None,
			released: false,
		});
		id
	}

	fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.index()]
	}

	fn node_mut(&mut self, id: NodeId) -> &mut Node {
		&mut self.nodes[id.index()]
	}

	/// Nodes the engine reaches by traversal are in use again.
	fn adopt(&mut self, ids: impl IntoIterator<Item = NodeId>) {
		for id in ids {
			self.node_mut(id).released = false;
		}
	}

	fn detach(&mut self, id: NodeId) -> bool {
		match self.node_mut(id).parent.take() {
			Some(parent) => {
				self.node_mut(parent).children.retain(|&child| child != id);
				true
			}
			None => false,
		}
	}

	fn write_html(&self, id: NodeId, out: &mut String) {
		let node = self.node(id);
		match &node.kind {
			Kind::Text(text) => escape(text, false, out),
			Kind::Element { tag, attributes, .. } => {
				let _ = write!(out, "<{}", tag);
				for (name, value) in attributes {
					let _ = write!(out, " {}=\"", name);
					escape(value, true, out);
					out.push('"');
				}
				out.push('>');
				for &child in &node.children {
					self.write_html(child, out);
				}
				let _ = write!(out, "</{}>", tag);
			}
		}
	}
}

fn escape(text: &str, attribute: bool, out: &mut String) {
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' if attribute => out.push_str("&quot;"),
			c => out.push(c),
		}
	}
}

/// An in-memory document.
///
/// Clones share the same document, so a test can keep a handle while a [`Renderer`](`crate::Renderer`)
/// owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost(Rc<RefCell<Document>>);

impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached element to render into. Not counted as a mutation.
	#[must_use]
	pub fn create_root(&self, tag: &str) -> NodeId {
		self.0.borrow_mut().push(Kind::Element {
			tag: tag.to_owned(),
			svg: false,
			attributes: BTreeMap::new(),
			listeners: HashMap::new(),
		})
	}

	/// Builds pre-existing markup under `parent` (as if server-rendered). Not counted.
	pub fn append_element(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
		let mut document = self.0.borrow_mut();
		let id = document.push(Kind::Element {
			tag: tag.to_owned(),
			svg: false,
			attributes: attributes.iter().map(|&(name, value)| (name.to_owned(), value.to_owned())).collect(),
			listeners: HashMap::new(),
		});
		document.node_mut(id).parent = Some(parent);
		document.node_mut(parent).children.push(id);
		id
	}

	/// See [`MemoryHost::append_element`].
	pub fn append_text(&self, parent: NodeId, text: &str) -> NodeId {
		let mut document = self.0.borrow_mut();
		let id = document.push(Kind::Text(text.to_owned()));
		document.node_mut(id).parent = Some(parent);
		document.node_mut(parent).children.push(id);
		id
	}

	#[must_use]
	pub fn mutations(&self) -> Mutations {
		self.0.borrow().mutations
	}

	pub fn reset_mutations(&self) {
		self.0.borrow_mut().mutations = Mutations::default();
	}

	/// Serializes `node` and its subtree. Attributes are written in name order.
	#[must_use]
	pub fn to_html(&self, node: NodeId) -> String {
		let mut out = String::new();
		self.0.borrow().write_html(node, &mut out);
		out
	}

	/// Serializes the children of `node`.
	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let document = self.0.borrow();
		let mut out = String::new();
		for &child in &document.node(node).children {
			document.write_html(child, &mut out);
		}
		out
	}

	#[must_use]
	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		self.0.borrow().node(node).children.clone()
	}

	#[must_use]
	pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
		match &self.0.borrow().node(node).kind {
			Kind::Element { attributes, .. } => attributes.get(name).cloned(),
			Kind::Text(_) => None,
		}
	}

	#[must_use]
	pub fn is_svg(&self, node: NodeId) -> bool {
		matches!(self.0.borrow().node(node).kind, Kind::Element { svg: true, .. })
	}

	#[must_use]
	pub fn listener_count(&self, node: NodeId) -> usize {
		match &self.0.borrow().node(node).kind {
			Kind::Element { listeners, .. } => listeners.len(),
			Kind::Text(_) => 0,
		}
	}

	/// Runs the listener for `event.kind` on `node`, if any. Returns whether one ran.
	///
	/// The event's target is set to `node` unless it already has one.
	pub fn dispatch(&self, node: NodeId, event: &Event) -> bool {
		let handler = match &self.0.borrow().node(node).kind {
			Kind::Element { listeners, .. } => listeners.get(&event.kind).cloned(),
			Kind::Text(_) => None,
		};
		match handler {
			Some(handler) => {
				let mut event = event.clone();
				event.target.get_or_insert(node);
				handler.call(&event);
				true
			}
			None => false,
		}
	}

	/// Tags a node so tests can tell whether it survived a diff.
	pub fn set_marker(&self, node: NodeId, marker: &str) {
		self.0.borrow_mut().node_mut(node).marker = Some(marker.to_owned());
	}

	#[must_use]
	pub fn marker(&self, node: NodeId) -> Option<String> {
		self.0.borrow().node(node).marker.clone()
	}

	/// Whether the engine has released `node` (see [`Host::release`]) and not reached it since.
	#[must_use]
	pub fn is_released(&self, node: NodeId) -> bool {
		self.0.borrow().node(node).released
	}

	fn document(&self) -> Ref<'_, Document> {
		self.0.borrow()
	}
}

impl Host for MemoryHost {
	fn create_element(&mut self, tag: &str, svg: bool) -> NodeId {
		let mut document = self.0.borrow_mut();
		document.mutations.elements_created += 1;
		let id = document.push(Kind::Element {
			tag: tag.to_owned(),
			svg,
			attributes: BTreeMap::new(),
			listeners: HashMap::new(),
		});
		trace!(?id, tag, svg, "create_element");
		id
	}

	fn create_text(&mut self, text: &str) -> NodeId {
		let mut document = self.0.borrow_mut();
		document.mutations.texts_created += 1;
		document.push(Kind::Text(text.to_owned()))
	}

	fn tag_name(&self, node: NodeId) -> Option<String> {
		match &self.document().node(node).kind {
			Kind::Element { tag, .. } => Some(tag.clone()),
			Kind::Text(_) => None,
		}
	}

	fn text(&self, node: NodeId) -> Option<String> {
		match &self.document().node(node).kind {
			Kind::Text(text) => Some(text.clone()),
			Kind::Element { .. } => None,
		}
	}

	fn set_text(&mut self, node: NodeId, text: &str) {
		let mut document = self.0.borrow_mut();
		match &mut document.node_mut(node).kind {
			Kind::Text(current) => {
				*current = text.to_owned();
			}
			Kind::Element { .. } => return warn!(?node, "set_text on an element"),
		}
		document.mutations.texts_set += 1;
	}

	fn parent(&self, node: NodeId) -> Option<NodeId> {
		let mut document = self.0.borrow_mut();
		let parent = document.node(node).parent;
		document.adopt(parent);
		parent
	}

	fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
		let mut document = self.0.borrow_mut();
		let parent = document.node(node).parent?;
		let siblings = &document.node(parent).children;
		let position = siblings.iter().position(|&sibling| sibling == node)?;
		let next = siblings.get(position + 1).copied();
		document.adopt(next);
		next
	}

	fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
		let mut document = self.0.borrow_mut();
		let children = document.node(node).children.clone();
		document.adopt(children.iter().copied());
		children
	}

	fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
		let mut document = self.0.borrow_mut();
		document.detach(node);
		let siblings = &mut document.node_mut(parent).children;
		let position = reference.and_then(|reference| siblings.iter().position(|&sibling| sibling == reference)).unwrap_or_else(|| siblings.len());
		siblings.insert(position, node);
		document.node_mut(node).parent = Some(parent);
		document.mutations.insertions += 1;
	}

	fn remove(&mut self, node: NodeId) {
		let mut document = self.0.borrow_mut();
		if document.detach(node) {
			document.mutations.removals += 1;
		}
	}

	fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
		let mut document = self.0.borrow_mut();
		match &mut document.node_mut(node).kind {
			Kind::Element { attributes, .. } => {
				attributes.insert(name.to_owned(), value.to_owned());
			}
			Kind::Text(_) => return warn!(?node, name, "set_attribute on a text node"),
		}
		document.mutations.attributes_set += 1;
	}

	fn remove_attribute(&mut self, node: NodeId, name: &str) {
		let mut document = self.0.borrow_mut();
		let removed = match &mut document.node_mut(node).kind {
			Kind::Element { attributes, .. } => attributes.remove(name).is_some(),
			Kind::Text(_) => false,
		};
		if removed {
			document.mutations.attributes_removed += 1;
		}
	}

	fn set_listener(&mut self, node: NodeId, event: &str, handler: Option<EventHandler>) {
		let mut document = self.0.borrow_mut();
		let (added, removed) = match &mut document.node_mut(node).kind {
			Kind::Element { listeners, .. } => match handler {
				Some(handler) => (listeners.insert(event.to_owned(), handler).is_none(), false),
				None => (false, listeners.remove(event).is_some()),
			},
			Kind::Text(_) => return warn!(?node, event, "set_listener on a text node"),
		};
		if added {
			document.mutations.listeners_added += 1;
		}
		if removed {
			document.mutations.listeners_removed += 1;
		}
	}

	fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
		match &self.document().node(node).kind {
			Kind::Element { attributes, .. } => attributes.iter().map(|(name, value)| (name.clone(), value.clone())).collect(),
			Kind::Text(_) => Vec::new(),
		}
	}

	fn release(&mut self, node: NodeId) {
		let mut document = self.0.borrow_mut();
		let node_data = document.node_mut(node);
		if node_data.released {
			return warn!(?node, "Released twice.");
		}
		node_data.released = true;
		trace!(?node, "release");
	}
}

#[cfg(test)]
mod tests {
	use super::MemoryHost;
	use crate::host::Host;

	#[test]
	fn insert_before_moves() {
		let mut host = MemoryHost::new();
		let root = host.create_root("div");
		let a = host.create_text("a");
		let b = host.create_text("b");
		host.insert_before(root, a, None);
		host.insert_before(root, b, None);
		host.insert_before(root, b, Some(a));
		assert_eq!(host.children(root), vec![b, a]);
		assert_eq!(host.next_sibling(b), Some(a));
		assert_eq!(host.inner_html(root), "ba");
		assert_eq!(host.mutations().insertions, 3);
	}

	#[test]
	fn serializes_escaped() {
		let mut host = MemoryHost::new();
		let root = host.create_root("div");
		let p = host.create_element("p", false);
		host.set_attribute(p, "title", "\"x\" & y");
		host.insert_before(root, p, None);
		let text = host.create_text("<b>");
		host.insert_before(p, text, None);
		assert_eq!(host.to_html(root), "<div><p title=\"&quot;x&quot; &amp; y\">&lt;b&gt;</p></div>");
	}

	#[test]
	fn traversal_adopts_released_nodes() {
		let mut host = MemoryHost::new();
		let root = host.create_root("div");
		let p = host.create_element("p", false);
		let text = host.create_text("t");
		host.insert_before(root, p, None);
		host.insert_before(p, text, None);

		host.release(text);
		assert!(host.is_released(text));
		assert_eq!(host.children(p), vec![text]);
		assert!(host.is_released(text));

		assert_eq!(host.child_nodes(p), vec![text]);
		assert!(!host.is_released(text));

		host.release(p);
		assert_eq!(host.parent(text), Some(p));
		assert!(!host.is_released(p));
	}
}
