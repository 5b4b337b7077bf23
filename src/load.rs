//! Reads existing DOM content into virtual nodes and attribute lists.
//!
//! [`WebHost`](`crate::WebHost`) uses this to adopt server-rendered markup, and it is handy for
//! comparing a live subtree against what was rendered.

use crate::{
	value::{Map, Value},
	vnode::{h, VNode},
};
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Attr, Element, NamedNodeMap, Node, NodeList, Text};

/// Loads element and text children. Other node types (comments, processing instructions) are
/// skipped.
#[must_use]
pub fn load_child_nodes(child_nodes: &NodeList) -> Vec<VNode> {
	(0..child_nodes.length())
		.filter_map(|i| child_nodes.item(i))
		.filter_map(|child| {
			if let Some(element) = child.dyn_ref::<Element>() {
				Some(load_element(element))
			} else if let Some(text) = child.dyn_ref::<Text>() {
				Some(VNode::text(text.data()))
			} else {
				warn!(node_type = child.node_type(), "Skipping unsupported node.");
				None
			}
		})
		.collect()
}

/// Loads an element and its subtree. Tag names are lower-cased.
#[must_use]
pub fn load_element(element: &Element) -> VNode {
	let node: &Node = element.as_ref();
	let attributes: Map = load_attributes(&element.attributes()).into_iter().map(|(name, value)| (name, Value::from(value))).collect();
	h(element.tag_name().to_lowercase(), attributes, load_child_nodes(&node.child_nodes()))
}

#[must_use]
pub fn load_attributes(attributes: &NamedNodeMap) -> Vec<(String, String)> {
	(0..attributes.length()).filter_map(|i| attributes.item(i)).map(|attribute| load_attribute(&attribute)).collect()
}

#[must_use]
pub fn load_attribute(attribute: &Attr) -> (String, String) {
	(attribute.local_name(), attribute.value())
}
