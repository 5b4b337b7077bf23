//! Virtual nodes and the descriptor constructor [`h`].

use crate::{
	component::{ComponentType, Props},
	value::{Key, Map, RefCallback, Value},
};
use std::rc::Rc;

/// Immutable descriptor of a desired real node.
///
/// The node kind is resolved once, at construction, so the differ switches on an explicit
/// variant instead of inspecting values at runtime. Cloning is cheap.
#[derive(Clone, Debug, PartialEq)]
pub enum VNode {
	Text(Rc<str>),
	Element(Rc<Element>),
	Component(Rc<ComponentElement>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
	pub(crate) tag: Rc<str>,
	pub(crate) attributes: Map,
	pub(crate) children: Vec<VNode>,
	pub(crate) key: Option<Key>,
}
impl Element {
	#[must_use]
	pub fn tag(&self) -> &str {
		&self.tag
	}

	#[must_use]
	pub fn attributes(&self) -> &Map {
		&self.attributes
	}

	#[must_use]
	pub fn children(&self) -> &[VNode] {
		&self.children
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentElement {
	pub(crate) ty: ComponentType,
	pub(crate) attributes: Map,
	pub(crate) children: Vec<VNode>,
	pub(crate) key: Option<Key>,
}
impl ComponentElement {
	#[must_use]
	pub fn component_type(&self) -> ComponentType {
		self.ty
	}

	#[must_use]
	pub fn attributes(&self) -> &Map {
		&self.attributes
	}

	#[must_use]
	pub fn children(&self) -> &[VNode] {
		&self.children
	}

	/// The props an instance receives: attributes without `key` and `ref`, plus the children.
	#[must_use]
	pub fn props(&self) -> Props {
		let attributes = self.attributes.iter().filter(|(name, _)| name.as_str() != "key" && name.as_str() != "ref").map(|(name, value)| (name.clone(), value.clone())).collect();
		Props::new(attributes, self.children.clone())
	}

	pub(crate) fn component_ref(&self) -> Option<RefCallback> {
		match self.attributes.get("ref") {
			Some(Value::Ref(callback)) => Some(callback.clone()),
			_ => None,
		}
	}
}

impl VNode {
	pub fn text(text: impl Into<Rc<str>>) -> Self {
		VNode::Text(text.into())
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		match self {
			VNode::Text(_) => None,
			VNode::Element(element) => element.key.as_ref(),
			VNode::Component(component) => component.key.as_ref(),
		}
	}

	#[must_use]
	pub fn attributes(&self) -> Option<&Map> {
		match self {
			VNode::Text(_) => None,
			VNode::Element(element) => Some(&element.attributes),
			VNode::Component(component) => Some(&component.attributes),
		}
	}

	#[must_use]
	pub fn children(&self) -> &[VNode] {
		match self {
			VNode::Text(_) => &[],
			VNode::Element(element) => &element.children,
			VNode::Component(component) => &component.children,
		}
	}
}
impl From<&str> for VNode {
	fn from(text: &str) -> Self {
		VNode::text(text)
	}
}
impl From<String> for VNode {
	fn from(text: String) -> Self {
		VNode::text(text)
	}
}

/// What a [`VNode`] builds: a real element or a component instance.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeName {
	Tag(Rc<str>),
	Component(ComponentType),
}
impl From<&str> for NodeName {
	fn from(tag: &str) -> Self {
		NodeName::Tag(tag.into())
	}
}
impl From<String> for NodeName {
	fn from(tag: String) -> Self {
		NodeName::Tag(tag.into())
	}
}
impl From<ComponentType> for NodeName {
	fn from(ty: ComponentType) -> Self {
		NodeName::Component(ty)
	}
}

/// Builds a [`VNode`] from a node name, its attributes and children.
///
/// The key is taken from `attributes["key"]`. Adjacent text children are merged into one.
pub fn h(name: impl Into<NodeName>, attributes: Map, children: impl IntoIterator<Item = VNode>) -> VNode {
	let mut merged: Vec<VNode> = Vec::new();
	for child in children {
		if let VNode::Text(next) = &child {
			if let Some(VNode::Text(previous)) = merged.last_mut() {
				*previous = format!("{}{}", previous, next).into();
				continue;
			}
		}
		merged.push(child);
	}

	let key = attributes.get("key").and_then(Key::from_value);
	match name.into() {
		NodeName::Tag(tag) => VNode::Element(Rc::new(Element {
			tag,
			attributes,
			children: merged,
			key,
		})),
		NodeName::Component(ty) => VNode::Component(Rc::new(ComponentElement {
			ty,
			attributes,
			children: merged,
			key,
		})),
	}
}

/// Copies `vnode` with `props` shallowly merged over its attributes.
///
/// `children`, if given, replace the original children. Text nodes are returned unchanged.
#[must_use]
pub fn clone_element(vnode: &VNode, props: Map, children: Option<Vec<VNode>>) -> VNode {
	let (name, attributes, original_children) = match vnode {
		VNode::Text(_) => return vnode.clone(),
		VNode::Element(element) => (NodeName::Tag(Rc::clone(&element.tag)), &element.attributes, &element.children),
		VNode::Component(component) => (NodeName::Component(component.ty), &component.attributes, &component.children),
	};
	let mut attributes = attributes.clone();
	attributes.extend(props);
	h(name, attributes, children.unwrap_or_else(|| original_children.clone()))
}

/// Builds a [`Map`] from `name => value` pairs, converting values with [`Value::from`].
#[macro_export]
macro_rules! attrs {
	() => {
		$crate::Map::new()
	};
	($($name:expr => $value:expr),+ $(,)?) => {{
		let mut map = $crate::Map::new();
		$(map.insert(::std::string::String::from($name), $crate::Value::from($value));)+
		map
	}};
}
