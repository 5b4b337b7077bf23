use crate::{component::ComponentRef, host::Event, host::NodeId};
use core::fmt;
use std::{collections::BTreeMap, rc::Rc};

/// Attribute, prop, state and context mappings.
///
/// Ordered, so that attribute mutations are applied in a deterministic order.
pub type Map = BTreeMap<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(Rc<str>),
	List(Vec<Value>),
	Map(Map),
	Handler(EventHandler),
	Ref(RefCallback),
}

impl Value {
	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_bool(&self) -> Option<bool> {
		match *self {
			Value::Bool(b) => Some(b),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_int(&self) -> Option<i64> {
		match *self {
			Value::Int(i) => Some(i),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_map(&self) -> Option<&Map> {
		match self {
			Value::Map(map) => Some(map),
			_ => None,
		}
	}

	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Null | Value::Bool(false) => false,
			Value::Int(i) => *i != 0,
			Value::Float(f) => *f != 0.0 && !f.is_nan(),
			Value::Str(s) => !s.is_empty(),
			Value::Bool(true) | Value::List(_) | Value::Map(_) | Value::Handler(_) | Value::Ref(_) => true,
		}
	}

	/// One step of a dotted path: a map key or a list index.
	#[must_use]
	pub fn child(&self, segment: &str) -> Option<&Value> {
		match self {
			Value::Map(map) => map.get(segment),
			Value::List(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
			_ => None,
		}
	}

	/// The string written into a real attribute, or `None` if the attribute should be absent.
	///
	/// Lists and maps render like class lists: list items joined by spaces, and the keys of
	/// truthy map entries joined by spaces.
	#[must_use]
	pub fn to_attribute_value(&self) -> Option<String> {
		match self {
			Value::Null | Value::Bool(false) | Value::Handler(_) | Value::Ref(_) => None,
			Value::Bool(true) => Some(String::new()),
			Value::Int(i) => Some(i.to_string()),
			Value::Float(f) => Some(f.to_string()),
			Value::Str(s) => Some(s.to_string()),
			Value::List(items) => Some(items.iter().filter_map(Value::to_attribute_value).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")),
			Value::Map(map) => Some(map.iter().filter(|(_, v)| v.is_truthy()).map(|(k, _)| k.as_str()).collect::<Vec<_>>().join(" ")),
		}
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::Str(s.into())
	}
}
impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::Str(s.into())
	}
}
impl From<Rc<str>> for Value {
	fn from(s: Rc<str>) -> Self {
		Value::Str(s)
	}
}
impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Bool(b)
	}
}
impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Value::Int(i.into())
	}
}
impl From<u32> for Value {
	fn from(i: u32) -> Self {
		Value::Int(i.into())
	}
}
impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Int(i)
	}
}
impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Float(f)
	}
}
impl From<Vec<Value>> for Value {
	fn from(list: Vec<Value>) -> Self {
		Value::List(list)
	}
}
impl From<Map> for Value {
	fn from(map: Map) -> Self {
		Value::Map(map)
	}
}
impl From<EventHandler> for Value {
	fn from(handler: EventHandler) -> Self {
		Value::Handler(handler)
	}
}
impl From<RefCallback> for Value {
	fn from(callback: RefCallback) -> Self {
		Value::Ref(callback)
	}
}
impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}

/// Sibling identity used for keyed child matching.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
	Int(i64),
	Str(Rc<str>),
}
impl Key {
	pub(crate) fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Int(i) => Some(Key::Int(*i)),
			Value::Str(s) => Some(Key::Str(Rc::clone(s))),
			Value::Float(f) => Some(Key::Str(f.to_string().into())),
			_ => None,
		}
	}
}
impl From<&str> for Key {
	fn from(s: &str) -> Self {
		Key::Str(s.into())
	}
}
impl From<i64> for Key {
	fn from(i: i64) -> Self {
		Key::Int(i)
	}
}
impl From<i32> for Key {
	fn from(i: i32) -> Self {
		Key::Int(i.into())
	}
}
impl From<Key> for Value {
	fn from(key: Key) -> Self {
		match key {
			Key::Int(i) => Value::Int(i),
			Key::Str(s) => Value::Str(s),
		}
	}
}
impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Int(i) => i.fmt(f),
			Key::Str(s) => s.fmt(f),
		}
	}
}

/// A shared event callback.
///
/// Equality is identity: two handlers are equal iff they are clones of the same handler.
/// The differ relies on this to skip rebinding listeners that didn't change.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);
impl EventHandler {
	pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &Event) {
		(self.0)(event)
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::as_ptr(&self.0).cast::<()>() == Rc::as_ptr(&other.0).cast::<()>()
	}
}
impl PartialEq for EventHandler {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}
impl fmt::Debug for EventHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0).cast::<()>())
	}
}

/// What a `ref` callback is attached to.
#[derive(Clone, Debug, PartialEq)]
pub enum RefTarget {
	Element(NodeId),
	Component(ComponentRef),
}

/// The `ref` attribute: called with the element or component once attached, and with `None`
/// when it is detached.
#[derive(Clone)]
pub struct RefCallback(Rc<dyn Fn(Option<RefTarget>)>);
impl RefCallback {
	pub fn new(callback: impl Fn(Option<RefTarget>) + 'static) -> Self {
		Self(Rc::new(callback))
	}

	pub fn call(&self, target: Option<RefTarget>) {
		(self.0)(target)
	}
}
impl PartialEq for RefCallback {
	fn eq(&self, other: &Self) -> bool {
		Rc::as_ptr(&self.0).cast::<()>() == Rc::as_ptr(&other.0).cast::<()>()
	}
}
impl fmt::Debug for RefCallback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RefCallback({:p})", Rc::as_ptr(&self.0).cast::<()>())
	}
}
