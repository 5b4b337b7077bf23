//! A [`Host`] backed by the browser DOM through `web-sys`.

use crate::{
	host::{Event, Host, NodeId},
	load::load_attributes,
	options::Debounce,
	value::{EventHandler, Value},
};
use hashbrown::HashMap;
use js_sys::{Function, Object, Reflect, WeakMap};
use std::{
	cell::{Cell, RefCell},
	rc::{Rc, Weak},
};
use tracing::{error, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element, Node, Text};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

type Slot = Rc<RefCell<Option<EventHandler>>>;

/// One DOM listener per node and event name. Rebinding only swaps the slot's content.
struct Listener {
	closure: Closure<dyn FnMut(web_sys::Event)>,
	slot: Slot,
}

struct Registry {
	document: Document,
	/// `None` for released ids.
	nodes: Vec<Option<Node>>,
	/// Released ids, reused first.
	free: Vec<usize>,
	ids: WeakMap,
	listeners: HashMap<(NodeId, String), Listener>,
	/// Listeners removed while an event was being dispatched. Dropping them right away could
	/// destroy the closure that is currently running.
	retired: Vec<Listener>,
	dispatch_depth: Rc<Cell<usize>>,
}

impl Registry {
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn lookup(&self, node: &Node) -> Option<NodeId> {
		self.ids.get(node.unchecked_ref::<Object>()).as_f64().map(|index| NodeId::new(index as usize))
	}

	#[allow(clippy::cast_precision_loss)]
	fn register(&mut self, node: Node) -> NodeId {
		if let Some(id) = self.lookup(&node) {
			return id;
		}
		let id = NodeId::new(self.free.pop().unwrap_or_else(|| self.nodes.len()));
		self.ids.set(node.unchecked_ref::<Object>(), &JsValue::from_f64(id.index() as f64));
		match self.nodes.get_mut(id.index()) {
			Some(slot) => *slot = Some(node),
			None => self.nodes.push(Some(node)),
		}
		id
	}

	/// Forgets `id`'s node and any listeners still bound to it.
	fn release(&mut self, id: NodeId) {
		let node = match self.nodes.get_mut(id.index()).and_then(Option::take) {
			Some(node) => node,
			None => return warn!(?id, "Released twice."),
		};
		self.ids.delete(node.unchecked_ref::<Object>());
		self.free.push(id.index());

		let keys: Vec<_> = self.listeners.keys().filter(|(node, _)| *node == id).cloned().collect();
		let dispatching = self.dispatch_depth.get() > 0;
		for key in keys {
			if let Some(listener) = self.listeners.remove(&key) {
				*listener.slot.borrow_mut() = None;
				if let Err(error) = node.remove_event_listener_with_callback(&key.1, listener.closure.as_ref().unchecked_ref::<Function>()) {
					error!(?id, event = %key.1, ?error, "removeEventListener failed.");
				}
				if dispatching {
					self.retired.push(listener);
				}
			}
		}
		trace!(?id, "Released.");
	}
}

/// A browser document.
///
/// Clones share the same node table. Nodes that weren't created through this host are
/// registered the first time they are seen, so existing markup can be rendered into (and is
/// hydrated: see [`Renderer::render`](`crate::Renderer::render`)).
#[derive(Clone)]
pub struct WebHost(Rc<RefCell<Registry>>);

impl WebHost {
	#[must_use]
	pub fn new(document: Document) -> Self {
		Self(Rc::new(RefCell::new(Registry {
			document,
			nodes: Vec::new(),
			free: Vec::new(),
			ids: WeakMap::new(),
			listeners: HashMap::new(),
			retired: Vec::new(),
			dispatch_depth: Rc::new(Cell::new(0)),
		})))
	}

	/// Registers an existing DOM node, typically the element to render into.
	pub fn adopt(&self, node: &Node) -> NodeId {
		self.0.borrow_mut().register(node.clone())
	}

	/// The DOM node behind `id`, or `None` once the id was released.
	#[must_use]
	pub fn node(&self, id: NodeId) -> Option<Node> {
		self.0.borrow().nodes.get(id.index()).cloned().flatten()
	}

	/// Like [`WebHost::node`], but logs released ids.
	fn live(&self, id: NodeId) -> Option<Node> {
		let node = self.node(id);
		if node.is_none() {
			error!(?id, "Node id was released.");
		}
		node
	}

	fn element(&self, id: NodeId) -> Option<Element> {
		self.live(id)?.dyn_into::<Element>().ok()
	}

	fn register(&self, node: Node) -> NodeId {
		self.0.borrow_mut().register(node)
	}

	fn listener(&self, node: NodeId, event: &str, handler: EventHandler) -> Listener {
		let slot: Slot = Rc::new(RefCell::new(Some(handler)));
		let registry = Rc::downgrade(&self.0);
		let closure = Closure::wrap(Box::new({
			let slot = Rc::clone(&slot);
			let event_name = event.to_owned();
			move |event: web_sys::Event| dispatch(&registry, &slot, node, &event_name, &event)
		}) as Box<dyn FnMut(web_sys::Event)>);
		Listener { closure, slot }
	}
}

fn dispatch(registry: &Weak<RefCell<Registry>>, slot: &Slot, node: NodeId, event_name: &str, event: &web_sys::Event) {
	let span = trace_span!("Dispatching", ?node, event = event_name);
	let _enter = span.enter();

	let registry = match registry.upgrade() {
		Some(registry) => registry,
		None => return warn!("Event dispatched after its host was dropped."),
	};
	let handler = slot.borrow().clone();
	let handler = match handler {
		Some(handler) => handler,
		None => return trace!("Listener was unbound."),
	};
	let (translated, depth) = {
		let registry = registry.borrow();
		let target = event.target().and_then(|target| target.dyn_into::<Node>().ok()).and_then(|target| registry.lookup(&target));
		(translate(event, target), Rc::clone(&registry.dispatch_depth))
	};

	depth.set(depth.get() + 1);
	handler.call(&translated);
	depth.set(depth.get() - 1);
}

/// Copies the fields handlers commonly read off form controls.
fn translate(event: &web_sys::Event, target: Option<NodeId>) -> Event {
	let mut translated = Event::new(event.type_());
	translated.target = target;
	if let Some(target) = event.target() {
		let target: &JsValue = target.as_ref();
		for &name in &["value", "checked", "type"] {
			let value = match Reflect::get(target, &JsValue::from_str(name)) {
				Ok(value) => value,
				Err(_) => continue,
			};
			if let Some(text) = value.as_string() {
				translated.detail.insert(name.to_owned(), Value::from(text));
			} else if let Some(flag) = value.as_bool() {
				translated.detail.insert(name.to_owned(), Value::from(flag));
			}
		}
	}
	translated
}

impl Host for WebHost {
	fn create_element(&mut self, tag: &str, svg: bool) -> NodeId {
		let document = self.0.borrow().document.clone();
		let created = if svg { document.create_element_ns(Some(SVG_NAMESPACE), tag) } else { document.create_element(tag) };
		match created {
			Ok(element) => self.register(element.into()),
			Err(error) => {
				error!(tag, ?error, "Failed to create element. Substituting an empty text node.");
				self.register(document.create_text_node("").into())
			}
		}
	}

	fn create_text(&mut self, text: &str) -> NodeId {
		let document = self.0.borrow().document.clone();
		self.register(document.create_text_node(text).into())
	}

	fn tag_name(&self, node: NodeId) -> Option<String> {
		self.element(node).map(|element| element.tag_name())
	}

	fn text(&self, node: NodeId) -> Option<String> {
		self.live(node)?.dyn_ref::<Text>().map(|text| text.data())
	}

	fn set_text(&mut self, node: NodeId, text: &str) {
		if let Some(node) = self.live(node) {
			node.set_text_content(Some(text));
		}
	}

	fn parent(&self, node: NodeId) -> Option<NodeId> {
		let parent = self.live(node)?.parent_node()?;
		Some(self.register(parent))
	}

	fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
		let next = self.live(node)?.next_sibling()?;
		Some(self.register(next))
	}

	fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
		let children = match self.live(node) {
			Some(node) => node.child_nodes(),
			None => return Vec::new(),
		};
		(0..children.length()).filter_map(|i| children.item(i)).map(|child| self.register(child)).collect()
	}

	fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
		let (parent_node, child) = match (self.live(parent), self.live(node)) {
			(Some(parent_node), Some(child)) => (parent_node, child),
			_ => return,
		};
		let reference = reference.and_then(|reference| self.live(reference));
		if let Err(error) = parent_node.insert_before(&child, reference.as_ref()) {
			error!(?parent, ?node, ?error, "insertBefore failed.");
		}
	}

	fn remove(&mut self, node: NodeId) {
		let child = match self.live(node) {
			Some(child) => child,
			None => return,
		};
		if let Some(parent) = child.parent_node() {
			if let Err(error) = parent.remove_child(&child) {
				error!(?node, ?error, "removeChild failed.");
			}
		}
	}

	fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
		match self.element(node) {
			Some(element) => {
				if let Err(error) = element.set_attribute(name, value) {
					if cfg!(feature = "dangerous-logging") {
						error!(?node, name, value, ?error, "setAttribute failed.");
					} else {
						error!(?node, name, ?error, "setAttribute failed.");
					}
				}
			}
			None => warn!(?node, name, "setAttribute on a non-element."),
		}
	}

	fn remove_attribute(&mut self, node: NodeId, name: &str) {
		if let Some(element) = self.element(node) {
			if let Err(error) = element.remove_attribute(name) {
				error!(?node, name, ?error, "removeAttribute failed.");
			}
		}
	}

	fn set_listener(&mut self, node: NodeId, event: &str, handler: Option<EventHandler>) {
		let key = (node, event.to_owned());
		let dispatching = self.0.borrow().dispatch_depth.get() > 0;
		if !dispatching {
			self.0.borrow_mut().retired.clear();
		}

		let existing = self.0.borrow().listeners.get(&key).map(|listener| Rc::clone(&listener.slot));
		match (existing, handler) {
			(Some(slot), Some(handler)) => {
				*slot.borrow_mut() = Some(handler);
			}
			(Some(slot), None) => {
				*slot.borrow_mut() = None;
				let removed = self.0.borrow_mut().listeners.remove(&key);
				if let Some(listener) = removed {
					let removal = self.live(node).map(|target| target.remove_event_listener_with_callback(event, listener.closure.as_ref().unchecked_ref::<Function>()));
					if let Some(Err(error)) = removal {
						error!(?node, event, ?error, "removeEventListener failed.");
					}
					if dispatching {
						self.0.borrow_mut().retired.push(listener);
					}
				}
			}
			(None, Some(handler)) => {
				let target = match self.live(node) {
					Some(target) => target,
					None => return,
				};
				let listener = self.listener(node, event, handler);
				if let Err(error) = target.add_event_listener_with_callback(event, listener.closure.as_ref().unchecked_ref::<Function>()) {
					error!(?node, event, ?error, "addEventListener failed.");
					return;
				}
				self.0.borrow_mut().listeners.insert(key, listener);
			}
			(None, None) => (),
		}
	}

	fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
		self.element(node).map(|element| load_attributes(&element.attributes())).unwrap_or_default()
	}

	fn release(&mut self, node: NodeId) {
		self.0.borrow_mut().release(node);
	}
}

/// A [`Debounce`] that flushes in a microtask, like a browser framework would.
#[must_use]
pub fn microtask() -> Debounce {
	Debounce::Custom(Rc::new(|task: Box<dyn FnOnce()>| {
		let queue = Reflect::get(&js_sys::global(), &JsValue::from_str("queueMicrotask")).ok().and_then(|queue| queue.dyn_into::<Function>().ok());
		match queue {
			Some(queue) => {
				let callback = Closure::once_into_js(move || task());
				if let Err(error) = queue.call1(&JsValue::UNDEFINED, &callback) {
					error!(?error, "queueMicrotask failed.");
				}
			}
			None => {
				warn!("queueMicrotask is unavailable. Flushing synchronously.");
				task();
			}
		}
	}))
}
