//! The reconciler: diffs virtual nodes against the live host tree and runs component lifecycles.
//!
//! Framework metadata never lives on host nodes. Instead, [`Differ`] keeps two side tables:
//! `owners` maps a component's base node to its outermost instance, and `records` holds the
//! attributes a node was last rendered with.

use crate::{
	attributes::{event_name, is_reserved, set_accessor},
	component::{ComponentRef, Context, Lifecycle, Props, RenderMode},
	error::{Error, Result},
	host::{Host, NodeId},
	lis::longest_increasing,
	options::Options,
	recycler::Recycler,
	renderer::Shared,
	value::{Key, Map, RefCallback, RefTarget, Value},
	vnode::{ComponentElement, Element, VNode},
};
use core::fmt;
use hashbrown::{hash_map::Entry, HashMap, HashSet};
use std::{
	cell::{Cell, Ref, RefCell, RefMut},
	collections::VecDeque,
	rc::{Rc, Weak},
};
use tracing::{instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};

/// What a node was last rendered with.
#[derive(Debug)]
struct NodeRecord {
	attributes: Map,
	svg: bool,
}
impl NodeRecord {
	fn key(&self) -> Option<Key> {
		self.attributes.get("key").and_then(Key::from_value)
	}

	fn element_ref(&self) -> Option<RefCallback> {
		match self.attributes.get("ref") {
			Some(Value::Ref(callback)) => Some(callback.clone()),
			_ => None,
		}
	}
}

/// Resets a component's rendering flag when a render attempt ends, however it ends.
struct RenderingGuard<'a>(&'a ComponentRef);
impl<'a> RenderingGuard<'a> {
	fn enter(component: &'a ComponentRef) -> Result<Self> {
		if component.is_rendering() {
			return Err(Error::ReentrantRender(component.name()));
		}
		component.set_rendering(true);
		Ok(Self(component))
	}
}
impl Drop for RenderingGuard<'_> {
	fn drop(&mut self) {
		self.0.set_rendering(false)
	}
}

pub(crate) struct Differ {
	host: RefCell<Box<dyn Host>>,
	recycler: RefCell<Recycler>,
	records: RefCell<HashMap<NodeId, NodeRecord>>,
	owners: RefCell<HashMap<NodeId, ComponentRef>>,
	/// Components whose `component_did_mount` is due once the outermost pass completes.
	mounts: RefCell<VecDeque<ComponentRef>>,
	depth: Cell<usize>,
	options: Options,
	shared: Weak<Shared>,
}

impl Differ {
	pub(crate) fn new(host: Box<dyn Host>, options: Options, shared: Weak<Shared>) -> Self {
		Self {
			host: RefCell::new(host),
			recycler: RefCell::default(),
			records: RefCell::default(),
			owners: RefCell::default(),
			mounts: RefCell::default(),
			depth: Cell::new(0),
			options,
			shared,
		}
	}

	fn host(&self) -> Ref<'_, Box<dyn Host>> {
		self.host.borrow()
	}

	fn host_mut(&self) -> RefMut<'_, Box<dyn Host>> {
		self.host.borrow_mut()
	}

	/// Whether a diff pass is running.
	pub(crate) fn is_busy(&self) -> bool {
		self.depth.get() > 0
	}

	pub(crate) fn owner(&self, node: NodeId) -> Option<ComponentRef> {
		self.owners.borrow().get(&node).cloned()
	}

	pub(crate) fn pooled_nodes(&self) -> usize {
		self.recycler.borrow().len()
	}

	pub(crate) fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
		self.host().child_nodes(node)
	}

	fn enter(&self) {
		self.depth.set(self.depth.get() + 1);
	}

	/// Leaves a pass. The outermost pass runs deferred mounts if it succeeded and drops them if
	/// it didn't.
	fn finish<T>(&self, result: Result<T>) -> Result<T> {
		let depth = self.depth.get() - 1;
		self.depth.set(depth);
		if depth > 0 {
			return result;
		}
		match result {
			Ok(value) => match self.flush_mounts() {
				Ok(()) => Ok(value),
				Err(error) => {
					self.mounts.borrow_mut().clear();
					Err(error)
				}
			},
			Err(error) => {
				self.mounts.borrow_mut().clear();
				Err(error)
			}
		}
	}

	fn flush_mounts(&self) -> Result<()> {
		loop {
			let next = self.mounts.borrow_mut().pop_front();
			let component = match next {
				Some(component) => component,
				None => return Ok(()),
			};
			if matches!(component.lifecycle(), Lifecycle::Unmounted | Lifecycle::Unmounting) {
				trace!(component = component.name(), "Skipping mount of an unmounted instance.");
				continue;
			}
			component.set_lifecycle(Lifecycle::Mounted);
			self.options.notify_after_mount(&component);
			component.call("component_did_mount", |behavior, this| behavior.component_did_mount(this))?;
		}
	}

	/// Reconciles `dom` with `vnode`. With no `vnode`, `dom` is released.
	#[instrument(level = "trace", skip(self, vnode, context))]
	pub(crate) fn diff(&self, dom: Option<NodeId>, vnode: Option<&VNode>, context: &Rc<Context>, parent: Option<NodeId>, svg: bool) -> Result<Option<NodeId>> {
		match (dom, vnode) {
			(None, None) => Ok(None),
			(Some(dom), None) => self.unmount(dom).map(|()| None),
			(dom, Some(vnode)) => self.patch(dom, vnode, context, parent, svg).map(Some),
		}
	}

	/// Reconciles `dom` with `vnode` and, if `parent` is given, makes sure the result is attached to it.
	#[instrument(level = "trace", skip(self, vnode, context))]
	pub(crate) fn patch(&self, dom: Option<NodeId>, vnode: &VNode, context: &Rc<Context>, parent: Option<NodeId>, svg: bool) -> Result<NodeId> {
		self.enter();
		let result = self.idiff(dom, vnode.clone(), context, svg).map(|out| {
			if let Some(parent) = parent {
				let current = self.host().parent(out);
				if current != Some(parent) {
					self.host_mut().insert_before(parent, out, None);
				}
			}
			out
		});
		self.finish(result)
	}

	/// Detaches `node`, unmounting any components rendered into it.
	#[instrument(level = "trace", skip(self))]
	pub(crate) fn unmount(&self, node: NodeId) -> Result<()> {
		self.enter();
		let result = self.recollect(node, false);
		self.finish(result)
	}

	/// Renders `component` as its own pass.
	pub(crate) fn render_component(&self, component: &ComponentRef, mode: RenderMode, is_child: bool) -> Result<()> {
		self.enter();
		let result = self.render_component_inner(component, mode, is_child);
		self.finish(result)
	}

	fn idiff(&self, dom: Option<NodeId>, vnode: VNode, context: &Rc<Context>, svg: bool) -> Result<NodeId> {
		let vnode = self.options.process_vnode(vnode);
		self.diff_node(dom, &vnode, context, svg)
	}

	fn diff_node(&self, dom: Option<NodeId>, vnode: &VNode, context: &Rc<Context>, svg: bool) -> Result<NodeId> {
		match vnode {
			VNode::Text(text) => self.diff_text(dom, text),
			VNode::Element(element) => self.diff_element(dom, element, context, svg),
			VNode::Component(component) => self.build_component(dom, component, context, svg),
		}
	}

	fn is_owned(&self, node: NodeId) -> bool {
		self.owners.borrow().contains_key(&node)
	}

	fn diff_text(&self, dom: Option<NodeId>, text: &str) -> Result<NodeId> {
		let span = if cfg!(feature = "dangerous-logging") {
			trace_span!("Diffing text", ?dom, text)
		} else {
			trace_span!("Diffing text", ?dom)
		};
		let _enter = span.enter();

		if let Some(dom) = dom {
			let current = self.host().text(dom);
			if let Some(current) = current.filter(|_| !self.is_owned(dom)) {
				if current != text {
					self.host_mut().set_text(dom, text);
				}
				return Ok(dom);
			}
		}

		let out = self.host_mut().create_text(text);
		if let Some(dom) = dom {
			self.replace(dom, out)?;
		}
		Ok(out)
	}

	/// Puts `new` where `old` is and recycles `old`.
	fn replace(&self, old: NodeId, new: NodeId) -> Result<()> {
		let (parent, next) = {
			let host = self.host();
			(host.parent(old), host.next_sibling(old))
		};
		self.recollect(old, false)?;
		if let Some(parent) = parent {
			self.host_mut().insert_before(parent, new, next);
		}
		Ok(())
	}

	fn diff_element(&self, dom: Option<NodeId>, element: &Element, context: &Rc<Context>, svg: bool) -> Result<NodeId> {
		let tag = element.tag();
		if tag.is_empty() || tag.chars().any(|c| c.is_whitespace() || c == '<' || c == '>' || c == '/') {
			return Err(Error::InvalidTagName(tag.to_owned()));
		}

		let span = trace_span!("Diffing element", ?dom, tag);
		let _enter = span.enter();

		let svg = svg || tag == "svg";
		let reusable = dom.filter(|&dom| {
			let current = self.host().tag_name(dom);
			!self.is_owned(dom) && current.map_or(false, |current| current.eq_ignore_ascii_case(tag))
		});
		let out = match reusable {
			Some(dom) => dom,
			None => {
				let out = {
					let mut host = self.host_mut();
					self.recycler.borrow_mut().create(&mut **host, tag, svg)
				};
				trace!(?out, "Created or reused element.");
				if let Some(dom) = dom {
					self.replace(dom, out)?;
				}
				out
			}
		};

		self.diff_children(out, element.children(), context, svg && tag != "foreignObject")?;
		self.diff_attributes(out, element.attributes(), svg);
		Ok(out)
	}

	/// Applies `attributes` to `node`, relative to what it was last rendered with.
	///
	/// Nodes without a record (not created by this differ, or fresh from the pool) are compared
	/// against what the host reports instead.
	fn diff_attributes(&self, node: NodeId, attributes: &Map, svg: bool) {
		let previous = self.records.borrow_mut().remove(&node);
		let old = match previous {
			Some(record) => record.attributes,
			None => {
				let hydrated = self.host().attributes(node);
				hydrated.into_iter().map(|(name, value)| (name, Value::from(value))).collect()
			}
		};

		{
			let mut host = self.host_mut();
			for (name, value) in &old {
				if !is_reserved(name) && !attributes.contains_key(name) {
					let span = trace_span!("Removing attribute", ?node, name = name.as_str());
					let _enter = span.enter();
					set_accessor(&mut **host, &self.options, node, name, Some(value), None);
				}
			}
			for (name, value) in attributes {
				if is_reserved(name) {
					continue;
				}
				let old_value = old.get(name);
				if old_value != Some(value) {
					let span = if cfg!(feature = "dangerous-logging") {
						trace_span!("Setting attribute", ?node, name = name.as_str(), ?value)
					} else {
						trace_span!("Setting attribute", ?node, name = name.as_str())
					};
					let _enter = span.enter();
					set_accessor(&mut **host, &self.options, node, name, old_value, Some(value));
				}
			}
		}

		let record = NodeRecord {
			attributes: attributes.clone(),
			svg,
		};
		let old_ref = match old.get("ref") {
			Some(Value::Ref(callback)) => Some(callback.clone()),
			_ => None,
		};
		let new_ref = record.element_ref();
		self.records.borrow_mut().insert(node, record);

		if old_ref != new_ref {
			if let Some(old_ref) = old_ref {
				old_ref.call(None);
			}
			if let Some(new_ref) = new_ref {
				new_ref.call(Some(RefTarget::Element(node)));
			}
		}
	}

	fn node_key(&self, node: NodeId) -> Option<Key> {
		let owner = self.owner(node);
		match owner {
			Some(component) => component.key(),
			None => self.records.borrow().get(&node).and_then(NodeRecord::key),
		}
	}

	/// Reconciles the children of `parent` with `children`.
	///
	/// Keyed children are matched by key and unkeyed ones by position among the unkeyed.
	/// Unmatched old children are released before any new node is attached, and the final order
	/// is established by moving only the nodes outside a longest increasing run of old positions.
	#[allow(clippy::too_many_lines)]
	fn diff_children(&self, parent: NodeId, children: &[VNode], context: &Rc<Context>, svg: bool) -> Result<()> {
		let span = trace_span!("Diffing children", ?parent, count = children.len());
		let _enter = span.enter();

		let originals = self.host().child_nodes(parent);
		let mut keyed: HashMap<Key, NodeId> = HashMap::new();
		let mut unkeyed: VecDeque<NodeId> = VecDeque::new();
		for &node in &originals {
			match self.node_key(node) {
				Some(key) => match keyed.entry(key) {
					Entry::Vacant(vacant) => {
						vacant.insert(node);
					}
					Entry::Occupied(occupied) => {
						if STATIC_MAX_LEVEL >= Level::WARN {
							warn!(?parent, key = %occupied.key(), "Duplicate key among existing children. Only the first one is reused.");
						}
					}
				},
				None => unkeyed.push_back(node),
			}
		}

		let mut seen_keys: HashSet<&Key> = HashSet::new();
		let matches: Vec<Option<NodeId>> = children
			.iter()
			.map(|child| match child.key() {
				Some(key) => {
					if !seen_keys.insert(key) && STATIC_MAX_LEVEL >= Level::WARN {
						warn!(?parent, %key, "Duplicate key among new children.");
					}
					keyed.remove(key)
				}
				None => unkeyed.pop_front(),
			})
			.collect();

		let matched: HashSet<NodeId> = matches.iter().flatten().copied().collect();
		for &node in &originals {
			if !matched.contains(&node) {
				trace!(?node, "Releasing unmatched child.");
				self.recollect(node, false)?;
			}
		}

		let mut outs = Vec::with_capacity(children.len());
		for (child, old) in children.iter().zip(matches) {
			outs.push(self.idiff(old, child.clone(), context, svg)?);
		}

		let positions: HashMap<NodeId, usize> = self.host().child_nodes(parent).into_iter().enumerate().map(|(i, node)| (node, i)).collect();
		let sequence: Vec<Option<usize>> = outs.iter().map(|node| positions.get(node).copied()).collect();
		let stable = longest_increasing(&sequence);
		let mut anchor = None;
		let mut host = self.host_mut();
		for (&node, &stable) in outs.iter().zip(&stable).rev() {
			if !stable {
				trace!(?node, ?anchor, "Placing child.");
				host.insert_before(parent, node, anchor);
			}
			anchor = Some(node);
		}
		Ok(())
	}

	#[instrument(level = "trace", skip(self, element, context))]
	fn build_component(&self, dom: Option<NodeId>, element: &ComponentElement, context: &Rc<Context>, svg: bool) -> Result<NodeId> {
		let ty = element.component_type();
		let owner = dom.and_then(|dom| self.owner(dom));
		let props = Rc::new(element.props());

		if let Some(owner) = owner.as_ref().filter(|owner| owner.component_type() == ty) {
			trace!(component = ty.name(), "Updating in place.");
			owner.set_identity(element.key.clone(), element.component_ref());
			self.set_component_props(owner, props, context, RenderMode::Async)?;
			return owner.base().ok_or(Error::MissingBase(ty.name()));
		}

		let mut dom = dom;
		if let Some(previous) = owner {
			trace!(previous = previous.name(), next = ty.name(), "Swapping component.");
			self.unmount_component(&previous)?;
			dom = None;
		}

		let component = ComponentRef::create(ty, Rc::clone(&props), Rc::clone(context), svg, self.shared.clone());
		component.set_identity(element.key.clone(), element.component_ref());
		component.set_next_base(dom);
		self.set_component_props(&component, props, context, RenderMode::Sync)?;
		component.base().ok_or(Error::MissingBase(ty.name()))
	}

	/// Stages new props on `component` and renders it according to `mode`.
	pub(crate) fn set_component_props(&self, component: &ComponentRef, props: Rc<Props>, context: &Rc<Context>, mode: RenderMode) -> Result<()> {
		if component.is_disabled() {
			return Ok(());
		}
		component.set_disabled(true);
		let staged = if component.base().is_none() {
			if component.lifecycle() == Lifecycle::Unmounted {
				component.set_lifecycle(Lifecycle::Mounting);
			}
			component.call("component_will_mount", |behavior, this| behavior.component_will_mount(this))
		} else {
			component.call("component_will_receive_props", |behavior, this| behavior.component_will_receive_props(this, &props, context))
		};
		component.set_disabled(false);
		staged?;

		component.commit_props(props, context);
		match mode {
			RenderMode::NoRender => (),
			RenderMode::Sync | RenderMode::Force => self.render_component_inner(component, mode, false)?,
			RenderMode::Async => {
				if self.options.sync_component_updates() || component.base().is_none() {
					self.render_component_inner(component, RenderMode::Sync, false)?;
				} else {
					component.enqueue()?;
				}
			}
		}

		if let Some(callback) = component.component_ref() {
			callback.call(Some(RefTarget::Component(component.clone())));
		}
		Ok(())
	}

	#[allow(clippy::too_many_lines)]
	fn render_component_inner(&self, component: &ComponentRef, mode: RenderMode, is_child: bool) -> Result<()> {
		if component.is_disabled() {
			trace!(component = component.name(), "Disabled, not rendering.");
			return Ok(());
		}
		let span = trace_span!("Rendering component", component = component.name(), ?mode, is_child);
		let _enter = span.enter();

		let guard = RenderingGuard::enter(component)?;
		let input = component.render_input();
		let is_update = input.base.is_some();
		let initial_base = input.base.or(input.next_base);

		let mut skip = false;
		if is_update {
			component.set_lifecycle(Lifecycle::Updating);
			component.expose(&input.previous_props, &input.previous_state, &input.previous_context);
			let checked = if mode == RenderMode::Force {
				Ok(true)
			} else {
				component.call("should_component_update", |behavior, this| behavior.should_component_update(this, &input.props, &input.state, &input.context))
			};
			let prepared = checked.and_then(|render| {
				skip = !render;
				if render {
					component.call("component_will_update", |behavior, this| behavior.component_will_update(this, &input.props, &input.state, &input.context))
				} else {
					Ok(())
				}
			});
			component.expose(&input.props, &input.state, &input.context);
			if let Err(error) = prepared {
				component.set_lifecycle(Lifecycle::Mounted);
				return Err(error);
			}
		}

		component.settle_batch();

		if skip {
			trace!(component = component.name(), "should_component_update returned false.");
			component.set_lifecycle(Lifecycle::Mounted);
		} else {
			let rendered = component.call("render", |behavior, this| behavior.render(this, &input.props, &input.state, &input.context))?;
			let rendered = rendered.map(|vnode| self.options.process_vnode(vnode));
			let context = match component.child_context() {
				Some(child_context) => {
					let mut merged = (*input.context).clone();
					merged.extend(child_context);
					Rc::new(merged)
				}
				None => Rc::clone(&input.context),
			};

			let mut to_unmount = None;
			let mut kept_child = false;
			let base = if let Some(VNode::Component(child_element)) = &rendered {
				let child_props = Rc::new(child_element.props());
				let reusable = input.child.clone().filter(|child| child.component_type() == child_element.component_type() && child.key().as_ref() == child_element.key.as_ref());
				match reusable {
					Some(child) => {
						kept_child = true;
						child.set_identity(child_element.key.clone(), child_element.component_ref());
						self.set_component_props(&child, child_props, &context, RenderMode::Sync)?;
						child.base()
					}
					None => {
						to_unmount = input.child.clone();
						let child = ComponentRef::create(child_element.component_type(), Rc::clone(&child_props), Rc::clone(&context), input.svg, self.shared.clone());
						child.set_identity(child_element.key.clone(), child_element.component_ref());
						child.set_next_base(input.next_base);
						child.set_parent(component);
						component.set_child(Some(child.clone()));
						self.set_component_props(&child, child_props, &context, RenderMode::NoRender)?;
						self.render_component_inner(&child, RenderMode::Sync, true)?;
						child.base()
					}
				}
			} else {
				let mut cbase = initial_base;
				if input.child.is_some() {
					to_unmount = component.take_child();
					cbase = None;
				}
				let previous_owner = cbase.and_then(|cbase| self.owners.borrow_mut().remove(&cbase).map(|owner| (cbase, owner)));
				let vnode = rendered.unwrap_or_else(|| VNode::text(""));
				match self.diff_node(cbase, &vnode, &context, input.svg) {
					Ok(base) => Some(base),
					Err(error) => {
						if let Some((cbase, owner)) = previous_owner {
							let attached = self.host().parent(cbase).is_some();
							if attached {
								self.owners.borrow_mut().insert(cbase, owner);
							}
						}
						if is_update {
							component.set_lifecycle(Lifecycle::Mounted);
						}
						return Err(error);
					}
				}
			};

			if let (Some(initial), Some(new)) = (initial_base, base) {
				if new != initial && !kept_child {
					let (parent, next) = {
						let host = self.host();
						(host.parent(initial), host.next_sibling(initial))
					};
					if let Some(parent) = parent.filter(|&parent| parent != new) {
						trace!(?initial, ?new, "Swapping base.");
						match to_unmount.take() {
							Some(previous) => self.unmount_component(&previous)?,
							None => {
								self.owners.borrow_mut().remove(&initial);
								self.recollect(initial, false)?;
							}
						}
						self.host_mut().insert_before(parent, new, next);
					}
				}
			}
			if let Some(previous) = to_unmount {
				self.unmount_component(&previous)?;
			}

			component.set_base(base);
			if let (Some(base), false) = (base, is_child) {
				let mut outermost = component.clone();
				let mut cursor = component.parent_component();
				while let Some(parent) = cursor {
					parent.set_base(Some(base));
					cursor = parent.parent_component();
					outermost = parent;
				}
				self.owners.borrow_mut().insert(base, outermost);
			}
		}
		drop(guard);

		if !is_update {
			self.mounts.borrow_mut().push_back(component.clone());
		} else if !skip {
			component.set_lifecycle(Lifecycle::Mounted);
			self.options.notify_after_update(component);
			component.call("component_did_update", |behavior, this| behavior.component_did_update(this, &input.previous_props, &input.previous_state, &input.previous_context))?;
		}

		for callback in component.take_render_callbacks() {
			callback();
		}
		Ok(())
	}

	/// Runs the unmount lifecycle of `component` (and the component it rendered, if any) and
	/// releases its base.
	#[instrument(level = "trace", skip(self))]
	pub(crate) fn unmount_component(&self, component: &ComponentRef) -> Result<()> {
		self.options.notify_before_unmount(component);
		component.set_lifecycle(Lifecycle::Unmounting);
		let base = component.take_base();
		component.set_disabled(true);
		component.call("component_will_unmount", |behavior, this| behavior.component_will_unmount(this))?;

		match component.take_child() {
			Some(child) => self.unmount_component(&child)?,
			None => {
				if let Some(base) = base {
					self.owners.borrow_mut().remove(&base);
					let element_ref = self.records.borrow().get(&base).and_then(NodeRecord::element_ref);
					if let Some(element_ref) = element_ref {
						element_ref.call(None);
					}
					let pooled = self.collect(base);
					let children = self.host().child_nodes(base);
					for child in children {
						self.recollect(child, true)?;
					}
					if !pooled {
						self.host_mut().release(base);
					}
				}
			}
		}

		if let Some(callback) = component.component_ref() {
			callback.call(None);
		}
		component.set_lifecycle(Lifecycle::Unmounted);
		component.call("component_did_unmount", |behavior, this| behavior.component_did_unmount(this))
	}

	/// Releases `node` and everything below it, unmounting components on the way.
	///
	/// With `unmount_only`, plain nodes stay where they are (their ancestor is being released)
	/// and only lose their bookkeeping. Nodes that don't end up pooled are released to the host.
	fn recollect(&self, node: NodeId, unmount_only: bool) -> Result<()> {
		if let Some(component) = self.owner(node) {
			return self.unmount_component(&component);
		}

		let element_ref = self.records.borrow().get(&node).and_then(NodeRecord::element_ref);
		if let Some(element_ref) = element_ref {
			element_ref.call(None);
		}
		let pooled = if unmount_only {
			self.strip(node);
			false
		} else {
			self.collect(node)
		};

		let children = self.host().child_nodes(node);
		for child in children {
			self.recollect(child, true)?;
		}
		if !pooled {
			self.host_mut().release(node);
		}
		Ok(())
	}

	/// Detaches `node` and pools it. Returns `false` if it can't be pooled (text nodes).
	fn collect(&self, node: NodeId) -> bool {
		let span = trace_span!("Recycling node", ?node);
		let _enter = span.enter();
		self.host_mut().remove(node);
		let svg = self.strip(node);
		let host = self.host();
		let pooled = self.recycler.borrow_mut().collect(&**host, node, svg);
		pooled
	}

	/// Forgets everything recorded about `node` and unbinds its listeners. Returns whether it was
	/// rendered in SVG context.
	fn strip(&self, node: NodeId) -> bool {
		self.owners.borrow_mut().remove(&node);
		let record = match self.records.borrow_mut().remove(&node) {
			Some(record) => record,
			None => return false,
		};
		let mut host = self.host_mut();
		for (name, value) in &record.attributes {
			if let (Some(event), Value::Handler(_)) = (event_name(name), value) {
				host.set_listener(node, &event, None);
			}
		}
		record.svg
	}
}

impl fmt::Debug for Differ {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Differ")
			.field("records", &self.records.borrow().len())
			.field("owners", &self.owners.borrow().len())
			.field("recycler", &self.recycler.borrow())
			.field("depth", &self.depth.get())
			.field("options", &self.options)
			.finish()
	}
}
