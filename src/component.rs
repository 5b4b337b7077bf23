//! Stateful component instances and their lifecycle.

use crate::{
	error::{BoxError, Error, Result},
	host::NodeId,
	linked_state::create_linked_state,
	renderer::Shared,
	value::{EventHandler, Key, Map, RefCallback},
	vnode::VNode,
};
use core::{
	any::{Any, TypeId},
	fmt,
};
use hashbrown::HashMap;
use std::{
	cell::{Cell, RefCell},
	rc::{Rc, Weak},
};
use tracing::trace;

pub type State = Map;
pub type Context = Map;

/// What lifecycle hooks and render functions return.
pub type HookResult<T = ()> = core::result::Result<T, BoxError>;

/// Props as received by a component instance: the element's attributes (without `key` and
/// `ref`) and its children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
	attributes: Map,
	children: Vec<VNode>,
}
impl Props {
	#[must_use]
	pub fn new(attributes: Map, children: Vec<VNode>) -> Self {
		Self { attributes, children }
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&crate::Value> {
		self.attributes.get(name)
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

/// Behaviour of a component type.
///
/// Every hook is optional. Hooks receive `this`, a handle to the instance, which is how they
/// read current props/state and request updates. During [`Component::should_component_update`]
/// and [`Component::component_will_update`], `this` still reports the previous props, state and
/// context; the next ones are passed as arguments.
///
/// Errors returned from hooks abort the running render pass and surface to whoever triggered it.
#[allow(unused_variables)]
pub trait Component: 'static {
	fn create(props: &Props, context: &Context) -> Self
	where
		Self: Sized;

	fn initial_state(&self, props: &Props) -> State {
		State::new()
	}

	fn render(&self, this: &ComponentRef, props: &Props, state: &State, context: &Context) -> HookResult<Option<VNode>> {
		Ok(None)
	}

	/// Merged into the context of descendants.
	fn get_child_context(&self, this: &ComponentRef) -> Option<Context> {
		None
	}

	fn component_will_mount(&self, this: &ComponentRef) -> HookResult {
		Ok(())
	}

	fn component_did_mount(&self, this: &ComponentRef) -> HookResult {
		Ok(())
	}

	fn component_will_receive_props(&self, this: &ComponentRef, next_props: &Props, next_context: &Context) -> HookResult {
		Ok(())
	}

	fn should_component_update(&self, this: &ComponentRef, next_props: &Props, next_state: &State, next_context: &Context) -> HookResult<bool> {
		Ok(true)
	}

	fn component_will_update(&self, this: &ComponentRef, next_props: &Props, next_state: &State, next_context: &Context) -> HookResult {
		Ok(())
	}

	fn component_did_update(&self, this: &ComponentRef, previous_props: &Props, previous_state: &State, previous_context: &Context) -> HookResult {
		Ok(())
	}

	fn component_will_unmount(&self, this: &ComponentRef) -> HookResult {
		Ok(())
	}

	fn component_did_unmount(&self, this: &ComponentRef) -> HookResult {
		Ok(())
	}
}

/// The "constructor" of a component: identity plus a way to instantiate it.
#[derive(Clone, Copy)]
pub struct ComponentType {
	id: TypeId,
	name: &'static str,
	construct: fn(&Props, &Context) -> (Rc<dyn Component>, Rc<dyn Any>),
}
impl ComponentType {
	#[must_use]
	pub fn of<C: Component>() -> Self {
		fn construct<C: Component>(props: &Props, context: &Context) -> (Rc<dyn Component>, Rc<dyn Any>) {
			let behavior = Rc::new(C::create(props, context));
			(Rc::clone(&behavior) as Rc<dyn Component>, behavior)
		}
		Self {
			id: TypeId::of::<C>(),
			name: core::any::type_name::<C>(),
			construct: construct::<C>,
		}
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.name
	}
}
impl PartialEq for ComponentType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}
impl Eq for ComponentType {}
impl fmt::Debug for ComponentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
	Unmounted,
	Mounting,
	Mounted,
	Updating,
	Unmounting,
}

/// A state change requested through [`ComponentRef::set_state`] and friends.
pub enum StateUpdate {
	Partial(State),
	Compute(Box<dyn FnOnce(&State, &Props) -> State>),
}
impl From<State> for StateUpdate {
	fn from(partial: State) -> Self {
		StateUpdate::Partial(partial)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct InstanceId(u64);

thread_local! {
	static NEXT_INSTANCE_ID: Cell<u64> = Cell::new(0);
}

pub(crate) struct Instance {
	id: InstanceId,
	ty: ComponentType,
	behavior: Rc<dyn Component>,
	/// Same allocation as `behavior`, for downcasting.
	any: Rc<dyn Any>,
	core: RefCell<Core>,
	renderer: Weak<Shared>,
}

struct Core {
	props: Rc<Props>,
	state: Rc<State>,
	context: Rc<Context>,
	previous_props: Option<Rc<Props>>,
	previous_state: Option<Rc<State>>,
	previous_context: Option<Rc<Context>>,
	dirty: bool,
	disabled: bool,
	rendering: bool,
	lifecycle: Lifecycle,
	svg: bool,
	base: Option<NodeId>,
	next_base: Option<NodeId>,
	child: Option<ComponentRef>,
	parent: Option<Weak<Instance>>,
	key: Option<Key>,
	component_ref: Option<RefCallback>,
	render_callbacks: Vec<Box<dyn FnOnce()>>,
	linked_states: HashMap<(String, Option<String>), EventHandler>,
}

/// Everything one render pass reads up front.
pub(crate) struct RenderInput {
	pub props: Rc<Props>,
	pub state: Rc<State>,
	pub context: Rc<Context>,
	pub previous_props: Rc<Props>,
	pub previous_state: Rc<State>,
	pub previous_context: Rc<Context>,
	pub base: Option<NodeId>,
	pub next_base: Option<NodeId>,
	pub child: Option<ComponentRef>,
	pub svg: bool,
}

/// Handle to a mounted (or mounting) component instance.
///
/// Equality is identity.
#[derive(Clone)]
pub struct ComponentRef(Rc<Instance>);

impl ComponentRef {
	pub(crate) fn create(ty: ComponentType, props: Rc<Props>, context: Rc<Context>, svg: bool, renderer: Weak<Shared>) -> Self {
		let (behavior, any) = (ty.construct)(&props, &context);
		let state = Rc::new(behavior.initial_state(&props));
		let id = NEXT_INSTANCE_ID.with(|next| {
			let id = next.get();
			next.set(id + 1);
			InstanceId(id)
		});
		trace!(component = ty.name, ?id, "Created instance.");
		Self(Rc::new(Instance {
			id,
			ty,
			behavior,
			any,
			core: RefCell::new(Core {
				props,
				state,
				context,
				previous_props: None,
				previous_state: None,
				previous_context: None,
				dirty: true,
				disabled: false,
				rendering: false,
				lifecycle: Lifecycle::Unmounted,
				svg,
				base: None,
				next_base: None,
				child: None,
				parent: None,
				key: None,
				component_ref: None,
				render_callbacks: Vec::new(),
				linked_states: HashMap::new(),
			}),
			renderer,
		}))
	}

	pub(crate) fn downgrade(&self) -> WeakComponentRef {
		WeakComponentRef(Rc::downgrade(&self.0))
	}

	pub(crate) fn id(&self) -> InstanceId {
		self.0.id
	}

	#[must_use]
	pub fn component_type(&self) -> ComponentType {
		self.0.ty
	}

	#[must_use]
	pub fn name(&self) -> &'static str {
		self.0.ty.name
	}

	#[must_use]
	pub fn props(&self) -> Rc<Props> {
		Rc::clone(&self.0.core.borrow().props)
	}

	#[must_use]
	pub fn state(&self) -> Rc<State> {
		Rc::clone(&self.0.core.borrow().state)
	}

	#[must_use]
	pub fn context(&self) -> Rc<Context> {
		Rc::clone(&self.0.core.borrow().context)
	}

	/// The state before the pending batch of changes, if one is pending.
	#[must_use]
	pub fn previous_state(&self) -> Option<Rc<State>> {
		self.0.core.borrow().previous_state.clone()
	}

	#[must_use]
	pub fn previous_props(&self) -> Option<Rc<Props>> {
		self.0.core.borrow().previous_props.clone()
	}

	/// The real node currently representing this component's output.
	#[must_use]
	pub fn base(&self) -> Option<NodeId> {
		self.0.core.borrow().base
	}

	#[must_use]
	pub fn key(&self) -> Option<Key> {
		self.0.core.borrow().key.clone()
	}

	#[must_use]
	pub fn is_dirty(&self) -> bool {
		self.0.core.borrow().dirty
	}

	#[must_use]
	pub fn lifecycle(&self) -> Lifecycle {
		self.0.core.borrow().lifecycle
	}

	/// The component this one rendered directly, if its render returned a component.
	#[must_use]
	pub fn child_component(&self) -> Option<ComponentRef> {
		self.0.core.borrow().child.clone()
	}

	/// Returns the behaviour object if it is a `C`.
	#[must_use]
	pub fn behavior<C: Component>(&self) -> Option<Rc<C>> {
		Rc::clone(&self.0.any).downcast::<C>().ok()
	}

	/// Shallowly merges `partial` into the state and schedules a render.
	///
	/// # Errors
	///
	/// Only with [`Debounce::Sync`](`crate::Debounce::Sync`), where the flush runs right away
	/// and its errors surface here.
	pub fn set_state(&self, partial: State) -> Result<()> {
		self.update_state(StateUpdate::Partial(partial), None)
	}

	/// Like [`ComponentRef::set_state`], computing the change from the current state and props.
	///
	/// # Errors
	///
	/// See [`ComponentRef::set_state`].
	pub fn set_state_with(&self, update: impl FnOnce(&State, &Props) -> State + 'static) -> Result<()> {
		self.update_state(StateUpdate::Compute(Box::new(update)), None)
	}

	/// Like [`ComponentRef::set_state`], running `callback` once the real tree reflects the change.
	///
	/// # Errors
	///
	/// See [`ComponentRef::set_state`].
	pub fn set_state_then(&self, update: impl Into<StateUpdate>, callback: impl FnOnce() + 'static) -> Result<()> {
		self.update_state(update.into(), Some(Box::new(callback)))
	}

	/// # Errors
	///
	/// See [`ComponentRef::set_state`].
	pub fn update_state(&self, update: StateUpdate, callback: Option<Box<dyn FnOnce()>>) -> Result<()> {
		let (state, props) = {
			let mut core = self.0.core.borrow_mut();
			if core.previous_state.is_none() {
				core.previous_state = Some(Rc::clone(&core.state));
			}
			(Rc::clone(&core.state), Rc::clone(&core.props))
		};
		let partial = match update {
			StateUpdate::Partial(partial) => partial,
			StateUpdate::Compute(compute) => compute(&state, &props),
		};
		drop(state);
		{
			let mut core = self.0.core.borrow_mut();
			Rc::make_mut(&mut core.state).extend(partial);
			if let Some(callback) = callback {
				core.render_callbacks.push(callback);
			}
			core.dirty = true;
		}
		self.enqueue()
	}

	/// Renders right now, bypassing the queue and `should_component_update`.
	///
	/// # Errors
	///
	/// Errors from hooks and render functions of this component and its descendants, and
	/// [`Error::ReentrantRender`] if this component is currently rendering.
	pub fn force_update(&self) -> Result<()> {
		let shared = self.renderer()?;
		let result = shared.differ.render_component(self, RenderMode::Force, false);
		result.and_then(|()| shared.settle())
	}

	/// A state-setting [`EventHandler`] for `key` (dot-separated for nested state).
	///
	/// The value is read from the event at `event_path` if given, otherwise from the target's
	/// `checked` (checkboxes and radio buttons) or `value`. Repeated calls with the same
	/// arguments return the same handler.
	#[must_use]
	pub fn link_state(&self, key: &str, event_path: Option<&str>) -> EventHandler {
		let cache_key = (key.to_owned(), event_path.map(str::to_owned));
		let cached = self.0.core.borrow().linked_states.get(&cache_key).cloned();
		if let Some(handler) = cached {
			return handler;
		}
		let handler = create_linked_state(self, key, event_path);
		self.0.core.borrow_mut().linked_states.insert(cache_key, handler.clone());
		handler
	}

	pub(crate) fn renderer(&self) -> Result<Rc<Shared>> {
		self.0.renderer.upgrade().ok_or(Error::RendererDropped)
	}

	pub(crate) fn enqueue(&self) -> Result<()> {
		match self.0.renderer.upgrade() {
			Some(shared) => shared.enqueue_render(self),
			None => {
				trace!(component = self.name(), "Renderer is gone, not scheduling.");
				Ok(())
			}
		}
	}

	pub(crate) fn call<T>(&self, hook: &'static str, f: impl FnOnce(&dyn Component, &ComponentRef) -> HookResult<T>) -> Result<T> {
		let behavior = Rc::clone(&self.0.behavior);
		f(&*behavior, self).map_err(|source| Error::Hook { component: self.name(), hook, source })
	}

	pub(crate) fn child_context(&self) -> Option<Context> {
		let behavior = Rc::clone(&self.0.behavior);
		behavior.get_child_context(self)
	}

	pub(crate) fn is_disabled(&self) -> bool {
		self.0.core.borrow().disabled
	}

	pub(crate) fn set_disabled(&self, disabled: bool) {
		self.0.core.borrow_mut().disabled = disabled;
	}

	pub(crate) fn is_rendering(&self) -> bool {
		self.0.core.borrow().rendering
	}

	pub(crate) fn set_rendering(&self, rendering: bool) {
		self.0.core.borrow_mut().rendering = rendering;
	}

	pub(crate) fn mark_dirty(&self) {
		self.0.core.borrow_mut().dirty = true;
	}

	pub(crate) fn set_lifecycle(&self, lifecycle: Lifecycle) {
		self.0.core.borrow_mut().lifecycle = lifecycle;
	}

	pub(crate) fn set_base(&self, base: Option<NodeId>) {
		self.0.core.borrow_mut().base = base;
	}

	pub(crate) fn take_base(&self) -> Option<NodeId> {
		self.0.core.borrow_mut().base.take()
	}

	pub(crate) fn set_next_base(&self, next_base: Option<NodeId>) {
		let mut core = self.0.core.borrow_mut();
		if core.next_base.is_none() {
			core.next_base = next_base;
		}
	}

	pub(crate) fn set_child(&self, child: Option<ComponentRef>) {
		self.0.core.borrow_mut().child = child;
	}

	pub(crate) fn take_child(&self) -> Option<ComponentRef> {
		self.0.core.borrow_mut().child.take()
	}

	pub(crate) fn set_parent(&self, parent: &ComponentRef) {
		self.0.core.borrow_mut().parent = Some(Rc::downgrade(&parent.0));
	}

	pub(crate) fn parent_component(&self) -> Option<ComponentRef> {
		self.0.core.borrow().parent.as_ref().and_then(Weak::upgrade).map(ComponentRef)
	}

	pub(crate) fn component_ref(&self) -> Option<RefCallback> {
		self.0.core.borrow().component_ref.clone()
	}

	pub(crate) fn set_identity(&self, key: Option<Key>, component_ref: Option<RefCallback>) {
		let mut core = self.0.core.borrow_mut();
		core.key = key;
		core.component_ref = component_ref;
	}

	/// Stages new props and context, snapshotting the current ones if no batch is pending.
	pub(crate) fn commit_props(&self, props: Rc<Props>, context: &Rc<Context>) {
		let mut core = self.0.core.borrow_mut();
		if !Rc::ptr_eq(&core.context, context) {
			if core.previous_context.is_none() {
				core.previous_context = Some(Rc::clone(&core.context));
			}
			core.context = Rc::clone(context);
		}
		if core.previous_props.is_none() {
			core.previous_props = Some(Rc::clone(&core.props));
		}
		core.props = props;
	}

	pub(crate) fn render_input(&self) -> RenderInput {
		let core = self.0.core.borrow();
		RenderInput {
			props: Rc::clone(&core.props),
			state: Rc::clone(&core.state),
			context: Rc::clone(&core.context),
			previous_props: core.previous_props.clone().unwrap_or_else(|| Rc::clone(&core.props)),
			previous_state: core.previous_state.clone().unwrap_or_else(|| Rc::clone(&core.state)),
			previous_context: core.previous_context.clone().unwrap_or_else(|| Rc::clone(&core.context)),
			base: core.base,
			next_base: core.next_base,
			child: core.child.clone(),
			svg: core.svg,
		}
	}

	/// Swaps in what `this.props()` and friends report while update hooks run.
	pub(crate) fn expose(&self, props: &Rc<Props>, state: &Rc<State>, context: &Rc<Context>) {
		let mut core = self.0.core.borrow_mut();
		core.props = Rc::clone(props);
		core.state = Rc::clone(state);
		core.context = Rc::clone(context);
	}

	/// Ends the pending batch: snapshots are dropped and the instance is clean.
	pub(crate) fn settle_batch(&self) {
		let mut core = self.0.core.borrow_mut();
		core.previous_props = None;
		core.previous_state = None;
		core.previous_context = None;
		core.next_base = None;
		core.dirty = false;
	}

	pub(crate) fn take_render_callbacks(&self) -> Vec<Box<dyn FnOnce()>> {
		core::mem::take(&mut self.0.core.borrow_mut().render_callbacks)
	}
}

impl PartialEq for ComponentRef {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Eq for ComponentRef {}
impl fmt::Debug for ComponentRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let core = self.0.core.borrow();
		f.debug_struct("ComponentRef")
			.field("component", &self.0.ty.name)
			.field("id", &self.0.id.0)
			.field("lifecycle", &core.lifecycle)
			.field("dirty", &core.dirty)
			.field("base", &core.base)
			.finish()
	}
}

/// Non-owning [`ComponentRef`], held by handlers the instance caches itself.
#[derive(Clone)]
pub(crate) struct WeakComponentRef(Weak<Instance>);
impl WeakComponentRef {
	pub(crate) fn upgrade(&self) -> Option<ComponentRef> {
		self.0.upgrade().map(ComponentRef)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenderMode {
	/// Stage props only.
	NoRender,
	/// Render now.
	Sync,
	/// Render now if updates are synchronous (or the instance never rendered), else enqueue.
	Async,
	/// Render now, ignoring `should_component_update`.
	Force,
}
