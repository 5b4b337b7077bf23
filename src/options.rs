//! The hook and configuration table consulted by the scheduler and the differ.

use crate::{component::ComponentRef, host::Event, vnode::VNode};
use core::fmt;
use std::{cell::RefCell, rc::Rc};

/// Receives a deferred re-render and decides when to run it.
pub type Debouncer = Rc<dyn Fn(Box<dyn FnOnce()>)>;

/// How a scheduled flush is run.
#[derive(Clone)]
pub enum Debounce {
	/// The flush waits until the host loop calls [`Renderer::rerender`](`crate::Renderer::rerender`).
	///
	/// This is the native stand-in for a microtask: state changes made while handling one host
	/// event are batched and applied when control returns to the loop.
	Deferred,
	/// Flushes immediately, once no diff or flush is in progress.
	Sync,
	/// Hands the flush to a host-provided deferral mechanism.
	Custom(Debouncer),
}
impl Default for Debounce {
	fn default() -> Self {
		Debounce::Deferred
	}
}
impl fmt::Debug for Debounce {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Debounce::Deferred => f.write_str("Deferred"),
			Debounce::Sync => f.write_str("Sync"),
			Debounce::Custom(debouncer) => write!(f, "Custom({:p})", Rc::as_ptr(debouncer).cast::<()>()),
		}
	}
}

type ComponentHook = Rc<dyn Fn(&ComponentRef)>;

struct Table {
	sync_component_updates: bool,
	debounce_rendering: Debounce,
	vnode: Option<Rc<dyn Fn(VNode) -> VNode>>,
	event: Option<Rc<dyn Fn(Event) -> Option<Event>>>,
	after_mount: Option<ComponentHook>,
	after_update: Option<ComponentHook>,
	before_unmount: Option<ComponentHook>,
}
impl Default for Table {
	fn default() -> Self {
		Self {
			sync_component_updates: true,
			debounce_rendering: Debounce::default(),
			vnode: None,
			event: None,
			after_mount: None,
			after_update: None,
			before_unmount: None,
		}
	}
}

/// Shared handle to a hook table.
///
/// Clones share the table, so changes take effect for every renderer holding it on their next
/// relevant operation. [`Options::global`] is the thread's default table.
#[derive(Clone, Default)]
pub struct Options(Rc<RefCell<Table>>);

thread_local! {
	static GLOBAL: Options = Options::new();
}

impl Options {
	/// A fresh table, independent of [`Options::global`].
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn global() -> Self {
		GLOBAL.with(Options::clone)
	}

	/// Restores every setting and hook to its default.
	pub fn reset(&self) {
		*self.0.borrow_mut() = Table::default();
	}

	/// If `false`, prop changes coming from a parent re-render are queued instead of rendered
	/// inline. Defaults to `true`.
	pub fn set_sync_component_updates(&self, sync: bool) -> &Self {
		self.0.borrow_mut().sync_component_updates = sync;
		self
	}

	#[must_use]
	pub fn sync_component_updates(&self) -> bool {
		self.0.borrow().sync_component_updates
	}

	pub fn set_debounce_rendering(&self, debounce: Debounce) -> &Self {
		self.0.borrow_mut().debounce_rendering = debounce;
		self
	}

	#[must_use]
	pub fn debounce_rendering(&self) -> Debounce {
		self.0.borrow().debounce_rendering.clone()
	}

	/// Processes each virtual node right before it is diffed.
	pub fn on_vnode(&self, hook: impl Fn(VNode) -> VNode + 'static) -> &Self {
		self.0.borrow_mut().vnode = Some(Rc::new(hook));
		self
	}

	/// Sees every event before its handler does. Returning `None` keeps the original event.
	pub fn on_event(&self, hook: impl Fn(Event) -> Option<Event> + 'static) -> &Self {
		self.0.borrow_mut().event = Some(Rc::new(hook));
		self
	}

	pub fn after_mount(&self, hook: impl Fn(&ComponentRef) + 'static) -> &Self {
		self.0.borrow_mut().after_mount = Some(Rc::new(hook));
		self
	}

	pub fn after_update(&self, hook: impl Fn(&ComponentRef) + 'static) -> &Self {
		self.0.borrow_mut().after_update = Some(Rc::new(hook));
		self
	}

	pub fn before_unmount(&self, hook: impl Fn(&ComponentRef) + 'static) -> &Self {
		self.0.borrow_mut().before_unmount = Some(Rc::new(hook));
		self
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	// Hooks are cloned out before they run, so they may reconfigure the table themselves.

	pub(crate) fn process_vnode(&self, vnode: VNode) -> VNode {
		let hook = self.0.borrow().vnode.clone();
		match hook {
			Some(hook) => hook(vnode),
			None => vnode,
		}
	}

	pub(crate) fn process_event(&self, event: Event) -> Event {
		let hook = self.0.borrow().event.clone();
		match hook {
			Some(hook) => hook(event.clone()).unwrap_or(event),
			None => event,
		}
	}

	pub(crate) fn notify_after_mount(&self, component: &ComponentRef) {
		let hook = self.0.borrow().after_mount.clone();
		if let Some(hook) = hook {
			hook(component)
		}
	}

	pub(crate) fn notify_after_update(&self, component: &ComponentRef) {
		let hook = self.0.borrow().after_update.clone();
		if let Some(hook) = hook {
			hook(component)
		}
	}

	pub(crate) fn notify_before_unmount(&self, component: &ComponentRef) {
		let hook = self.0.borrow().before_unmount.clone();
		if let Some(hook) = hook {
			hook(component)
		}
	}
}

impl fmt::Debug for Options {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let table = self.0.borrow();
		f.debug_struct("Options")
			.field("sync_component_updates", &table.sync_component_updates)
			.field("debounce_rendering", &table.debounce_rendering)
			.field("vnode", &table.vnode.is_some())
			.field("event", &table.event.is_some())
			.field("after_mount", &table.after_mount.is_some())
			.field("after_update", &table.after_update.is_some())
			.field("before_unmount", &table.before_unmount.is_some())
			.finish()
	}
}
