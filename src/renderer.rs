//! The public entry point tying host, differ, scheduler and options together.

use crate::{
	component::{ComponentRef, Context},
	diff::Differ,
	error::Result,
	host::{Host, NodeId},
	options::Options,
	scheduler::RenderQueue,
	vnode::VNode,
};
use std::rc::{Rc, Weak};
use tracing::{info, instrument};

pub(crate) struct Shared {
	pub(crate) options: Options,
	pub(crate) queue: RenderQueue,
	pub(crate) differ: Differ,
	pub(crate) this: Weak<Shared>,
}

/// Renders virtual trees into one [`Host`].
///
/// Component instances created by a renderer keep a weak reference to it. Once it is dropped,
/// their state changes no longer schedule renders.
///
/// # Correct Use
///
/// Each `Renderer` assumes it is the only writer to the subtrees it renders into. Nodes the
/// host returns must not be moved or removed behind its back between passes.
pub struct Renderer {
	shared: Rc<Shared>,
}

impl Renderer {
	/// A renderer configured by [`Options::global`].
	pub fn new(host: impl Host + 'static) -> Self {
		Self::with_options(host, Options::global())
	}

	pub fn with_options(host: impl Host + 'static, options: Options) -> Self {
		let shared = Rc::new_cyclic(|this: &Weak<Shared>| Shared {
			differ: Differ::new(Box::new(host), options.clone(), this.clone()),
			queue: RenderQueue::default(),
			options,
			this: this.clone(),
		});
		Self { shared }
	}

	#[must_use]
	pub fn options(&self) -> &Options {
		&self.shared.options
	}

	/// Renders `vnode` as the content of `parent`, reconciling with its current first child.
	///
	/// Returns the root node of the rendered tree.
	///
	/// # Errors
	///
	/// Iff a tag name is invalid or a lifecycle hook or render function fails.
	#[instrument(skip(self, vnode))]
	pub fn render(&self, vnode: &VNode, parent: NodeId) -> Result<NodeId> {
		let merge = self.shared.differ.child_nodes(parent).first().copied();
		self.render_into(vnode, parent, merge)
	}

	/// Renders `vnode` into `parent`, reconciling with `merge` if given and appending otherwise.
	///
	/// # Errors
	///
	/// See [`Renderer::render`].
	#[instrument(skip(self, vnode))]
	pub fn render_into(&self, vnode: &VNode, parent: NodeId, merge: Option<NodeId>) -> Result<NodeId> {
		let out = self.shared.differ.patch(merge, vnode, &Rc::new(Context::new()), Some(parent), false)?;
		self.settle()?;
		Ok(out)
	}

	/// The general form: reconciles `dom` with `vnode`, releasing `dom` if `vnode` is `None`.
	///
	/// # Errors
	///
	/// See [`Renderer::render`].
	#[instrument(skip(self, vnode))]
	pub fn diff(&self, dom: Option<NodeId>, vnode: Option<&VNode>, parent: Option<NodeId>, svg: bool) -> Result<Option<NodeId>> {
		let out = self.shared.differ.diff(dom, vnode, &Rc::new(Context::new()), parent, svg)?;
		self.settle()?;
		Ok(out)
	}

	/// Detaches `node` and recycles it, unmounting every component rendered into it.
	///
	/// # Errors
	///
	/// Iff an unmount hook fails.
	#[instrument(skip(self))]
	pub fn unmount(&self, node: NodeId) -> Result<()> {
		self.shared.differ.unmount(node)?;
		self.settle()
	}

	/// Flushes the render queue.
	///
	/// With the default [`Debounce::Deferred`](`crate::Debounce::Deferred`), this is how state
	/// changes reach the host: call it after handing an event to the host, or whenever the
	/// host's loop is idle.
	///
	/// # Errors
	///
	/// The first failure among the queued renders. Instances the flush didn't reach stay queued.
	pub fn rerender(&self) -> Result<()> {
		self.shared.rerender()?;
		self.settle()
	}

	#[must_use]
	pub fn has_pending_renders(&self) -> bool {
		self.shared.queue.len() > 0
	}

	/// The outermost component whose base is `node`.
	#[must_use]
	pub fn component_at(&self, node: NodeId) -> Option<ComponentRef> {
		self.shared.differ.owner(node)
	}

	/// How many detached elements wait for reuse.
	#[must_use]
	pub fn pooled_nodes(&self) -> usize {
		self.shared.differ.pooled_nodes()
	}

	fn settle(&self) -> Result<()> {
		self.shared.settle()?;
		info!(pooled = self.pooled_nodes(), pending = self.shared.queue.len(), "Pass complete.");
		Ok(())
	}
}

impl core::fmt::Debug for Renderer {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Renderer").field("differ", &self.shared.differ).field("queue", &self.shared.queue).finish()
	}
}
