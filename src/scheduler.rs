//! Batches and deduplicates re-render requests.

use crate::{
	component::{ComponentRef, InstanceId, Lifecycle, RenderMode},
	error::Result,
	options::Debounce,
	renderer::Shared,
};
use hashbrown::HashSet;
use std::cell::RefCell;
use tracing::{error, info, trace};

#[derive(Debug, Default)]
struct QueueState {
	pending: Vec<ComponentRef>,
	queued: HashSet<InstanceId>,
	scheduled: bool,
	flushing: bool,
	/// A flush was requested while one couldn't run.
	retry: bool,
}

/// Dirty instances waiting for the next flush, in first-dirtied order.
///
/// Work enqueued while a flush runs lands in the next batch.
#[derive(Debug, Default)]
pub(crate) struct RenderQueue(RefCell<QueueState>);

impl RenderQueue {
	/// Returns `false` if `component` is already waiting.
	fn push(&self, component: &ComponentRef) -> bool {
		let mut state = self.0.borrow_mut();
		if !state.queued.insert(component.id()) {
			return false;
		}
		state.pending.push(component.clone());
		true
	}

	/// Returns `false` if a flush is already scheduled.
	fn mark_scheduled(&self) -> bool {
		let mut state = self.0.borrow_mut();
		!core::mem::replace(&mut state.scheduled, true)
	}

	fn begin_flush(&self) -> Vec<ComponentRef> {
		let mut state = self.0.borrow_mut();
		state.flushing = true;
		state.scheduled = false;
		state.retry = false;
		state.queued.clear();
		core::mem::take(&mut state.pending)
	}

	fn end_flush(&self) {
		self.0.borrow_mut().flushing = false;
	}

	/// Puts components an aborted flush didn't reach back in front of the queue.
	fn requeue(&self, rest: impl IntoIterator<Item = ComponentRef>) {
		let mut state = self.0.borrow_mut();
		let mut pending = Vec::new();
		for component in rest {
			if state.queued.insert(component.id()) {
				pending.push(component);
			}
		}
		pending.append(&mut state.pending);
		state.pending = pending;
	}

	fn is_flushing(&self) -> bool {
		self.0.borrow().flushing
	}

	fn set_retry(&self) {
		self.0.borrow_mut().retry = true;
	}

	fn take_retry(&self) -> bool {
		core::mem::take(&mut self.0.borrow_mut().retry)
	}

	pub(crate) fn len(&self) -> usize {
		self.0.borrow().pending.len()
	}
}

impl Shared {
	fn is_idle(&self) -> bool {
		!self.queue.is_flushing() && !self.differ.is_busy()
	}

	/// Marks `component` dirty and queues it once.
	pub(crate) fn enqueue_render(&self, component: &ComponentRef) -> Result<()> {
		if component.is_disabled() {
			trace!(component = component.name(), "Disabled, not enqueueing.");
			return Ok(());
		}
		component.mark_dirty();
		if self.queue.push(component) {
			trace!(component = component.name(), "Enqueued.");
		} else {
			// May be left over from a failed flush, so scheduling is still checked.
			trace!(component = component.name(), "Already queued.");
		}
		self.schedule()
	}

	fn schedule(&self) -> Result<()> {
		if !self.queue.mark_scheduled() {
			return Ok(());
		}
		match self.options.debounce_rendering() {
			Debounce::Sync => {
				if self.is_idle() {
					self.rerender()
				} else {
					self.queue.set_retry();
					Ok(())
				}
			}
			Debounce::Deferred => Ok(()),
			Debounce::Custom(debouncer) => {
				let shared = self.this.clone();
				debouncer(Box::new(move || {
					if let Some(shared) = shared.upgrade() {
						if let Err(error) = shared.rerender() {
							error!(%error, "Deferred render failed.");
						}
					}
				}));
				Ok(())
			}
		}
	}

	/// Renders every queued dirty instance.
	///
	/// Unmounted, disabled and already-clean instances are skipped. If a render fails, the
	/// instances this flush hasn't reached yet are queued again (and, unless flushing is
	/// synchronous, a new flush is scheduled for them) and the error is returned.
	pub(crate) fn rerender(&self) -> Result<()> {
		loop {
			if !self.is_idle() {
				trace!("Busy, postponing flush.");
				self.queue.set_retry();
				return Ok(());
			}

			let batch = self.queue.begin_flush();
			if batch.is_empty() {
				self.queue.end_flush();
				return Ok(());
			}
			info!(count = batch.len(), "Flushing render queue.");

			let mut batch = batch.into_iter();
			let mut outcome = Ok(());
			while let Some(component) = batch.next() {
				if matches!(component.lifecycle(), Lifecycle::Unmounted | Lifecycle::Unmounting) || component.is_disabled() || !component.is_dirty() {
					trace!(component = component.name(), "Skipping.");
					continue;
				}
				if let Err(error) = self.differ.render_component(&component, RenderMode::Sync, false) {
					outcome = Err(error);
					break;
				}
			}
			if outcome.is_err() {
				self.queue.requeue(batch);
			}
			self.queue.end_flush();
			if let Err(error) = outcome {
				// In synchronous mode, the next enqueue flushes the rest.
				if self.queue.len() > 0 && !matches!(self.options.debounce_rendering(), Debounce::Sync) {
					trace!(pending = self.queue.len(), "Rescheduling after a failed flush.");
					self.schedule()?;
				}
				return Err(error);
			}

			let again = self.queue.len() > 0 && (matches!(self.options.debounce_rendering(), Debounce::Sync) || self.queue.take_retry());
			if !again {
				return Ok(());
			}
		}
	}

	/// Runs postponed work once the outermost public operation is done.
	pub(crate) fn settle(&self) -> Result<()> {
		if self.is_idle() && self.queue.len() > 0 && (matches!(self.options.debounce_rendering(), Debounce::Sync) || self.queue.take_retry()) {
			return self.rerender();
		}
		Ok(())
	}
}
