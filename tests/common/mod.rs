#![allow(dead_code)]

use lignin_reconcile::{Debounce, MemoryHost, NodeId, Options, Renderer};
use std::{cell::RefCell, rc::Rc};

pub fn init_logging() {
	let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init();
}

/// A renderer over a fresh in-memory document, with its own options table.
pub fn setup(debounce: Debounce) -> (MemoryHost, NodeId, Renderer) {
	init_logging();
	let host = MemoryHost::new();
	let root = host.create_root("body");
	let options = Options::new();
	options.set_debounce_rendering(debounce);
	let renderer = Renderer::with_options(host.clone(), options);
	(host, root, renderer)
}

/// Shared, append-only record of what happened, in order.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);
impl Journal {
	pub fn push(&self, entry: impl Into<String>) {
		self.0.borrow_mut().push(entry.into())
	}

	pub fn take(&self) -> Vec<String> {
		self.0.borrow_mut().drain(..).collect()
	}

	pub fn count(&self, entry: &str) -> usize {
		self.0.borrow().iter().filter(|e| e.as_str() == entry).count()
	}
}

thread_local! {
	static JOURNAL: Journal = Journal::default();
}

/// The journal of the current test thread. Components reach it without any plumbing.
pub fn journal() -> Journal {
	JOURNAL.with(Journal::clone)
}
