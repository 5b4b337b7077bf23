//! Maps one virtual attribute change onto host primitives.

use crate::{
	host::{Host, NodeId},
	options::Options,
	value::{EventHandler, Value},
};
use tracing::trace;

/// Attributes that steer the differ and never reach the host.
pub(crate) fn is_reserved(name: &str) -> bool {
	matches!(name, "key" | "ref" | "children")
}

/// The event name if `name` binds a listener (`onClick` → `click`).
pub(crate) fn event_name(name: &str) -> Option<String> {
	if name.len() > 2 && name.starts_with("on") {
		Some(name[2..].to_lowercase())
	} else {
		None
	}
}

/// Applies the change of attribute `name` from `old` to `value` on `node`.
///
/// Handlers are compared by identity, so re-rendering with the same handler touches nothing.
pub(crate) fn set_accessor(host: &mut dyn Host, options: &Options, node: NodeId, name: &str, old: Option<&Value>, value: Option<&Value>) {
	let name = if name == "className" { "class" } else { name };

	if let Some(event) = event_name(name) {
		let old_handler = match old {
			Some(Value::Handler(handler)) => Some(handler),
			_ => None,
		};
		let new_handler = match value {
			Some(Value::Handler(handler)) => Some(handler),
			_ => None,
		};
		match (old_handler, new_handler) {
			(Some(old), Some(new)) if old == new => (),
			(_, Some(handler)) => {
				trace!(?node, event = %event, "Binding listener.");
				host.set_listener(node, &event, Some(wrap(options, handler)));
			}
			(Some(_), None) => {
				trace!(?node, event = %event, "Unbinding listener.");
				host.set_listener(node, &event, None);
			}
			(None, None) => (),
		}
		if new_handler.is_some() || old_handler.is_some() {
			return;
		}
	}

	match value.and_then(Value::to_attribute_value) {
		Some(text) => host.set_attribute(node, name, &text),
		None => host.remove_attribute(node, name),
	}
}

fn wrap(options: &Options, handler: &EventHandler) -> EventHandler {
	let options = options.clone();
	let handler = handler.clone();
	EventHandler::new(move |event| {
		let event = options.process_event(event.clone());
		handler.call(&event);
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{host::Event, MemoryHost};
	use std::{cell::Cell, rc::Rc};

	#[test]
	fn event_names() {
		assert_eq!(event_name("onClick").as_deref(), Some("click"));
		assert_eq!(event_name("on"), None);
		assert_eq!(event_name("title"), None);
	}

	#[test]
	fn class_name_and_booleans() {
		let mut host = MemoryHost::new();
		let options = Options::new();
		let input = host.create_element("input", false);
		set_accessor(&mut host, &options, input, "className", None, Some(&Value::from("a")));
		set_accessor(&mut host, &options, input, "disabled", None, Some(&Value::Bool(true)));
		assert_eq!(host.attribute(input, "class").as_deref(), Some("a"));
		assert_eq!(host.attribute(input, "disabled").as_deref(), Some(""));

		set_accessor(&mut host, &options, input, "disabled", Some(&Value::Bool(true)), Some(&Value::Bool(false)));
		assert_eq!(host.attribute(input, "disabled"), None);
	}

	#[test]
	fn same_handler_is_not_rebound() {
		let mut host = MemoryHost::new();
		let options = Options::new();
		let button = host.create_element("button", false);
		let clicks = Rc::new(Cell::new(0));
		let handler = Value::Handler(EventHandler::new({
			let clicks = Rc::clone(&clicks);
			move |_| clicks.set(clicks.get() + 1)
		}));

		set_accessor(&mut host, &options, button, "onClick", None, Some(&handler));
		set_accessor(&mut host, &options, button, "onClick", Some(&handler), Some(&handler));
		assert_eq!(host.mutations().listeners_added, 1);
		assert!(host.dispatch(button, &Event::new("click")));
		assert_eq!(clicks.get(), 1);

		set_accessor(&mut host, &options, button, "onClick", Some(&handler), None);
		assert_eq!(host.listener_count(button), 0);
		assert_eq!(host.attribute(button, "onClick"), None);
	}

	#[test]
	fn event_hook_sees_dispatch() {
		let mut host = MemoryHost::new();
		let options = Options::new();
		options.on_event(|event| Some(event.with("seen", true)));
		let button = host.create_element("button", false);
		let seen = Rc::new(Cell::new(false));
		let handler = Value::Handler(EventHandler::new({
			let seen = Rc::clone(&seen);
			move |event| seen.set(event.detail.get("seen").and_then(Value::as_bool) == Some(true))
		}));
		set_accessor(&mut host, &options, button, "onClick", None, Some(&handler));
		host.dispatch(button, &Event::new("click"));
		assert!(seen.get());
	}
}
