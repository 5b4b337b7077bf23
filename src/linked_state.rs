//! Event handlers that write an event-derived value into component state.

use crate::{
	component::{ComponentRef, State},
	host::Event,
	value::{EventHandler, Map, Value},
};
use tracing::{error, trace};

pub(crate) fn create_linked_state(component: &ComponentRef, key: &str, event_path: Option<&str>) -> EventHandler {
	let component = component.downgrade();
	let path: Vec<String> = key.split('.').map(str::to_owned).collect();
	let event_path = event_path.map(str::to_owned);
	EventHandler::new(move |event| {
		let component = match component.upgrade() {
			Some(component) => component,
			None => return,
		};
		let value = extract(event, event_path.as_deref());
		trace!(component = component.name(), key = %path.join("."), "Linked state update.");
		let partial = {
			let state = component.state();
			partial_state(&state, &path, value)
		};
		if let Err(error) = component.set_state(partial) {
			error!(component = component.name(), %error, "Linked state update failed.");
		}
	})
}

fn extract(event: &Event, event_path: Option<&str>) -> Value {
	if let Some(path) = event_path {
		return event.lookup(path).cloned().unwrap_or(Value::Null);
	}
	if event.target.is_none() {
		return Value::Map(event.detail.clone());
	}
	let checkable = event.detail.get("type").and_then(Value::as_str).map_or(false, |ty| ty.starts_with("che") || ty.starts_with("rad"));
	let field = if checkable { "checked" } else { "value" };
	event.detail.get(field).cloned().unwrap_or(Value::Null)
}

/// The shallow partial that sets `path` to `value`, keeping siblings along the path.
fn partial_state(state: &State, path: &[String], value: Value) -> State {
	let mut partial = Map::new();
	if let Some((first, rest)) = path.split_first() {
		let current = state.get(first);
		partial.insert(first.clone(), assign(current, rest, value));
	}
	partial
}

fn assign(current: Option<&Value>, rest: &[String], value: Value) -> Value {
	let (segment, rest) = match rest.split_first() {
		Some(split) => split,
		None => return value,
	};
	let mut map = current.and_then(Value::as_map).cloned().unwrap_or_default();
	let next = assign(map.get(segment), rest, value);
	map.insert(segment.clone(), next);
	Value::Map(map)
}
