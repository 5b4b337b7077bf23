mod common;

use common::{journal, setup};
use lignin_reconcile::{attrs, h, Component, ComponentRef, ComponentType, Context, Debounce, HookResult, Props, Result, State, VNode, Value};
use std::{cell::RefCell, rc::Rc};

fn int(state: &State, name: &str) -> i64 {
	state.get(name).and_then(Value::as_int).unwrap_or(0)
}

struct Tally;
impl Component for Tally {
	fn create(_: &Props, _: &Context) -> Self {
		Tally
	}

	fn initial_state(&self, _: &Props) -> State {
		attrs! { "a" => 0, "b" => 0 }
	}

	fn render(&self, _: &ComponentRef, props: &Props, state: &State, _: &Context) -> HookResult<Option<VNode>> {
		journal().push("render");
		let label = props.get("label").and_then(Value::as_str).unwrap_or("tally").to_owned();
		Ok(Some(h("span", attrs! { "title" => label }, vec![VNode::text(format!("{}/{}", int(state, "a"), int(state, "b")))])))
	}
}

fn tally() -> VNode {
	h(ComponentType::of::<Tally>(), attrs! {}, vec![])
}

#[test]
fn state_changes_are_batched() -> Result<()> {
	let (host, root, renderer) = setup(Debounce::Deferred);
	let span = renderer.render(&tally(), root)?;
	let instance = renderer.component_at(span).unwrap();
	journal().take();

	instance.set_state_then(attrs! { "a" => 10 }, || journal().push("first callback"))?;
	instance.set_state_with(|state, _| attrs! { "a" => int(state, "a") + 1 })?;
	instance.set_state_then(attrs! { "b" => 2 }, || journal().push("second callback"))?;

	assert!(instance.is_dirty());
	assert!(renderer.has_pending_renders());
	assert_eq!(int(&instance.previous_state().unwrap(), "a"), 0);
	assert_eq!(host.inner_html(root), "<span title=\"tally\">0/0</span>");

	renderer.rerender()?;
	assert_eq!(journal().take(), ["render", "first callback", "second callback"]);
	assert_eq!(*instance.state(), attrs! { "a" => 11, "b" => 2 });
	assert_eq!(instance.previous_state(), None);
	assert!(!instance.is_dirty());
	assert!(!renderer.has_pending_renders());
	assert_eq!(host.inner_html(root), "<span title=\"tally\">11/2</span>");

	renderer.rerender()?;
	assert_eq!(journal().count("render"), 0);
	Ok(())
}

#[test]
fn sync_debounce_renders_immediately() -> Result<()> {
	let (host, root, renderer) = setup(Debounce::Sync);
	let span = renderer.render(&tally(), root)?;
	let instance = renderer.component_at(span).unwrap();
	journal().take();

	instance.set_state(attrs! { "a" => 1 })?;
	assert_eq!(journal().take(), ["render"]);
	assert_eq!(host.inner_html(root), "<span title=\"tally\">1/0</span>");
	assert!(!renderer.has_pending_renders());
	Ok(())
}

/// Sets state as soon as it is mounted.
struct Eager;
impl Component for Eager {
	fn create(_: &Props, _: &Context) -> Self {
		Eager
	}

	fn render(&self, _: &ComponentRef, _: &Props, state: &State, _: &Context) -> HookResult<Option<VNode>> {
		let text = if state.get("mounted").map_or(false, Value::is_truthy) { "mounted" } else { "mounting" };
		Ok(Some(h("p", attrs! {}, vec![VNode::text(text)])))
	}

	fn component_did_mount(&self, this: &ComponentRef) -> HookResult {
		this.set_state(attrs! { "mounted" => true })?;
		Ok(())
	}
}

#[test]
fn sync_debounce_catches_up_after_a_pass() -> Result<()> {
	let (host, root, renderer) = setup(Debounce::Sync);
	renderer.render(&h("main", attrs! {}, vec![h(ComponentType::of::<Eager>(), attrs! {}, vec![])]), root)?;
	assert_eq!(host.inner_html(root), "<main><p>mounted</p></main>");
	assert!(!renderer.has_pending_renders());
	Ok(())
}

#[test]
fn deferred_debounce_waits_for_rerender() -> Result<()> {
	let (host, root, renderer) = setup(Debounce::Deferred);
	renderer.render(&h(ComponentType::of::<Eager>(), attrs! {}, vec![]), root)?;
	assert_eq!(host.inner_html(root), "<p>mounting</p>");
	assert!(renderer.has_pending_renders());

	renderer.rerender()?;
	assert_eq!(host.inner_html(root), "<p>mounted</p>");
	Ok(())
}

#[test]
fn unmounted_instances_are_skipped() -> Result<()> {
	let (host, root, renderer) = setup(Debounce::Deferred);
	let span = renderer.render(&tally(), root)?;
	let instance = renderer.component_at(span).unwrap();
	journal().take();

	instance.set_state(attrs! { "a" => 1 })?;
	renderer.unmount(span)?;
	renderer.rerender()?;
	assert_eq!(journal().count("render"), 0);
	assert!(!renderer.has_pending_renders());
	assert!(host.children(root).is_empty());

	// Unmounted instances don't queue at all.
	instance.set_state(attrs! { "a" => 2 })?;
	assert!(!renderer.has_pending_renders());
	Ok(())
}

#[test]
fn custom_debounce_hands_off_one_flush() -> Result<()> {
	let tasks: Rc<RefCell<Vec<Box<dyn FnOnce()>>>> = Rc::default();
	let (host, root, renderer) = setup(Debounce::Custom(Rc::new({
		let tasks = Rc::clone(&tasks);
		move |task| tasks.borrow_mut().push(task)
	})));
	let span = renderer.render(&tally(), root)?;
	let instance = renderer.component_at(span).unwrap();
	journal().take();

	instance.set_state(attrs! { "a" => 1 })?;
	instance.set_state(attrs! { "b" => 1 })?;
	assert_eq!(tasks.borrow().len(), 1);
	assert_eq!(journal().count("render"), 0);

	let task = tasks.borrow_mut().pop().unwrap();
	task();
	assert_eq!(journal().take(), ["render"]);
	assert_eq!(host.inner_html(root), "<span title=\"tally\">1/1</span>");

	// A new batch schedules a new flush.
	instance.set_state(attrs! { "a" => 2 })?;
	assert_eq!(tasks.borrow().len(), 1);

	drop(renderer);
	let task = tasks.borrow_mut().pop().unwrap();
	task();
	assert_eq!(journal().count("render"), 0);
	Ok(())
}

#[test]
fn asynchronous_component_updates_are_queued() -> Result<()> {
	let (host, root, renderer) = setup(Debounce::Deferred);
	renderer.options().set_sync_component_updates(false);
	let labelled = |label: &str| h(ComponentType::of::<Tally>(), attrs! { "label" => label }, vec![]);

	renderer.render(&labelled("first"), root)?;
	assert_eq!(host.inner_html(root), "<span title=\"first\">0/0</span>");

	renderer.render(&labelled("second"), root)?;
	assert_eq!(host.inner_html(root), "<span title=\"first\">0/0</span>");
	assert!(renderer.has_pending_renders());

	renderer.rerender()?;
	assert_eq!(host.inner_html(root), "<span title=\"second\">0/0</span>");
	Ok(())
}

/// Fails to render while its `fail` state is set.
struct Flaky;
impl Component for Flaky {
	fn create(_: &Props, _: &Context) -> Self {
		Flaky
	}

	fn render(&self, _: &ComponentRef, _: &Props, state: &State, _: &Context) -> HookResult<Option<VNode>> {
		if state.get("fail").map_or(false, Value::is_truthy) {
			return Err("flaky".into());
		}
		Ok(Some(h("b", attrs! {}, vec![])))
	}
}

#[test]
fn failed_flushes_keep_the_rest_queued() -> Result<()> {
	let (host, root, renderer) = setup(Debounce::Deferred);
	let div = renderer.render(&h("div", attrs! {}, vec![h(ComponentType::of::<Flaky>(), attrs! {}, vec![]), tally()]), root)?;
	let children = host.children(div);
	let flaky = renderer.component_at(children[0]).unwrap();
	let tally = renderer.component_at(children[1]).unwrap();
	journal().take();

	flaky.set_state(attrs! { "fail" => true })?;
	tally.set_state(attrs! { "a" => 5 })?;
	assert!(renderer.rerender().is_err());
	assert_eq!(journal().count("render"), 0);
	assert!(renderer.has_pending_renders());

	renderer.rerender()?;
	assert_eq!(journal().take(), ["render"]);
	assert_eq!(host.inner_html(div), "<b></b><span title=\"tally\">5/0</span>");
	assert!(!renderer.has_pending_renders());
	Ok(())
}

#[test]
fn failed_custom_flushes_reschedule_the_rest() -> Result<()> {
	let tasks: Rc<RefCell<Vec<Box<dyn FnOnce()>>>> = Rc::default();
	let (host, root, renderer) = setup(Debounce::Custom(Rc::new({
		let tasks = Rc::clone(&tasks);
		move |task| tasks.borrow_mut().push(task)
	})));
	let div = renderer.render(&h("div", attrs! {}, vec![h(ComponentType::of::<Flaky>(), attrs! {}, vec![]), tally()]), root)?;
	let children = host.children(div);
	let flaky = renderer.component_at(children[0]).unwrap();
	let tally = renderer.component_at(children[1]).unwrap();
	journal().take();

	flaky.set_state(attrs! { "fail" => true })?;
	tally.set_state(attrs! { "a" => 5 })?;
	assert_eq!(tasks.borrow().len(), 1);

	let task = tasks.borrow_mut().pop().unwrap();
	task();
	assert_eq!(journal().count("render"), 0);
	assert!(renderer.has_pending_renders());
	assert_eq!(tasks.borrow().len(), 1);

	// Still queued, so this only updates the state the pending flush will render.
	tally.set_state(attrs! { "a" => 6 })?;
	assert_eq!(tasks.borrow().len(), 1);

	let task = tasks.borrow_mut().pop().unwrap();
	task();
	assert_eq!(journal().take(), ["render"]);
	assert_eq!(host.inner_html(div), "<b></b><span title=\"tally\">6/0</span>");
	assert!(!renderer.has_pending_renders());
	assert!(tasks.borrow().is_empty());
	Ok(())
}

/// Sets state once from `component_did_update`.
struct Echo;
impl Component for Echo {
	fn create(_: &Props, _: &Context) -> Self {
		Echo
	}

	fn render(&self, _: &ComponentRef, _: &Props, state: &State, _: &Context) -> HookResult<Option<VNode>> {
		journal().push("render");
		Ok(Some(h("span", attrs! {}, vec![VNode::text(int(state, "n").to_string())])))
	}

	fn component_did_update(&self, this: &ComponentRef, _: &Props, _: &State, _: &Context) -> HookResult {
		if !this.state().get("echoed").map_or(false, Value::is_truthy) {
			this.set_state(attrs! { "echoed" => true })?;
		}
		Ok(())
	}
}

#[test]
fn changes_made_during_a_flush_wait_for_the_next_one() -> Result<()> {
	let (_host, root, renderer) = setup(Debounce::Deferred);
	let span = renderer.render(&h(ComponentType::of::<Echo>(), attrs! {}, vec![]), root)?;
	let echo = renderer.component_at(span).unwrap();
	journal().take();

	echo.set_state(attrs! { "n" => 1 })?;
	renderer.rerender()?;
	assert_eq!(journal().take(), ["render"]);
	assert!(renderer.has_pending_renders());
	assert!(echo.is_dirty());

	renderer.rerender()?;
	assert_eq!(journal().take(), ["render"]);
	assert!(!renderer.has_pending_renders());
	assert_eq!(echo.state().get("echoed"), Some(&Value::Bool(true)));

	renderer.rerender()?;
	assert!(journal().take().is_empty());
	Ok(())
}

/// Journals its label on every render.
struct Named;
impl Component for Named {
	fn create(_: &Props, _: &Context) -> Self {
		Named
	}

	fn render(&self, _: &ComponentRef, props: &Props, _: &State, _: &Context) -> HookResult<Option<VNode>> {
		let label = props.get("label").and_then(Value::as_str).unwrap_or_default().to_owned();
		journal().push(format!("render {}", label));
		Ok(Some(h("i", attrs! {}, vec![VNode::text(label)])))
	}
}

#[test]
fn siblings_flush_in_first_dirtied_order() -> Result<()> {
	let (host, root, renderer) = setup(Debounce::Deferred);
	let named = |label: &str| h(ComponentType::of::<Named>(), attrs! { "label" => label }, vec![]);
	let div = renderer.render(&h("div", attrs! {}, vec![named("x"), named("y")]), root)?;
	let children = host.children(div);
	let x = renderer.component_at(children[0]).unwrap();
	let y = renderer.component_at(children[1]).unwrap();
	journal().take();

	y.set_state(attrs! { "step" => 1 })?;
	x.set_state(attrs! { "step" => 1 })?;
	y.set_state(attrs! { "step" => 2 })?;
	renderer.rerender()?;
	assert_eq!(journal().take(), ["render y", "render x"]);
	Ok(())
}
