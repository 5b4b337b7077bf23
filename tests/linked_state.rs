mod common;

use common::setup;
use lignin_reconcile::{attrs, h, Component, ComponentRef, ComponentType, Context, Debounce, Event, HookResult, Props, Result, State, VNode, Value};

/// A text field, a checkbox and a custom widget bound to state.
struct Form;
impl Component for Form {
	fn create(_: &Props, _: &Context) -> Self {
		Form
	}

	fn initial_state(&self, _: &Props) -> State {
		attrs! {
			"text" => "",
			"agree" => false,
			"profile" => attrs! { "name" => "anonymous", "age" => 30 },
		}
	}

	fn render(&self, this: &ComponentRef, _: &Props, state: &State, _: &Context) -> HookResult<Option<VNode>> {
		let text = state.get("text").cloned().unwrap_or(Value::Null);
		Ok(Some(h(
			"form",
			attrs! {},
			vec![
				h("input", attrs! { "type" => "text", "value" => text, "onInput" => this.link_state("text", None) }, vec![]),
				h("input", attrs! { "type" => "checkbox", "onChange" => this.link_state("agree", None) }, vec![]),
				h("div", attrs! { "onPick" => this.link_state("profile.name", Some("choice.label")) }, vec![]),
			],
		)))
	}
}

fn mount() -> Result<(lignin_reconcile::MemoryHost, lignin_reconcile::Renderer, ComponentRef, Vec<lignin_reconcile::NodeId>)> {
	let (host, root, renderer) = setup(Debounce::Deferred);
	let form = renderer.render(&h(ComponentType::of::<Form>(), attrs! {}, vec![]), root)?;
	let instance = renderer.component_at(form).unwrap();
	let fields = host.children(form);
	Ok((host, renderer, instance, fields))
}

#[test]
fn text_input_binding() -> Result<()> {
	let (host, renderer, form, fields) = mount()?;
	assert_eq!(host.attribute(fields[0], "value").as_deref(), Some(""));

	host.reset_mutations();
	assert!(host.dispatch(fields[0], &Event::new("input").with("type", "text").with("value", "hello")));
	assert_eq!(form.state().get("text"), Some(&Value::from("hello")));
	assert!(renderer.has_pending_renders());

	renderer.rerender()?;
	assert_eq!(host.attribute(fields[0], "value").as_deref(), Some("hello"));
	let mutations = host.mutations();
	assert_eq!(mutations.attributes_set, 1);
	assert_eq!(mutations.listeners_added, 0);
	assert_eq!(mutations.listeners_removed, 0);
	Ok(())
}

#[test]
fn checkbox_binding() -> Result<()> {
	let (host, renderer, form, fields) = mount()?;
	host.dispatch(fields[1], &Event::new("change").with("type", "checkbox").with("checked", true).with("value", "on"));
	renderer.rerender()?;
	assert_eq!(form.state().get("agree"), Some(&Value::Bool(true)));
	Ok(())
}

#[test]
fn nested_key_from_event_path() -> Result<()> {
	let (host, renderer, form, fields) = mount()?;
	host.dispatch(fields[2], &Event::new("pick").with("choice", attrs! { "label" => "Ada" }));
	renderer.rerender()?;
	assert_eq!(
		form.state().get("profile"),
		Some(&Value::from(attrs! { "name" => "Ada", "age" => 30 }))
	);
	Ok(())
}

#[test]
fn handlers_are_memoized() -> Result<()> {
	let (_host, _renderer, form, _fields) = mount()?;
	assert_eq!(form.link_state("text", None), form.link_state("text", None));
	assert_ne!(form.link_state("text", None), form.link_state("text", Some("detail")));
	Ok(())
}
