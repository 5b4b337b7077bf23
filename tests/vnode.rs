use lignin_reconcile::{attrs, clone_element, h, Component, ComponentType, Context, Key, Props, VNode, Value};

#[test]
fn adjacent_text_is_merged() {
	let vnode = h("p", attrs! {}, vec![VNode::text("a"), "b".into(), h("br", attrs! {}, vec![]), VNode::text("c")]);
	let children = vnode.children();
	assert_eq!(children.len(), 3);
	assert_eq!(children[0], VNode::text("ab"));
	assert_eq!(children[2], VNode::text("c"));
}

#[test]
fn keys_come_from_attributes() {
	assert_eq!(h("li", attrs! { "key" => 7 }, vec![]).key(), Some(&Key::Int(7)));
	assert_eq!(h("li", attrs! { "key" => "x" }, vec![]).key(), Some(&Key::from("x")));
	assert_eq!(h("li", attrs! {}, vec![]).key(), None);
	assert_eq!(VNode::text("t").key(), None);
}

struct Empty;
impl Component for Empty {
	fn create(_: &Props, _: &Context) -> Self {
		Empty
	}
}

#[test]
fn component_props_exclude_key_and_ref() {
	let vnode = h(ComponentType::of::<Empty>(), attrs! { "key" => 1, "label" => "x" }, vec![VNode::text("child")]);
	match &vnode {
		VNode::Component(element) => {
			let props = element.props();
			assert_eq!(props.get("key"), None);
			assert_eq!(props.get("label"), Some(&Value::from("x")));
			assert_eq!(props.children(), &[VNode::text("child")]);
		}
		other => panic!("not a component: {:?}", other),
	}
}

#[test]
fn clone_element_merges_props() {
	let original = h("a", attrs! { "href" => "/", "class" => "link", "key" => 1 }, vec![VNode::text("home")]);

	let restyled = clone_element(&original, attrs! { "class" => "active" }, None);
	assert_eq!(restyled.attributes().unwrap(), &attrs! { "href" => "/", "class" => "active", "key" => 1 });
	assert_eq!(restyled.children(), original.children());
	assert_eq!(restyled.key(), Some(&Key::Int(1)));

	let rekeyed = clone_element(&original, attrs! { "key" => 2 }, Some(vec![]));
	assert_eq!(rekeyed.key(), Some(&Key::Int(2)));
	assert!(rekeyed.children().is_empty());

	assert_eq!(clone_element(&VNode::text("t"), attrs! { "class" => "x" }, None), VNode::text("t"));
}
