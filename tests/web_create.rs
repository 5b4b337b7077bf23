#![cfg(target_arch = "wasm32")]

use lignin_reconcile::{attrs, h, NodeId, Options, RefCallback, RefTarget, Renderer, VNode, WebHost};
use std::{cell::RefCell, rc::Rc, sync::Once};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Element, HtmlBodyElement};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INIT: Once = Once::new();

/// A fresh `<div>` in the page body, so that tests don't see each other's output.
fn container() -> (WebHost, Element, NodeId) {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let document = window().unwrap().document().unwrap();
	let body = document.body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let div = document.create_element("div").unwrap();
	body.append_child(&div).unwrap();

	let host = WebHost::new(document);
	let id = host.adopt(&div);
	(host, div, id)
}

#[wasm_bindgen_test]
fn text() {
	let (host, div, root) = container();
	let renderer = Renderer::with_options(host, Options::new());
	renderer.render(&VNode::text("Hello lignin-reconcile!"), root).unwrap();
	assert_eq!(div.inner_html(), "Hello lignin-reconcile!");
}

#[wasm_bindgen_test]
fn element_with_ref() {
	let (host, div, root) = container();
	let renderer = Renderer::with_options(host.clone(), Options::new());

	let got_ref = Rc::new(RefCell::new(Vec::new()));
	let callback = RefCallback::new({
		let got_ref = Rc::clone(&got_ref);
		move |target| got_ref.borrow_mut().push(target)
	});

	let vnode = h("p", attrs! { "class" => "greeting", "ref" => callback }, vec![VNode::text("Hi")]);
	let p = renderer.render(&vnode, root).unwrap();
	assert_eq!(div.inner_html(), r#"<p class="greeting">Hi</p>"#);
	assert_eq!(*got_ref.borrow(), vec![Some(RefTarget::Element(p))]);
	assert!(host.node(p).unwrap().is_same_node(div.first_child().as_ref()));

	renderer.unmount(p).unwrap();
	assert_eq!(div.inner_html(), "");
	assert_eq!(got_ref.borrow().len(), 2);
}

#[wasm_bindgen_test]
fn svg_namespace() {
	let (host, _div, root) = container();
	let renderer = Renderer::with_options(host.clone(), Options::new());
	let svg = renderer.render(&h("svg", attrs! {}, vec![h("circle", attrs! { "r" => 4 }, vec![])]), root).unwrap();
	let circle = host.node(svg).unwrap().first_child().unwrap().dyn_into::<Element>().unwrap();
	assert_eq!(circle.namespace_uri().as_deref(), Some("http://www.w3.org/2000/svg"));
	assert_eq!(circle.get_attribute("r").as_deref(), Some("4"));
}

#[wasm_bindgen_test]
fn replaced_text_is_released() {
	let (host, div, root) = container();
	let renderer = Renderer::with_options(host.clone(), Options::new());
	let text = renderer.render(&VNode::text("before"), root).unwrap();
	let text_node = host.node(text).unwrap();

	let p = renderer.render(&h("p", attrs! {}, vec![]), root).unwrap();
	assert_eq!(div.inner_html(), "<p></p>");
	assert!(host.node(text).is_none());
	assert!(host.node(p).is_some());

	// The freed id goes to the next registration.
	assert_eq!(host.adopt(&text_node), text);
}
