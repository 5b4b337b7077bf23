#![cfg(target_arch = "wasm32")]

use lignin_reconcile::{attrs, h, EventHandler, Options, Renderer, WebHost};
use std::{cell::RefCell, rc::Rc, sync::Once};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlBodyElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INIT: Once = Once::new();

#[wasm_bindgen_test]
fn click() {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let document = window().unwrap().document().unwrap();
	let body = document.body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let host = WebHost::new(document.clone());
	let root = host.adopt(&body);
	let renderer = Renderer::with_options(host.clone(), Options::new());

	let clicks = Rc::new(RefCell::new(Vec::new()));
	let handler = EventHandler::new({
		let clicks = Rc::clone(&clicks);
		move |event| clicks.borrow_mut().push((event.kind.clone(), event.target))
	});

	let vdom = h("button", attrs! { "id" => "test-button", "onClick" => handler.clone() }, vec![]);
	let button_id = renderer.render_into(&vdom, root, None).unwrap();
	assert!(clicks.borrow().is_empty());

	let button: HtmlElement = document.get_element_by_id("test-button").unwrap().dyn_into().unwrap();
	button.click();
	assert_eq!(*clicks.borrow(), vec![("click".to_owned(), Some(button_id))]);

	// Same handler: the listener stays bound.
	renderer.render_into(&vdom, root, Some(button_id)).unwrap();
	button.click();
	assert_eq!(clicks.borrow().len(), 2);

	renderer.unmount(button_id).unwrap();
	assert!(document.get_element_by_id("test-button").is_none());
	button.click();
	assert_eq!(clicks.borrow().len(), 2);
}
