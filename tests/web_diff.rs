#![cfg(target_arch = "wasm32")]

use lignin_reconcile::{attrs, h, load::load_element, Options, Renderer, VNode, WebHost};
use std::sync::Once;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Element, HtmlBodyElement, Node};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INIT: Once = Once::new();

fn container(markup: &str) -> (WebHost, Element) {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let document = window().unwrap().document().unwrap();
	let body = document.body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let div = document.create_element("div").unwrap();
	div.set_inner_html(markup);
	body.append_child(&div).unwrap();
	(WebHost::new(document), div)
}

fn list(keys: &[i64]) -> VNode {
	h("ul", attrs! {}, keys.iter().map(|&key| h("li", attrs! { "key" => key }, vec![VNode::text(key.to_string())])))
}

fn items(ul: &Node) -> Vec<Node> {
	let children = ul.child_nodes();
	(0..children.length()).filter_map(|i| children.item(i)).collect()
}

#[wasm_bindgen_test]
fn create_diff_identical_remove() {
	let (host, div) = container("");
	let root = host.adopt(&div);
	let renderer = Renderer::with_options(host.clone(), Options::new());

	let ul = renderer.render(&list(&[1, 2, 3]), root).unwrap();
	assert_eq!(div.inner_html(), "<ul><li>1</li><li>2</li><li>3</li></ul>");
	let before = items(&host.node(ul).unwrap());

	renderer.render(&list(&[1, 2, 3]), root).unwrap();
	let after = items(&host.node(ul).unwrap());
	assert!(before.iter().zip(&after).all(|(a, b)| a.is_same_node(Some(b))));

	renderer.render(&list(&[3, 1, 2]), root).unwrap();
	assert_eq!(div.inner_html(), "<ul><li>3</li><li>1</li><li>2</li></ul>");
	let moved = items(&host.node(ul).unwrap());
	assert!(moved[0].is_same_node(Some(&before[2])));
	assert!(moved[1].is_same_node(Some(&before[0])));

	renderer.unmount(ul).unwrap();
	assert_eq!(div.inner_html(), "");
}

#[wasm_bindgen_test]
fn hydrate_server_markup() {
	let (host, div) = container(r#"<p class="a" data-stale="1">hi</p>"#);
	let existing = div.first_child().unwrap();
	let root = host.adopt(&div);
	let renderer = Renderer::with_options(host.clone(), Options::new());

	let p = renderer.render(&h("p", attrs! { "class" => "a" }, vec![VNode::text("hi")]), root).unwrap();
	assert!(host.node(p).unwrap().is_same_node(Some(&existing)));
	assert_eq!(div.inner_html(), r#"<p class="a">hi</p>"#);
}

#[wasm_bindgen_test]
fn load_markup() {
	let (_host, div) = container(r#"<section id="s"><b>bold</b>text<!-- skipped --></section>"#);
	let section = div.first_element_child().unwrap();
	assert_eq!(
		load_element(&section),
		h("section", attrs! { "id" => "s" }, vec![h("b", attrs! {}, vec![VNode::text("bold")]), VNode::text("text")])
	);
}
