#![cfg(target_arch = "wasm32")]

use em_core::{DomEvent, Element, EventKind, Host};
use em_wasm::{is_url_allowed, start, BrowserHost};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn strings(items: &[&str]) -> JsValue {
    let array = js_sys::Array::new();
    for item in items {
        array.push(&JsValue::from_str(item));
    }
    array.into()
}

#[wasm_bindgen_test]
fn url_gate_block_wins() {
    let allow = strings(&["*://site.com/*"]);
    let block = strings(&["*://site.com/login*"]);
    assert!(is_url_allowed("https://site.com/signup", allow.clone(), block.clone()));
    assert!(!is_url_allowed("https://site.com/login", allow, block));
    assert!(!is_url_allowed("https://site.com/", JsValue::UNDEFINED, JsValue::UNDEFINED));
}

#[wasm_bindgen_test]
fn url_gate_ignores_non_array_lists() {
    let bare = JsValue::from_str("*://site.com/*");
    assert!(!is_url_allowed("https://other.com/", bare.clone(), JsValue::UNDEFINED));
    assert!(!is_url_allowed("https://site.com/", bare, JsValue::NULL));

    let block = JsValue::from_str("*://site.com/*");
    assert!(is_url_allowed("https://site.com/", strings(&["*://site.com/*"]), block));
}

#[wasm_bindgen_test]
fn query_and_mirror_real_inputs() {
    let host = BrowserHost::new().unwrap();
    let body = host.document().body().unwrap();
    body.set_inner_html(
        r#"<form class="hs-form" data-form-id="t1"><input id="mirror_email" type="email"></form>
           <form id="native"><input id="mirror_email" type="email"></form>"#,
    );

    let candidates = host.query_all("#mirror_email");
    assert_eq!(candidates.len(), 2);
    assert!(candidates[0].is_within(".hs-form"));
    assert!(!candidates[1].is_within(".hs-form"));

    let native = candidates[1].clone();
    let widget = host.query(r#"form[data-form-id="t1"] input[type="email"]"#).unwrap();
    native.add_listener(EventKind::Input, {
        let native = native.clone();
        let widget = widget.clone();
        Box::new(move |_: &DomEvent| widget.set_value(&native.value()))
    });

    native.set_value("a@b.com");
    let event = web_sys::Event::new("input").unwrap();
    native.as_element().dispatch_event(&event).unwrap();
    assert_eq!(widget.value(), "a@b.com");

    let form = host.query("#native").unwrap();
    assert!(form.contains_match("input[type=\"email\"]"));
    body.set_inner_html("");
}

#[wasm_bindgen_test]
fn invalid_config_is_reported_on_every_start() {
    // Each failed start installs the logger; the second must not panic.
    for _ in 0..2 {
        let err = start("{").unwrap_err();
        assert!(err.as_string().unwrap().starts_with("Invalid configuration"));
    }
}

#[wasm_bindgen_test]
fn clock_follows_performance_now() {
    let host = BrowserHost::new().unwrap();
    let performance = web_sys::window().unwrap().performance().unwrap();

    let before = performance.now();
    let first = host.now_ms();
    let second = host.now_ms();
    assert!(first >= before);
    assert!(second >= first);
    // performance.now() counts from page load, far below epoch milliseconds.
    assert!(first < js_sys::Date::now());
}
