//! WebAssembly bindings for Enki

use std::cell::RefCell;

use enki_compiler::{build_rule_set, parse_pattern_list};
use enki_core::{
    is_context_invalidated, rule_id_for_pattern, wildcard_to_regex, Matcher, PatternEdit,
};
use wasm_bindgen::prelude::*;

thread_local! {
    static MATCHER: RefCell<Option<Matcher>> = const { RefCell::new(None) };
}

/// Replace the content-side blocklist. Called on load and again from the
/// extension's storage change listener.
#[wasm_bindgen]
pub fn set_blocklist(patterns: JsValue, filters: JsValue) -> Result<u32, JsValue> {
    let patterns = string_list(&patterns, "patterns")?;
    let filters = string_list(&filters, "filters")?;
    let total = patterns.len() + filters.len();

    let matcher = Matcher::new(patterns.iter().chain(filters.iter()));
    let compiled = matcher.len();
    if compiled < total {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "[Enki] {} of {} patterns could not be compiled",
            total - compiled,
            total
        )));
    }

    MATCHER.with(|cell| *cell.borrow_mut() = Some(matcher));
    Ok(compiled as u32)
}

#[wasm_bindgen]
pub fn is_initialized() -> bool {
    MATCHER.with(|cell| cell.borrow().is_some())
}

#[wasm_bindgen]
pub fn should_redirect(url: &str) -> bool {
    MATCHER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|matcher| matcher.should_redirect(url))
            .unwrap_or(false)
    })
}

#[wasm_bindgen]
pub fn matching_pattern(url: &str) -> Option<String> {
    MATCHER.with(|cell| {
        cell.borrow()
            .as_ref()
            .and_then(|matcher| matcher.matching_pattern(url).map(str::to_string))
    })
}

/// Compile a pattern list into dynamic rules, ready for
/// `updateDynamicRules({ addRules })`.
#[wasm_bindgen]
pub fn compile_rules(patterns: JsValue) -> Result<JsValue, JsValue> {
    let patterns = string_list(&patterns, "patterns")?;
    let build = build_rule_set(&patterns);

    let rules_json = serde_json::to_string(&build.rules)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize rules: {}", e)))?;
    let rules = js_sys::JSON::parse(&rules_json)?;

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"rules".into(), &rules);
    let _ = js_sys::Reflect::set(&js_result, &"patternsBefore".into(), &JsValue::from(build.stats.before as u32));
    let _ = js_sys::Reflect::set(&js_result, &"patternsAfter".into(), &JsValue::from(build.stats.after as u32));
    let _ = js_sys::Reflect::set(&js_result, &"deduped".into(), &JsValue::from(build.stats.deduped as u32));
    let _ = js_sys::Reflect::set(&js_result, &"collisions".into(), &JsValue::from(build.stats.collisions as u32));

    Ok(js_result.into())
}

/// Add user input to a pattern list the way the options page does.
/// Returns `{ status, patterns }` where status is `added`, `duplicate` or
/// `ignored`.
#[wasm_bindgen]
pub fn add_pattern(patterns: JsValue, input: &str) -> Result<JsValue, JsValue> {
    let mut settings = enki_core::Settings {
        patterns: string_list(&patterns, "patterns")?,
        ..Default::default()
    };
    let status = match settings.add_pattern(input) {
        PatternEdit::Added(_) => "added",
        PatternEdit::Duplicate(_) => "duplicate",
        PatternEdit::Ignored => "ignored",
    };

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"status".into(), &JsValue::from_str(status));
    let _ = js_sys::Reflect::set(&js_result, &"patterns".into(), &to_js_array(&settings.patterns));
    Ok(js_result.into())
}

#[wasm_bindgen]
pub fn import_pattern_list(text: &str) -> JsValue {
    to_js_array(&parse_pattern_list(text)).into()
}

#[wasm_bindgen]
pub fn wildcard_to_regex_js(pattern: &str) -> String {
    wildcard_to_regex(pattern)
}

#[wasm_bindgen]
pub fn rule_id_for_pattern_js(pattern: &str) -> i32 {
    rule_id_for_pattern(pattern)
}

/// True for teardown errors the extension should swallow instead of log.
#[wasm_bindgen]
pub fn is_context_invalidated_js(message: &str) -> bool {
    is_context_invalidated(message)
}

fn string_list(value: &JsValue, what: &str) -> Result<Vec<String>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(Vec::new());
    }
    if !js_sys::Array::is_array(value) {
        return Err(JsValue::from_str(&format!("{} must be an array", what)));
    }

    js_sys::Array::from(value)
        .iter()
        .map(|item| {
            item.as_string()
                .ok_or_else(|| JsValue::from_str(&format!("{} entries must be strings", what)))
        })
        .collect()
}

fn to_js_array(items: &[String]) -> js_sys::Array {
    let array = js_sys::Array::new();
    for item in items {
        array.push(&JsValue::from_str(item));
    }
    array
}
