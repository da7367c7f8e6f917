use reelkey_parse::page::json_ld_types;
use reelkey_parse::{KeyEvent, MediaKind, PageMetadata, ShortcutSpec, TitlePattern};
use serde_json::json;
use wasm_bindgen::prelude::*;

/// `event` is a JSON-serialized `KeyboardEvent` subset (`key`, `code`,
/// `ctrlKey`, `altKey`, `shiftKey`, `metaKey`).
#[wasm_bindgen]
pub fn shortcut_matches(shortcut: &str, event: &str) -> bool {
    let Ok(spec) = ShortcutSpec::parse(shortcut) else {
        return false;
    };
    serde_json::from_str::<KeyEvent>(event).is_ok_and(|ev| spec.matches(&ev))
}

/// Canonical spelling of a shortcut, or an empty string when it is invalid.
#[wasm_bindgen]
pub fn normalize_shortcut(input: &str) -> String {
    ShortcutSpec::parse(input)
        .map(|spec| spec.to_string())
        .unwrap_or_default()
}

#[wasm_bindgen]
pub fn title_id_from_path(path: &str) -> Option<String> {
    TitlePattern::default().extract_id(path)
}

/// Page-only classification: `og:type` first, then JSON-LD.
#[wasm_bindgen]
pub fn classify_page(html: &str) -> String {
    let page = PageMetadata::from_html(html);
    let kind = page
        .og_type
        .as_deref()
        .and_then(MediaKind::from_og_type)
        .or_else(|| {
            page.json_ld
                .iter()
                .filter_map(|block| json_ld_types(block).ok())
                .flatten()
                .find_map(|t| MediaKind::from_json_ld_type(&t))
        });
    json!({ "ogType": page.og_type, "kind": kind }).to_string()
}
