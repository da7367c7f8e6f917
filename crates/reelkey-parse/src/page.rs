//! Page-embedded metadata used to classify a title page.
//!
//! Only two signals are extracted: the Open Graph `og:type` meta tag and the
//! raw text of every `application/ld+json` script block, in document order.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of the classification signals a document carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Content of `<meta property="og:type">`, if present.
    pub og_type: Option<String>,
    /// Raw text of each JSON-LD block, unparsed.
    pub json_ld: Vec<String>,
}

impl PageMetadata {
    /// Extract the metadata from an HTML document.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let og_type = Selector::parse(r#"meta[property="og:type"]"#)
            .ok()
            .and_then(|s| document.select(&s).next())
            .and_then(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let json_ld: Vec<String> = Selector::parse(r#"script[type="application/ld+json"]"#)
            .map(|s| {
                document
                    .select(&s)
                    .map(|el| el.text().collect::<String>())
                    .collect()
            })
            .unwrap_or_default();

        tracing::trace!(?og_type, blocks = json_ld.len(), "extracted page metadata");
        Self { og_type, json_ld }
    }
}

/// Collect every `@type` string in one JSON-LD block, in document order.
///
/// The block may be a single object or an array of objects, `@type` may be a
/// string or an array of strings, and objects nested in `@graph` are visited
/// after their parent.
pub fn json_ld_types(block: &str) -> Result<Vec<String>, serde_json::Error> {
    let value: Value = serde_json::from_str(block)?;
    let mut types = Vec::new();
    collect_types(&value, &mut types);
    Ok(types)
}

fn collect_types(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_types(item, out);
            }
        }
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => out.push(t.clone()),
                Some(Value::Array(ts)) => {
                    out.extend(ts.iter().filter_map(|t| t.as_str().map(str::to_string)));
                }
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_types(graph, out);
            }
        }
        _ => {}
    }
}
