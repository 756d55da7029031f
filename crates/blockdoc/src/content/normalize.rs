//! Normalization of untrusted documents.
//!
//! [`normalize`] is total: any JSON value (or any text, via
//! [`normalize_str`]) becomes a canonical [`BlockDocument`]. Every document
//! coming from the backend or from the editor passes through here before it
//! is stored, rendered, or handed back to the editor.
//!
//! Per-kind coercion:
//! - paragraph: non-string `text` becomes `""`
//! - header / heading: `level` truncated and clamped to 1..=6, default 2
//! - list: any style other than `"ordered"` is unordered; items stringified
//! - quote: `alignment` is `"center"` or `"left"`
//! - image: url from `file.url`, then `url`; flags coerced to booleans
//! - anything else: payload kept as-is

use serde_json::{Map, Value};
use tracing::debug;

use super::document::{
    Alignment, Block, BlockDocument, BlockKind, DEFAULT_FORMAT_VERSION, DEFAULT_HEADING_LEVEL,
    ListStyle, now_millis,
};

/// Normalize any JSON value into a canonical document.
///
/// A JSON string is treated as serialized document text.
pub fn normalize(input: &Value) -> BlockDocument {
    match input {
        Value::String(text) => normalize_str(text),
        other => normalize_parsed(other),
    }
}

/// Parse and normalize document text. Unparsable text yields the default document.
pub fn normalize_str(input: &str) -> BlockDocument {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => normalize_parsed(&value),
        Err(e) => {
            debug!(error = %e, "document text is not valid JSON, using default document");
            BlockDocument::default()
        }
    }
}

fn normalize_parsed(input: &Value) -> BlockDocument {
    let Some(root) = input.as_object() else {
        debug!(kind = json_kind(input), "document root is not an object, using default document");
        return BlockDocument::default();
    };

    let raw_blocks = root
        .get("blocks")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut blocks: Vec<Block> = raw_blocks.iter().filter_map(normalize_block).collect();
    if blocks.is_empty() {
        blocks.push(Block::paragraph(""));
    }

    let timestamp = root
        .get("time")
        .and_then(as_timestamp)
        .unwrap_or_else(now_millis);

    let format_version = root
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_FORMAT_VERSION)
        .to_string();

    BlockDocument {
        timestamp,
        format_version,
        blocks,
    }
}

/// Coerce one raw block. Non-object entries are dropped.
fn normalize_block(raw: &Value) -> Option<Block> {
    let Some(block) = raw.as_object() else {
        debug!(kind = json_kind(raw), "dropping non-object block");
        return None;
    };

    // A missing or empty tag falls back to paragraph.
    let tag = block
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or("paragraph");

    let empty = Map::new();
    let data = block
        .get("data")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let kind = match tag {
        "paragraph" => BlockKind::Paragraph {
            text: string_field(data, "text"),
        },
        "header" | "heading" => BlockKind::Heading {
            text: string_field(data, "text"),
            level: heading_level(data.get("level")),
        },
        "list" => BlockKind::List {
            style: if data.get("style").and_then(Value::as_str) == Some("ordered") {
                ListStyle::Ordered
            } else {
                ListStyle::Unordered
            },
            items: data
                .get("items")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(list_item_text).collect())
                .unwrap_or_default(),
        },
        "quote" => BlockKind::Quote {
            text: string_field(data, "text"),
            caption: string_field(data, "caption"),
            alignment: if data.get("alignment").and_then(Value::as_str) == Some("center") {
                Alignment::Center
            } else {
                Alignment::Left
            },
        },
        "image" => BlockKind::Image {
            url: image_url(data),
            caption: string_field(data, "caption"),
            with_border: data.get("withBorder").is_some_and(truthy),
            with_background: data.get("withBackground").is_some_and(truthy),
            stretched: data.get("stretched").is_some_and(truthy),
        },
        other => BlockKind::Other {
            kind: other.to_string(),
            data: data.clone(),
        },
    };

    Some(Block {
        id: block.get("id").and_then(Value::as_str).map(str::to_string),
        kind,
    })
}

/// String field or `""`.
fn string_field(data: &Map<String, Value>, field: &str) -> String {
    data.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Any JSON number, truncated toward zero and clamped to 1..=6.
fn heading_level(level: Option<&Value>) -> u8 {
    level
        .and_then(Value::as_f64)
        .map(|n| n.trunc().clamp(1.0, 6.0) as u8)
        .unwrap_or(DEFAULT_HEADING_LEVEL)
}

/// First non-empty of `file.url` and `url`.
fn image_url(data: &Map<String, Value>) -> Option<String> {
    let nested = data
        .get("file")
        .and_then(|file| file.get("url"))
        .and_then(Value::as_str);
    let flat = data.get("url").and_then(Value::as_str);

    [nested, flat]
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

fn list_item_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Nested list tools store items as `{ "content": "...", "items": [...] }`.
        Value::Object(obj) => obj
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Value::Null | Value::Array(_) => String::new(),
    }
}

/// Loose boolean coercion for flag fields.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_timestamp(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
