//! Canonical block document model.
//!
//! A [`BlockDocument`] is the only shape the renderer and the editor adapter
//! work with. It is produced by [`normalize`](super::normalize) and written
//! back out in the Editor.js wire shape:
//!
//! ```json
//! { "time": 1700000000000, "version": "2.x",
//!   "blocks": [ { "id": "a1", "type": "paragraph", "data": { "text": "Hi" } } ] }
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Format version written when the input carries none.
pub const DEFAULT_FORMAT_VERSION: &str = "2.x";

/// Heading level used when the input carries none.
pub const DEFAULT_HEADING_LEVEL: u8 = 2;

/// Block type tags with a dedicated variant. Anything else is [`BlockKind::Other`].
pub const KNOWN_KINDS: &[&str] = &["paragraph", "header", "heading", "list", "quote", "image"];

/// An ordered sequence of typed blocks plus format metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDocument {
    /// Creation or modification instant, epoch milliseconds.
    pub timestamp: i64,
    /// Opaque format version tag.
    pub format_version: String,
    /// Blocks in reading order.
    pub blocks: Vec<Block>,
}

/// One unit of content.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Editor-assigned block id, kept so the editor can track block identity.
    pub id: Option<String>,
    pub kind: BlockKind,
}

/// Block payloads.
///
/// The five known kinds are fully typed; [`BlockKind::Other`] carries the
/// payload of any kind this crate does not understand, untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph {
        text: String,
    },
    Heading {
        text: String,
        level: u8,
    },
    List {
        style: ListStyle,
        items: Vec<String>,
    },
    Quote {
        text: String,
        caption: String,
        alignment: Alignment,
    },
    Image {
        url: Option<String>,
        caption: String,
        with_border: bool,
        with_background: bool,
        stretched: bool,
    },
    Other {
        kind: String,
        data: Map<String, Value>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Ordered,
    Unordered,
}

impl ListStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ListStyle::Ordered => "ordered",
            ListStyle::Unordered => "unordered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
        }
    }
}

impl Block {
    /// A block without an id.
    pub fn new(kind: BlockKind) -> Self {
        Self { id: None, kind }
    }

    /// A paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph { text: text.into() })
    }

    /// Whether this block already satisfies the normalized form.
    pub fn is_canonical(&self) -> bool {
        match &self.kind {
            BlockKind::Heading { level, .. } => (1..=6).contains(level),
            BlockKind::Other { kind, .. } => {
                !kind.is_empty() && !KNOWN_KINDS.contains(&kind.as_str())
            }
            _ => true,
        }
    }

    /// Serialize to the `{id?, type, data}` wire shape.
    pub fn to_wire(&self) -> Value {
        let mut block = Map::new();
        if let Some(id) = &self.id {
            block.insert("id".to_string(), Value::String(id.clone()));
        }
        block.insert(
            "type".to_string(),
            Value::String(self.kind.name().to_string()),
        );
        block.insert("data".to_string(), self.kind.data());
        Value::Object(block)
    }
}

impl BlockKind {
    /// Wire tag of this kind. Headings use the Editor.js `header` tag.
    pub fn name(&self) -> &str {
        match self {
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Heading { .. } => "header",
            BlockKind::List { .. } => "list",
            BlockKind::Quote { .. } => "quote",
            BlockKind::Image { .. } => "image",
            BlockKind::Other { kind, .. } => kind,
        }
    }

    /// Wire payload of this kind.
    pub fn data(&self) -> Value {
        match self {
            BlockKind::Paragraph { text } => json!({ "text": text }),
            BlockKind::Heading { text, level } => json!({ "text": text, "level": level }),
            BlockKind::List { style, items } => json!({
                "style": style.as_str(),
                "items": items,
            }),
            BlockKind::Quote {
                text,
                caption,
                alignment,
            } => json!({
                "text": text,
                "caption": caption,
                "alignment": alignment.as_str(),
            }),
            BlockKind::Image {
                url,
                caption,
                with_border,
                with_background,
                stretched,
            } => {
                let mut data = Map::new();
                // Image tools read either shape, so both are written.
                if let Some(url) = url {
                    data.insert("file".to_string(), json!({ "url": url }));
                    data.insert("url".to_string(), Value::String(url.clone()));
                }
                data.insert("caption".to_string(), Value::String(caption.clone()));
                data.insert("withBorder".to_string(), Value::Bool(*with_border));
                data.insert("withBackground".to_string(), Value::Bool(*with_background));
                data.insert("stretched".to_string(), Value::Bool(*stretched));
                Value::Object(data)
            }
            BlockKind::Other { data, .. } => Value::Object(data.clone()),
        }
    }
}

impl BlockDocument {
    /// A document stamped with the current time and default version.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            timestamp: now_millis(),
            format_version: DEFAULT_FORMAT_VERSION.to_string(),
            blocks,
        }
    }

    /// Whether this document already satisfies the normalized form:
    /// at least one block and every block canonical.
    pub fn is_canonical(&self) -> bool {
        !self.blocks.is_empty() && self.blocks.iter().all(Block::is_canonical)
    }

    /// Serialize to the `{time, version, blocks}` wire shape.
    pub fn to_wire(&self) -> Value {
        json!({
            "time": self.timestamp,
            "version": self.format_version,
            "blocks": self.blocks.iter().map(Block::to_wire).collect::<Vec<_>>(),
        })
    }
}

impl Default for BlockDocument {
    /// The single empty paragraph document.
    fn default() -> Self {
        Self::new(vec![Block::paragraph("")])
    }
}

impl Serialize for BlockDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BlockDocument {
    /// Deserialization goes through the normalizer and never fails on
    /// well-formed JSON, whatever its shape.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(super::normalize(&raw))
    }
}

/// Current time as epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
