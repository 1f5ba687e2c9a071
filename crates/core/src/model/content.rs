use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── CONTENT BLOCKS ────────────────────────────────────────────────────────────
//

/// One presentational block of lesson content.
///
/// Blocks carry no state; the tag names match the bundled content files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentBlock {
    Heading {
        content: String,
    },
    Paragraph {
        content: String,
    },
    #[serde(rename = "list")]
    BulletedList {
        items: Vec<String>,
    },
    Tip {
        content: String,
    },
    #[serde(rename = "example")]
    WorkedExample {
        title: String,
        description: String,
    },
    KeyPoint {
        title: String,
        content: String,
    },
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentBlockError {
    #[error("{kind} block has empty {field}")]
    EmptyText {
        kind: &'static str,
        field: &'static str,
    },

    #[error("list block has no items")]
    EmptyList,

    #[error("list item {index} is empty")]
    EmptyListItem { index: usize },
}

//
// ─── IMPL ──────────────────────────────────────────────────────────────────────
//

impl ContentBlock {
    /// Tag name as written in content files.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Heading { .. } => "heading",
            ContentBlock::Paragraph { .. } => "paragraph",
            ContentBlock::BulletedList { .. } => "list",
            ContentBlock::Tip { .. } => "tip",
            ContentBlock::WorkedExample { .. } => "example",
            ContentBlock::KeyPoint { .. } => "key-point",
        }
    }

    /// Check that every required field of the variant carries text.
    ///
    /// # Errors
    ///
    /// Returns `ContentBlockError` naming the first blank field.
    pub fn validate(&self) -> Result<(), ContentBlockError> {
        let kind = self.kind();
        let require = |field: &'static str, value: &str| {
            if value.trim().is_empty() {
                Err(ContentBlockError::EmptyText { kind, field })
            } else {
                Ok(())
            }
        };

        match self {
            ContentBlock::Heading { content }
            | ContentBlock::Paragraph { content }
            | ContentBlock::Tip { content } => require("content", content),
            ContentBlock::BulletedList { items } => {
                if items.is_empty() {
                    return Err(ContentBlockError::EmptyList);
                }
                match items.iter().position(|item| item.trim().is_empty()) {
                    Some(index) => Err(ContentBlockError::EmptyListItem { index }),
                    None => Ok(()),
                }
            }
            ContentBlock::WorkedExample { title, description } => {
                require("title", title)?;
                require("description", description)
            }
            ContentBlock::KeyPoint { title, content } => {
                require("title", title)?;
                require("content", content)
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_blocks() {
        let json = r#"[
            {"type": "heading", "content": "Welcome"},
            {"type": "list", "items": ["a", "b"]},
            {"type": "example", "title": "T", "description": "D"},
            {"type": "key-point", "title": "K", "content": "C"}
        ]"#;
        let blocks: Vec<ContentBlock> = serde_json::from_str(json).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(
            blocks[1],
            ContentBlock::BulletedList {
                items: vec!["a".into(), "b".into()]
            }
        );
        assert_eq!(blocks[3].kind(), "key-point");
    }

    #[test]
    fn missing_variant_field_is_a_parse_error() {
        let json = r#"{"type": "example", "title": "only a title"}"#;
        assert!(serde_json::from_str::<ContentBlock>(json).is_err());
    }

    #[test]
    fn blank_text_fails_validation() {
        let block = ContentBlock::KeyPoint {
            title: "Title".into(),
            content: "   ".into(),
        };
        assert_eq!(
            block.validate(),
            Err(ContentBlockError::EmptyText {
                kind: "key-point",
                field: "content"
            })
        );
    }

    #[test]
    fn list_items_are_checked() {
        let empty = ContentBlock::BulletedList { items: vec![] };
        assert_eq!(empty.validate(), Err(ContentBlockError::EmptyList));

        let blank_item = ContentBlock::BulletedList {
            items: vec!["ok".into(), String::new()],
        };
        assert_eq!(
            blank_item.validate(),
            Err(ContentBlockError::EmptyListItem { index: 1 })
        );
    }
}
