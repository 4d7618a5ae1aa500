use serde::{Deserialize, Serialize};

use crate::EditError;

/// A non-empty, ordered list of lines supplied by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lines(Vec<String>);

impl Lines {
    /// Wrap `lines`, rejecting an empty list so an edit can never silently drop text.
    pub fn new(lines: Vec<String>) -> Result<Self, EditError> {
        if lines.is_empty() {
            return Err(EditError::InvalidArgument(
                "new_content must contain at least one line".into(),
            ));
        }
        Ok(Self(lines))
    }

    pub fn one(line: impl Into<String>) -> Self {
        Self(vec![line.into()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Lines {
    fn from(line: &str) -> Self {
        Self::one(line)
    }
}

impl From<String> for Lines {
    fn from(line: String) -> Self {
        Self::one(line)
    }
}

/// The `new_content` field as it arrives on the wire: one line, or a list of lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Content {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<Content> for Lines {
    type Error = EditError;

    fn try_from(content: Content) -> Result<Self, EditError> {
        match content {
            Content::One(line) => Ok(Lines::one(line)),
            Content::Many(lines) => Lines::new(lines),
        }
    }
}

/// One edit against a document. Line numbers are 1-based against the document
/// as left by the previous edit in the same batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    ReplaceLine { line: usize, content: Lines },
    InsertBefore { line: usize, content: Lines },
    InsertAfter { line: usize, content: Lines },
    DeleteLine { line: usize },
    /// Replace up to `count` literal occurrences of `old` in one line; a negative count means all.
    ReplaceSubstring {
        line: usize,
        old: String,
        new: String,
        count: i64,
    },
    AppendLines { content: Lines },
    /// Seed a missing file. Only valid as the first edit of a batch.
    CreateFile { content: String },
}

impl EditOperation {
    /// Wire name of the operation, as used in `operation_type`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReplaceLine { .. } => "replace_line",
            Self::InsertBefore { .. } => "insert_line_before",
            Self::InsertAfter { .. } => "insert_line_after",
            Self::DeleteLine { .. } => "delete_line",
            Self::ReplaceSubstring { .. } => "replace_string_in_line",
            Self::AppendLines { .. } => "append_to_file",
            Self::CreateFile { .. } => "create_file",
        }
    }
}

/// An edit descriptor exactly as an agent sends it, before validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawEdit {
    pub operation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

impl RawEdit {
    fn line(&self) -> Result<usize, EditError> {
        let n = self.line_number.ok_or_else(|| {
            EditError::InvalidArgument(format!(
                "line_number is required for {}",
                self.operation_type
            ))
        })?;
        // Zero and negatives survive as 0 so bounds checking reports them as out of range.
        Ok(usize::try_from(n).unwrap_or(0))
    }

    fn content(&mut self) -> Result<Lines, EditError> {
        let content = self.new_content.take().ok_or_else(|| {
            EditError::InvalidArgument(format!(
                "new_content is required for {}",
                self.operation_type
            ))
        })?;
        Lines::try_from(content)
    }
}

impl TryFrom<RawEdit> for EditOperation {
    type Error = EditError;

    fn try_from(mut raw: RawEdit) -> Result<Self, EditError> {
        let op = match raw.operation_type.as_str() {
            "replace_line" => EditOperation::ReplaceLine {
                line: raw.line()?,
                content: raw.content()?,
            },
            "insert_line_before" => EditOperation::InsertBefore {
                line: raw.line()?,
                content: raw.content()?,
            },
            "insert_line_after" => EditOperation::InsertAfter {
                line: raw.line()?,
                content: raw.content()?,
            },
            "delete_line" => EditOperation::DeleteLine { line: raw.line()? },
            "replace_string_in_line" => EditOperation::ReplaceSubstring {
                line: raw.line()?,
                old: raw.old_string.take().ok_or_else(|| {
                    EditError::InvalidArgument(
                        "old_string is required for replace_string_in_line".into(),
                    )
                })?,
                new: raw.new_string.take().unwrap_or_default(),
                count: raw.count.unwrap_or(1),
            },
            "append_to_file" => EditOperation::AppendLines {
                content: raw.content()?,
            },
            "create_file" => {
                let mut lines = raw.content()?.into_vec();
                if lines.len() != 1 {
                    return Err(EditError::InvalidArgument(
                        "create_file takes a single line of initial content".into(),
                    ));
                }
                EditOperation::CreateFile {
                    content: lines.remove(0),
                }
            }
            other => {
                return Err(EditError::InvalidOperation(format!(
                    "unknown operation type: {other:?}"
                )))
            }
        };
        Ok(op)
    }
}

/// Parse a JSON array of edit descriptors.
pub fn parse_operations_from_json(json: &str) -> Result<Vec<EditOperation>, EditError> {
    let raw: Vec<RawEdit> = serde_json::from_str(json)
        .map_err(|e| EditError::InvalidArgument(format!("malformed edits: {e}")))?;
    raw.into_iter().map(EditOperation::try_from).collect()
}

/// Parse edit descriptors from an already-decoded JSON value (an array of objects).
pub fn parse_operations_from_value(value: serde_json::Value) -> Result<Vec<EditOperation>, EditError> {
    let raw: Vec<RawEdit> = serde_json::from_value(value)
        .map_err(|e| EditError::InvalidArgument(format!("malformed edits: {e}")))?;
    raw.into_iter().map(EditOperation::try_from).collect()
}
